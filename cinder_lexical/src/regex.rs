//! Contains the regex atomizer and the postfix (RPN) compiler.
//!
//! A pattern string is first split into typed [`RegexAtom`]s, then rewritten
//! into an explicit-concatenation form and reduced to postfix notation by a
//! shunting-yard pass. The postfix output is validated by operand counting
//! and, when malformed, repaired or replaced by a permissive match-anything
//! program; this compiler never returns an error, trading lexical precision
//! for construction robustness.

use getset::{CopyGetters, Getters};

/// The synthetic atom value used for explicit concatenation.
pub const CONCAT: &str = "·";

/// The pattern substituted when a malformed postfix sequence cannot be
/// repaired.
pub const PERMISSIVE_PATTERN: &str = ".*";

/// Is an enumeration of the kinds of atoms a pattern string splits into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AtomKind {
    /// A run of word characters, or a single non-special byte.
    Literal,

    /// A whole bracket expression `[...]`, including its delimiters.
    Class,

    /// A backslash followed by one character.
    Escape,

    /// `^` or `$`.
    Anchor,

    /// `( ) * + ? | .`, a bounded repetition `{n,m}`, or the synthetic
    /// concatenation atom.
    Operator,
}

/// Is one typed unit of a regular expression pattern.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Getters, CopyGetters)]
pub struct RegexAtom {
    /// Gets the raw text of the atom.
    #[get = "pub"]
    value: String,

    /// Gets the kind of the atom.
    #[get_copy = "pub"]
    kind: AtomKind,
}

impl RegexAtom {
    /// Creates a new [`RegexAtom`] from the given value and kind.
    #[must_use]
    pub fn new(value: impl Into<String>, kind: AtomKind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }

    fn operator(value: impl Into<String>) -> Self { Self::new(value, AtomKind::Operator) }

    /// Checks whether this atom is the synthetic concatenation operator.
    #[must_use]
    pub fn is_concat(&self) -> bool { self.kind == AtomKind::Operator && self.value == CONCAT }

    /// Checks whether this atom is a bounded repetition operator `{n,m}`.
    #[must_use]
    pub fn is_bounded_repeat(&self) -> bool {
        self.kind == AtomKind::Operator && self.value.starts_with('{')
    }
}

/// Splits a pattern string into an ordered sequence of [`RegexAtom`]s.
///
/// Any input string is atomizable: a backslash and its following character
/// always form one escape atom, a bracket expression is captured whole
/// (honoring internal escapes, so an escaped `]` does not terminate it), a
/// brace repetition is captured whole, and maximal runs of word characters
/// merge into a single literal atom so that a whole keyword can label one
/// automaton transition later on.
#[must_use]
pub fn atomize(pattern: &str) -> Vec<RegexAtom> {
    let chars = pattern.chars().collect::<Vec<_>>();
    let mut atoms = Vec::new();
    let mut index = 0;

    while index < chars.len() {
        let character = chars[index];

        match character {
            '\\' => {
                let mut value = String::from('\\');
                if let Some(next) = chars.get(index + 1) {
                    value.push(*next);
                    index += 2;
                } else {
                    // trailing backslash, kept as a lone escape
                    index += 1;
                }
                atoms.push(RegexAtom::new(value, AtomKind::Escape));
            }

            '[' => {
                let mut value = String::from('[');
                let mut cursor = index + 1;

                while cursor < chars.len() {
                    let inner = chars[cursor];
                    value.push(inner);
                    cursor += 1;

                    if inner == '\\' {
                        if let Some(escaped) = chars.get(cursor) {
                            value.push(*escaped);
                            cursor += 1;
                        }
                    } else if inner == ']' {
                        break;
                    }
                }

                index = cursor;
                atoms.push(RegexAtom::new(value, AtomKind::Class));
            }

            '{' => {
                if let Some(close) = chars[index..].iter().position(|x| *x == '}') {
                    let value = chars[index..=index + close].iter().collect::<String>();
                    index += close + 1;
                    atoms.push(RegexAtom::operator(value));
                } else {
                    index += 1;
                    atoms.push(RegexAtom::new("{", AtomKind::Literal));
                }
            }

            '(' | ')' | '*' | '+' | '?' | '|' | '.' => {
                index += 1;
                atoms.push(RegexAtom::operator(character.to_string()));
            }

            '^' | '$' => {
                index += 1;
                atoms.push(RegexAtom::new(character.to_string(), AtomKind::Anchor));
            }

            character if is_word_character(character) => {
                let mut value = String::new();
                while index < chars.len() && is_word_character(chars[index]) {
                    value.push(chars[index]);
                    index += 1;
                }
                atoms.push(RegexAtom::new(value, AtomKind::Literal));
            }

            _ => {
                index += 1;
                atoms.push(RegexAtom::new(character.to_string(), AtomKind::Literal));
            }
        }
    }

    atoms
}

fn is_word_character(character: char) -> bool {
    character.is_ascii_alphanumeric() || character == '_'
}

/// Is an enumeration naming which construction path produced a
/// [`PostfixProgram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fidelity {
    /// The shunting-yard output validated on the first attempt.
    Exact,

    /// A dangling trailing concatenation operator was dropped to make the
    /// output validate.
    Repaired,

    /// The output could not be repaired and the permissive match-anything
    /// program was substituted.
    Permissive,
}

/// Is a validated postfix (RPN) atom sequence ready for Thompson
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct PostfixProgram {
    /// Gets the postfix atom sequence.
    #[get = "pub"]
    atoms: Vec<RegexAtom>,

    /// Gets which construction path produced this program.
    #[get_copy = "pub"]
    fidelity: Fidelity,
}

impl PostfixProgram {
    #[cfg(test)]
    pub(crate) fn from_raw_atoms(atoms: Vec<RegexAtom>) -> Self {
        Self {
            atoms,
            fidelity: Fidelity::Exact,
        }
    }
}

/// Compiles a pattern string into a [`PostfixProgram`].
///
/// This function never fails: malformed patterns degrade to a repaired or
/// permissive program rather than producing an error.
#[must_use]
pub fn compile(pattern: &str) -> PostfixProgram {
    let atoms = insert_concatenation(atomize(pattern));
    let output = shunting_yard(atoms);

    if validate(&output) {
        return PostfixProgram {
            atoms: output,
            fidelity: Fidelity::Exact,
        };
    }

    // minimal repair: drop one dangling trailing concatenation
    if output.last().is_some_and(RegexAtom::is_concat) {
        let repaired = output[..output.len() - 1].to_vec();
        if validate(&repaired) {
            return PostfixProgram {
                atoms: repaired,
                fidelity: Fidelity::Repaired,
            };
        }
    }

    PostfixProgram {
        atoms: vec![RegexAtom::operator("."), RegexAtom::operator("*")],
        fidelity: Fidelity::Permissive,
    }
}

/// Checks whether an atom can end a value on its left when deciding where
/// concatenation goes.
fn is_value_like_left(atom: &RegexAtom) -> bool {
    match atom.kind() {
        AtomKind::Literal | AtomKind::Class | AtomKind::Escape | AtomKind::Anchor => true,
        AtomKind::Operator => {
            matches!(atom.value().as_str(), ")" | "*" | "+" | "?" | ".") || atom.is_bounded_repeat()
        }
    }
}

/// Checks whether an atom can begin a value on its right when deciding where
/// concatenation goes.
fn is_value_like_right(atom: &RegexAtom) -> bool {
    match atom.kind() {
        AtomKind::Literal | AtomKind::Class | AtomKind::Escape | AtomKind::Anchor => true,
        AtomKind::Operator => matches!(atom.value().as_str(), "(" | "."),
    }
}

fn insert_concatenation(atoms: Vec<RegexAtom>) -> Vec<RegexAtom> {
    let mut result: Vec<RegexAtom> = Vec::with_capacity(atoms.len() * 2);

    for atom in atoms {
        // a postfix quantifier binds to a single character, so the trailing
        // character of a merged word run becomes its own operand: `ab?` is
        // `a` then `b?`, not `(ab)?`
        if is_postfix_unary(&atom) {
            if let Some(previous) = result.last_mut() {
                if previous.kind() == AtomKind::Literal && previous.value().chars().count() > 1 {
                    let mut head = previous.value().clone();
                    if let Some(tail) = head.pop() {
                        *previous = RegexAtom::new(head, AtomKind::Literal);
                        result.push(RegexAtom::operator(CONCAT));
                        result.push(RegexAtom::new(tail.to_string(), AtomKind::Literal));
                    }
                }
            }
        }

        if let Some(previous) = result.last() {
            if is_value_like_left(previous) && is_value_like_right(&atom) {
                result.push(RegexAtom::operator(CONCAT));
            }
        }

        result.push(atom);
    }

    result
}

fn precedence(atom: &RegexAtom) -> u8 {
    if atom.is_concat() {
        2
    } else if atom.value() == "|" {
        1
    } else {
        // * + ? {n,m}
        3
    }
}

fn is_postfix_unary(atom: &RegexAtom) -> bool {
    matches!(atom.value().as_str(), "*" | "+" | "?") || atom.is_bounded_repeat()
}

fn shunting_yard(atoms: Vec<RegexAtom>) -> Vec<RegexAtom> {
    let mut output = Vec::with_capacity(atoms.len());
    let mut operators: Vec<RegexAtom> = Vec::new();

    for atom in atoms {
        match atom.kind() {
            AtomKind::Literal | AtomKind::Class | AtomKind::Escape | AtomKind::Anchor => {
                output.push(atom);
            }

            AtomKind::Operator => match atom.value().as_str() {
                // `.` consumes a position, so it is an operand here
                "." => output.push(atom),

                "(" => operators.push(atom),

                ")" => {
                    while let Some(top) = operators.last() {
                        if top.value() == "(" {
                            break;
                        }
                        output.push(operators.pop().unwrap());
                    }

                    // drop the matching parenthesis, tolerating a stray `)`
                    if operators.last().is_some_and(|top| top.value() == "(") {
                        operators.pop();
                    }
                }

                // postfix unary operators are already in RPN position
                _ if is_postfix_unary(&atom) => output.push(atom),

                _ => {
                    while let Some(top) = operators.last() {
                        if top.value() == "(" || precedence(top) < precedence(&atom) {
                            break;
                        }
                        output.push(operators.pop().unwrap());
                    }
                    operators.push(atom);
                }
            },
        }
    }

    while let Some(top) = operators.pop() {
        if top.value() != "(" {
            output.push(top);
        }
    }

    output
}

/// Validates a postfix sequence by operand counting: operands push one
/// value, binary operators reduce two values to one, and postfix unary
/// operators are neutral. A well-formed expression leaves exactly one value.
#[must_use]
pub fn validate(atoms: &[RegexAtom]) -> bool {
    let mut count: isize = 0;

    for atom in atoms {
        match atom.kind() {
            AtomKind::Literal | AtomKind::Class | AtomKind::Escape | AtomKind::Anchor => count += 1,

            AtomKind::Operator => {
                if atom.value() == "." {
                    count += 1;
                } else if atom.is_concat() || atom.value() == "|" {
                    if count < 2 {
                        return false;
                    }
                    count -= 1;
                } else if count < 1 {
                    // unary operator with nothing to apply to
                    return false;
                }
            }
        }
    }

    count == 1
}
