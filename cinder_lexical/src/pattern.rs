//! Contains the prioritised token pattern table and its compilation into
//! deterministic automata.

use derive_new::new;
use getset::{CopyGetters, Getters};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use cinder_base::diagnostic::Handler;

use crate::{
    dfa::{Construction, Dfa},
    error::{self, Error},
    nfa::Nfa,
    regex::{self, Fidelity},
};

/// Is an enumeration of the coarse classifications a pattern assigns to its
/// matches.
///
/// Declaration order is the priority order: when two patterns match prefixes
/// of equal length, the match whose class appears earlier here wins. The
/// ordering is part of the public contract and is pinned by tests.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter,
)]
pub enum TokenClass {
    /// Names introduced by the programmer.
    Identifier,

    /// Arithmetic, comparison, logical, and bitwise operators.
    Operator,

    /// Screaming-case constant names.
    Constant,

    /// Reserved words of the language.
    Keyword,

    /// Numeric and boolean literals.
    Literal,

    /// Braces, brackets, parentheses, and separators.
    Punctuator,

    /// Characters with dedicated lexical roles outside the other classes.
    Special,

    /// Anything no other pattern claims.
    Unknown,
}

impl TokenClass {
    /// Gets the tie-break priority of this class; lower is stronger.
    #[must_use]
    pub fn priority(self) -> usize { self as usize }
}

/// Is one row of the pattern table: a named regular expression paired with
/// the class of its matches.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters, new)]
pub struct PatternDefinition {
    /// Gets the name of the pattern, used in diagnostics.
    #[get = "pub"]
    name: String,

    /// Gets the regular expression source.
    #[get = "pub"]
    pattern: String,

    /// Gets the class assigned to this pattern's matches.
    #[get_copy = "pub"]
    class: TokenClass,
}

/// Builds the default pattern table in priority order.
#[must_use]
pub fn default_table() -> Vec<PatternDefinition> {
    let keywords = [
        "if", "else", "while", "do", "for", "match", "enum", "struct", "const", "void", "int",
        "bool", "function", "mut", "return", "default", "break", "continue", "sizeof", "asm",
    ]
    .join("|");

    vec![
        PatternDefinition::new(
            "identifier".to_string(),
            "[a-zA-Z_][a-zA-Z0-9_]*".to_string(),
            TokenClass::Identifier,
        ),
        PatternDefinition::new(
            "operator".to_string(),
            r"==|!=|<=|>=|&&|\|\||<<|>>|[+\-*/%=<>!&^]".to_string(),
            TokenClass::Operator,
        ),
        PatternDefinition::new(
            "constant".to_string(),
            "[A-Z][A-Z0-9_]*".to_string(),
            TokenClass::Constant,
        ),
        PatternDefinition::new("keyword".to_string(), keywords, TokenClass::Keyword),
        PatternDefinition::new(
            "literal".to_string(),
            "[0-9]+|true|false".to_string(),
            TokenClass::Literal,
        ),
        PatternDefinition::new(
            "punctuator".to_string(),
            r"[{}()\[\];,.:?]".to_string(),
            TokenClass::Punctuator,
        ),
        PatternDefinition::new(
            "special".to_string(),
            r"[@#$~`]".to_string(),
            TokenClass::Special,
        ),
    ]
}

/// Is one compiled pattern: the deterministic automaton plus the provenance
/// of its compilation.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct CompiledPattern {
    /// Gets the name of the source pattern.
    #[get = "pub"]
    name: String,

    /// Gets the class assigned to this pattern's matches.
    #[get_copy = "pub"]
    class: TokenClass,

    /// Gets the fidelity of the postfix compilation.
    #[get_copy = "pub"]
    fidelity: Fidelity,

    /// Gets the deterministic automaton.
    #[get = "pub"]
    dfa: Dfa,
}

/// Compiles every row of a pattern table, preserving the table's priority
/// order in the output.
///
/// The pipeline is total, so every row yields an automaton; degraded and
/// malformed rows are reported to the handler as warnings rather than
/// dropped. A row whose postfix sequence defeats Thompson construction
/// (an internal invariant violation) is the only row ever skipped.
pub fn compile_table(
    table: &[PatternDefinition],
    handler: &impl Handler<Error>,
) -> Vec<CompiledPattern> {
    let mut compiled = Vec::with_capacity(table.len());

    for definition in table {
        let program = regex::compile(definition.pattern());

        match program.fidelity() {
            Fidelity::Exact => (),
            Fidelity::Repaired | Fidelity::Permissive => {
                handler.receive(Error::DegradedPattern(error::DegradedPattern {
                    pattern_name: definition.name().clone(),
                    fidelity: program.fidelity(),
                }));
            }
        }

        let Ok(nfa) = Nfa::build(&program, definition.class()) else {
            handler.receive(Error::MalformedPattern(error::MalformedPattern {
                pattern_name: definition.name().clone(),
            }));
            continue;
        };

        let dfa = Dfa::from_nfa(&nfa);

        if dfa.construction() == Construction::Fallback {
            handler.receive(Error::FallbackConstruction(error::FallbackConstruction {
                pattern_name: definition.name().clone(),
            }));
        }

        compiled.push(CompiledPattern {
            name: definition.name().clone(),
            class: definition.class(),
            fidelity: program.fidelity(),
            dfa,
        });
    }

    compiled
}

/// Checks that the given classes are in strictly ascending priority order.
#[must_use]
pub fn is_priority_ordered(classes: &[TokenClass]) -> bool {
    classes.windows(2).all(|pair| pair[0] < pair[1])
}

/// Iterates every class in priority order.
pub fn classes_by_priority() -> impl Iterator<Item = TokenClass> { TokenClass::iter() }
