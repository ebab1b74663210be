//! Contains the Thompson construction of nondeterministic automata and the
//! epsilon-closure engine.
//!
//! States live in a [`StateArena`], a contiguous collection indexed by
//! integer ID, so the cyclic graphs produced by `*`/`+` loops need no
//! shared ownership. Identifiers are assigned per arena, monotonically:
//! lower IDs are always created earlier, and that ordering later serves as
//! the canonical tie-break key when NFA-state subsets are collapsed into
//! DFA-state signatures.

use std::collections::{BTreeMap, BTreeSet};

use getset::CopyGetters;
use thiserror::Error;

use crate::{
    pattern::TokenClass,
    regex::{AtomKind, PostfixProgram, CONCAT},
};

/// Is an index of a state inside a [`StateArena`].
pub type StateId = usize;

/// The working alphabet substituted for pathologically large discovered
/// alphabets, and used to expand negated character classes: printable ASCII.
#[must_use]
pub fn working_alphabet() -> impl Iterator<Item = char> { ' '..='~' }

/// Is a single symbol labelling an automaton transition.
///
/// `Text` carries one concrete symbol, which may be a multi-character
/// literal run: the atomizer merges whole words into one literal atom, and
/// that atom labels one transition with the whole word.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// Consumes no input; the edge followed by closure computation.
    Epsilon,

    /// Matches any single character; the last-resort transition during
    /// automaton execution.
    Any,

    /// Consumes no input; crossable where the word/non-word character
    /// classification changes.
    WordBoundary,

    /// Consumes no input; crossable at the start of the buffer.
    StartAnchor,

    /// Consumes no input; crossable at the end of the buffer.
    EndAnchor,

    /// Matches the contained text exactly.
    Text(String),
}

impl Symbol {
    /// Creates a [`Symbol::Text`] from the given text.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self { Self::Text(value.into()) }

    /// Checks whether this symbol consumes no input when crossed.
    #[must_use]
    pub fn is_sentinel(&self) -> bool { !matches!(self, Self::Text(_) | Self::Any) }
}

/// Is one state of a nondeterministic automaton.
///
/// Multiple targets per symbol model the nondeterminism; cyclic target
/// references are expected for `*`/`+` loops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NfaState {
    /// Whether this state accepts.
    pub accepting: bool,

    /// The result classification, meaningful only when accepting.
    pub class: Option<TokenClass>,

    /// The outgoing transitions, ordered for deterministic traversal.
    pub transitions: BTreeMap<Symbol, BTreeSet<StateId>>,
}

/// Is the arena owning every state created during one pattern compilation.
///
/// Each compilation session gets its own arena, so state IDs from
/// independent pattern sets can never collide and need no synchronisation.
#[derive(Debug, Clone, Default)]
pub struct StateArena {
    states: Vec<NfaState>,
}

impl StateArena {
    /// Creates a new empty [`StateArena`].
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Creates a fresh state and returns its ID.
    pub fn add_state(&mut self) -> StateId {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }

    /// Gets the state with the given ID.
    #[must_use]
    pub fn state(&self, id: StateId) -> &NfaState { &self.states[id] }

    /// Gets the state with the given ID mutably.
    pub fn state_mut(&mut self, id: StateId) -> &mut NfaState { &mut self.states[id] }

    /// Gets the number of states in the arena.
    #[must_use]
    pub fn len(&self) -> usize { self.states.len() }

    /// Checks whether the arena holds no states.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.states.is_empty() }

    /// Adds a transition from one state to another on the given symbol.
    pub fn add_transition(&mut self, from: StateId, symbol: Symbol, to: StateId) {
        self.states[from]
            .transitions
            .entry(symbol)
            .or_default()
            .insert(to);
    }

    fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.add_transition(from, Symbol::Epsilon, to);
    }

    /// Computes the set of all states reachable from the given set without
    /// consuming input, following only epsilon edges.
    #[must_use]
    pub fn closure(&self, states: &BTreeSet<StateId>) -> BTreeSet<StateId> {
        self.closure_over(states, |symbol| *symbol == Symbol::Epsilon)
    }

    /// Computes a widened closure that also crosses anchor and word-boundary
    /// sentinel edges; used by subset construction, which coarsens the
    /// position-dependent sentinels away.
    #[must_use]
    pub fn sentinel_closure(&self, states: &BTreeSet<StateId>) -> BTreeSet<StateId> {
        self.closure_over(states, Symbol::is_sentinel)
    }

    fn closure_over(
        &self,
        states: &BTreeSet<StateId>,
        follow: impl Fn(&Symbol) -> bool,
    ) -> BTreeSet<StateId> {
        let mut closure = states.clone();
        let mut stack = states.iter().copied().collect::<Vec<_>>();

        while let Some(current) = stack.pop() {
            for (symbol, targets) in &self.states[current].transitions {
                if !follow(symbol) {
                    continue;
                }

                for target in targets {
                    if closure.insert(*target) {
                        stack.push(*target);
                    }
                }
            }
        }

        closure
    }

    /// Computes the set of states reachable from the given set by one
    /// transition on the given symbol.
    #[must_use]
    pub fn move_on(&self, states: &BTreeSet<StateId>, symbol: &Symbol) -> BTreeSet<StateId> {
        let mut result = BTreeSet::new();

        for state in states {
            if let Some(targets) = self.states[*state].transitions.get(symbol) {
                result.extend(targets.iter().copied());
            }
        }

        result
    }
}

/// Is an internal invariant violation during Thompson construction.
///
/// A corrupt postfix sequence cannot occur given the postfix compiler's
/// guarantee, but the builder checks defensively; this error indicates a
/// programmer defect, never malformed user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ConstructionError {
    #[error("an operator in the postfix sequence had too few operands")]
    OperandStackUnderflow,

    #[error("construction finished with {0} fragments on the operand stack")]
    UnbalancedFragments(usize),

    #[error("unexpected operator `{0}` in the postfix sequence")]
    UnexpectedOperator(String),
}

/// Is a two-terminal automaton fragment within an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
pub struct Fragment {
    /// Gets the entry state of the fragment.
    #[get_copy = "pub"]
    start: StateId,

    /// Gets the exit state of the fragment.
    #[get_copy = "pub"]
    end: StateId,
}

/// Is a complete nondeterministic automaton: a two-terminal fragment plus
/// the arena owning its states.
#[derive(Debug, Clone, CopyGetters)]
pub struct Nfa {
    arena: StateArena,

    /// Gets the ID of the start state.
    #[get_copy = "pub"]
    start: StateId,

    /// Gets the ID of the accepting end state.
    #[get_copy = "pub"]
    end: StateId,
}

impl Nfa {
    /// Builds an automaton from the given postfix program via Thompson's
    /// construction, tagging the accepting state with the given result
    /// classification.
    ///
    /// # Errors
    /// [`ConstructionError`] on a corrupt postfix sequence: an operator with
    /// too few operands, an unexpected operator, or a final operand stack
    /// size other than one.
    pub fn build(program: &PostfixProgram, class: TokenClass) -> Result<Self, ConstructionError> {
        let mut arena = StateArena::new();
        let mut stack: Vec<Fragment> = Vec::new();

        for atom in program.atoms() {
            let fragment = match atom.kind() {
                AtomKind::Literal => literal_fragment(&mut arena, atom.value()),
                AtomKind::Class => class_fragment(&mut arena, atom.value()),
                AtomKind::Escape => escape_fragment(&mut arena, atom.value()),
                AtomKind::Anchor => anchor_fragment(&mut arena, atom.value()),

                AtomKind::Operator => match atom.value().as_str() {
                    "." => leaf_fragment(&mut arena, [Symbol::Any]),

                    CONCAT => {
                        let (a, b) = pop_two(&mut stack)?;
                        arena.add_epsilon(a.end, b.start);
                        Fragment {
                            start: a.start,
                            end: b.end,
                        }
                    }

                    "|" => {
                        let (a, b) = pop_two(&mut stack)?;
                        let start = arena.add_state();
                        let end = arena.add_state();
                        arena.add_epsilon(start, a.start);
                        arena.add_epsilon(start, b.start);
                        arena.add_epsilon(a.end, end);
                        arena.add_epsilon(b.end, end);
                        Fragment { start, end }
                    }

                    "*" => {
                        let inner = pop_one(&mut stack)?;
                        let start = arena.add_state();
                        let end = arena.add_state();
                        arena.add_epsilon(start, inner.start);
                        arena.add_epsilon(start, end);
                        arena.add_epsilon(inner.end, inner.start);
                        arena.add_epsilon(inner.end, end);
                        Fragment { start, end }
                    }

                    "+" => {
                        let inner = pop_one(&mut stack)?;
                        let start = arena.add_state();
                        let end = arena.add_state();
                        arena.add_epsilon(start, inner.start);
                        arena.add_epsilon(inner.end, inner.start);
                        arena.add_epsilon(inner.end, end);
                        Fragment { start, end }
                    }

                    "?" => {
                        let inner = pop_one(&mut stack)?;
                        let start = arena.add_state();
                        let end = arena.add_state();
                        arena.add_epsilon(start, inner.start);
                        arena.add_epsilon(start, end);
                        arena.add_epsilon(inner.end, end);
                        Fragment { start, end }
                    }

                    repeat if atom.is_bounded_repeat() => {
                        let inner = pop_one(&mut stack)?;
                        bounded_repetition(&mut arena, inner, repeat)
                    }

                    other => return Err(ConstructionError::UnexpectedOperator(other.to_string())),
                },
            };

            stack.push(fragment);
        }

        if stack.len() != 1 {
            return Err(ConstructionError::UnbalancedFragments(stack.len()));
        }

        let fragment = stack.pop().unwrap();
        let end_state = arena.state_mut(fragment.end);
        end_state.accepting = true;
        end_state.class = Some(class);

        Ok(Self {
            arena,
            start: fragment.start,
            end: fragment.end,
        })
    }

    /// Gets the arena owning this automaton's states.
    #[must_use]
    pub fn arena(&self) -> &StateArena { &self.arena }

    /// Simulates the automaton over the full input, returning the result
    /// classification when the whole input is accepted.
    ///
    /// This is the diagnostic execution path: it honors the exact
    /// position-dependent semantics of `^`, `$`, and `\b` sentinel edges,
    /// which subset construction coarsens away.
    #[must_use]
    pub fn simulate(&self, input: &str) -> Option<TokenClass> {
        let mut reachable: BTreeMap<usize, BTreeSet<StateId>> = BTreeMap::new();
        reachable.insert(0, self.arena.closure(&BTreeSet::from([self.start])));

        let length = input.len();

        while let Some((position, mut states)) = reachable.pop_first() {
            if position > length {
                continue;
            }

            states = self.apply_sentinels(states, input, position);

            if position == length {
                return states
                    .iter()
                    .filter(|id| self.arena.state(**id).accepting)
                    .filter_map(|id| self.arena.state(*id).class)
                    .min();
            }

            let rest = &input[position..];

            for state in &states {
                for (symbol, targets) in &self.arena.state(*state).transitions {
                    let consumed = match symbol {
                        Symbol::Text(text) if rest.starts_with(text) => text.len(),
                        Symbol::Any => rest.chars().next().map_or(0, char::len_utf8),
                        _ => 0,
                    };

                    if consumed == 0 {
                        continue;
                    }

                    let entry = reachable.entry(position + consumed).or_default();
                    for target in targets {
                        entry.extend(self.arena.closure(&BTreeSet::from([*target])));
                    }
                }
            }
        }

        None
    }

    /// Crosses the anchor/word-boundary edges valid at the given position,
    /// then re-closes over epsilon edges.
    fn apply_sentinels(
        &self,
        states: BTreeSet<StateId>,
        input: &str,
        position: usize,
    ) -> BTreeSet<StateId> {
        let mut current = states;

        loop {
            let mut grown = current.clone();

            if position == 0 {
                grown.extend(self.arena.move_on(&current, &Symbol::StartAnchor));
            }

            if position == input.len() {
                grown.extend(self.arena.move_on(&current, &Symbol::EndAnchor));
            }

            if at_word_boundary(input, position) {
                grown.extend(self.arena.move_on(&current, &Symbol::WordBoundary));
            }

            let grown = self.arena.closure(&grown);

            if grown == current {
                return current;
            }

            current = grown;
        }
    }
}

fn at_word_boundary(input: &str, position: usize) -> bool {
    let before = input[..position].chars().next_back();
    let after = input[position..].chars().next();

    let is_word = |x: Option<char>| x.is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');

    is_word(before) != is_word(after)
}

fn pop_one(stack: &mut Vec<Fragment>) -> Result<Fragment, ConstructionError> {
    stack.pop().ok_or(ConstructionError::OperandStackUnderflow)
}

fn pop_two(stack: &mut Vec<Fragment>) -> Result<(Fragment, Fragment), ConstructionError> {
    let b = pop_one(stack)?;
    let a = pop_one(stack)?;
    Ok((a, b))
}

/// Creates a fresh two-state fragment with one transition from start to end
/// per given symbol.
fn leaf_fragment(
    arena: &mut StateArena,
    symbols: impl IntoIterator<Item = Symbol>,
) -> Fragment {
    let start = arena.add_state();
    let end = arena.add_state();

    for symbol in symbols {
        arena.add_transition(start, symbol, end);
    }

    Fragment { start, end }
}

fn literal_fragment(arena: &mut StateArena, value: &str) -> Fragment {
    leaf_fragment(arena, [Symbol::text(value)])
}

fn anchor_fragment(arena: &mut StateArena, value: &str) -> Fragment {
    let symbol = if value == "^" {
        Symbol::StartAnchor
    } else {
        Symbol::EndAnchor
    };

    leaf_fragment(arena, [symbol])
}

fn escape_fragment(arena: &mut StateArena, value: &str) -> Fragment {
    let escaped = value.chars().nth(1);

    match escaped {
        Some('d') => leaf_fragment(arena, ('0'..='9').map(|x| Symbol::text(x.to_string()))),
        Some('w') => leaf_fragment(
            arena,
            working_alphabet()
                .filter(|x| x.is_ascii_alphanumeric() || *x == '_')
                .map(|x| Symbol::text(x.to_string())),
        ),
        Some('s') => leaf_fragment(
            arena,
            [" ", "\t", "\n", "\r"].into_iter().map(Symbol::text),
        ),
        Some('b') => leaf_fragment(arena, [Symbol::WordBoundary]),
        Some('n') => leaf_fragment(arena, [Symbol::text("\n")]),
        Some('t') => leaf_fragment(arena, [Symbol::text("\t")]),
        Some('r') => leaf_fragment(arena, [Symbol::text("\r")]),
        Some(other) => leaf_fragment(arena, [Symbol::text(other.to_string())]),

        // lone trailing backslash
        None => leaf_fragment(arena, [Symbol::text("\\")]),
    }
}

fn class_fragment(arena: &mut StateArena, value: &str) -> Fragment {
    let (negated, members) = parse_class(value);

    if negated {
        leaf_fragment(
            arena,
            working_alphabet()
                .filter(|x| !members.contains(x))
                .map(|x| Symbol::text(x.to_string())),
        )
    } else {
        leaf_fragment(
            arena,
            members.into_iter().map(|x| Symbol::text(x.to_string())),
        )
    }
}

/// Parses the body of a `[...]` class atom into its member characters,
/// expanding ranges and honoring internal escapes.
fn parse_class(value: &str) -> (bool, BTreeSet<char>) {
    let body = value
        .strip_prefix('[')
        .unwrap_or(value)
        .strip_suffix(']')
        .unwrap_or_else(|| value.strip_prefix('[').unwrap_or(value));

    let (negated, body) = body
        .strip_prefix('^')
        .map_or((false, body), |rest| (true, rest));

    let chars = body.chars().collect::<Vec<_>>();
    let mut members = BTreeSet::new();
    let mut index = 0;

    while index < chars.len() {
        let character = chars[index];

        if character == '\\' {
            if let Some(escaped) = chars.get(index + 1) {
                match escaped {
                    'd' => members.extend('0'..='9'),
                    'w' => {
                        members.extend(
                            working_alphabet().filter(|x| x.is_ascii_alphanumeric() || *x == '_'),
                        );
                    }
                    's' => members.extend([' ', '\t', '\n', '\r']),
                    'n' => {
                        members.insert('\n');
                    }
                    't' => {
                        members.insert('\t');
                    }
                    'r' => {
                        members.insert('\r');
                    }
                    other => {
                        members.insert(*other);
                    }
                }
                index += 2;
            } else {
                members.insert('\\');
                index += 1;
            }
        } else if chars.get(index + 1) == Some(&'-') && index + 2 < chars.len() {
            let end = chars[index + 2];
            if character <= end {
                members.extend(character..=end);
            }
            index += 3;
        } else {
            members.insert(character);
            index += 1;
        }
    }

    (negated, members)
}

fn parse_bounds(value: &str) -> (usize, Option<usize>) {
    let body = value
        .strip_prefix('{')
        .and_then(|x| x.strip_suffix('}'))
        .unwrap_or("");

    if let Some((min, max)) = body.split_once(',') {
        let min = min.trim().parse().unwrap_or(0);
        let max = max.trim();

        if max.is_empty() {
            (min, None)
        } else {
            (min, Some(max.parse().unwrap_or(min)))
        }
    } else {
        // `{n}` means exactly n; unparseable bounds degrade to identity
        let exact = body.trim().parse().unwrap_or(1);
        (exact, Some(exact))
    }
}

/// Expands a bounded repetition `{min,max}` by chaining structurally
/// independent deep copies of the operand fragment, so repeated loops never
/// alias state.
fn bounded_repetition(arena: &mut StateArena, inner: Fragment, value: &str) -> Fragment {
    let (min, max) = parse_bounds(value);

    let start = arena.add_state();
    let end = arena.add_state();

    if min == 0 && max == Some(0) {
        arena.add_epsilon(start, end);
        return Fragment { start, end };
    }

    // the operand fragment itself serves as the first copy
    let mut copies_used = 0;
    let mut next_copy = |arena: &mut StateArena| {
        copies_used += 1;
        if copies_used == 1 {
            inner
        } else {
            deep_copy(arena, inner)
        }
    };

    let mut cursor = start;

    for _ in 0..min {
        let copy = next_copy(arena);
        arena.add_epsilon(cursor, copy.start);
        cursor = copy.end;
    }

    match max {
        // open-ended: one further optional copy whose end loops back to its
        // own start
        None => {
            let tail = next_copy(arena);
            arena.add_epsilon(cursor, tail.start);
            arena.add_epsilon(cursor, end);
            arena.add_epsilon(tail.end, tail.start);
            arena.add_epsilon(tail.end, end);
        }

        Some(max) => {
            for _ in min..max {
                let copy = next_copy(arena);
                arena.add_epsilon(cursor, copy.start);
                arena.add_epsilon(cursor, end);
                cursor = copy.end;
            }

            arena.add_epsilon(cursor, end);
        }
    }

    Fragment { start, end }
}

/// Clones every state reachable from the fragment within the same arena,
/// remapping transition targets, and returns the cloned fragment.
fn deep_copy(arena: &mut StateArena, fragment: Fragment) -> Fragment {
    let mut reachable = BTreeSet::from([fragment.start, fragment.end]);
    let mut stack = vec![fragment.start, fragment.end];

    while let Some(current) = stack.pop() {
        for targets in arena.state(current).transitions.values() {
            for target in targets.clone() {
                if reachable.insert(target) {
                    stack.push(target);
                }
            }
        }
    }

    // allocate clones in ID order so relative creation order is preserved
    let mut mapping = BTreeMap::new();
    for old in &reachable {
        mapping.insert(*old, arena.add_state());
    }

    for (old, new) in &mapping {
        let cloned = arena.state(*old).clone();
        let remapped = cloned
            .transitions
            .into_iter()
            .map(|(symbol, targets)| {
                let targets = targets.into_iter().map(|x| mapping[&x]).collect();
                (symbol, targets)
            })
            .collect();

        let state = arena.state_mut(*new);
        state.transitions = remapped;
    }

    Fragment {
        start: mapping[&fragment.start],
        end: mapping[&fragment.end],
    }
}
