//! Contains the subset construction of deterministic automata and the
//! longest-prefix matcher the tokenizer drives.
//!
//! Subset construction is bounded: an oversized discovered alphabet is
//! substituted by the printable working alphabet, and blowing past the state
//! or time ceiling abandons the construction in favour of a named
//! two-state permissive fallback. The caller can always see which path
//! produced the automaton through [`Construction`].

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, VecDeque},
    time::{Duration, Instant},
};

use getset::{CopyGetters, Getters};

use crate::{
    nfa::{working_alphabet, Nfa, StateId, Symbol},
    pattern::TokenClass,
};

/// The number of distinct transition symbols beyond which the discovered
/// alphabet is replaced by the printable working alphabet.
pub const MAX_ALPHABET_SYMBOLS: usize = 128;

/// The number of deterministic states beyond which subset construction is
/// abandoned.
pub const MAX_DFA_STATES: usize = 1000;

/// The wall-clock budget for one subset construction.
pub const MAX_CONVERSION_TIME: Duration = Duration::from_millis(5000);

/// Is an index of a state inside a [`Dfa`].
pub type DfaStateId = usize;

/// Is an enumeration naming which construction path produced a [`Dfa`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Construction {
    /// Full subset construction completed within the limits.
    Subset,

    /// A limit was exceeded and the two-state permissive fallback was
    /// substituted.
    Fallback,
}

/// Is one state of a deterministic automaton.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct DfaState {
    /// Gets the ID of this state.
    #[get_copy = "pub"]
    id: DfaStateId,

    /// Gets whether this state accepts.
    #[get_copy = "pub"]
    accepting: bool,

    /// Gets the result classification, meaningful only when accepting.
    #[get_copy = "pub"]
    class: Option<TokenClass>,

    /// Gets the outgoing transitions; at most one target per symbol.
    #[get = "pub"]
    transitions: BTreeMap<Symbol, DfaStateId>,

    /// Gets the set of nondeterministic states this state collapses,
    /// retained for diagnostics.
    #[get = "pub"]
    nfa_states: BTreeSet<StateId>,
}

/// Is a deterministic automaton produced from an [`Nfa`] by subset
/// construction, or its permissive fallback.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct Dfa {
    /// Gets the ID of the start state.
    #[get_copy = "pub"]
    start: DfaStateId,

    /// Gets the states of the automaton, indexed by their IDs.
    #[get = "pub"]
    states: Vec<DfaState>,

    /// Gets the working alphabet of the construction.
    #[get = "pub"]
    alphabet: BTreeSet<Symbol>,

    /// Gets which construction path produced this automaton.
    #[get_copy = "pub"]
    construction: Construction,
}

impl Dfa {
    /// Converts a nondeterministic automaton into a deterministic one.
    ///
    /// This function is total: exceeding [`MAX_DFA_STATES`] or
    /// [`MAX_CONVERSION_TIME`] abandons the construction and returns the
    /// permissive fallback automaton instead of failing.
    #[must_use]
    pub fn from_nfa(nfa: &Nfa) -> Self {
        let started = Instant::now();
        let alphabet = discover_alphabet(nfa);

        let arena = nfa.arena();
        let initial = arena.sentinel_closure(&BTreeSet::from([nfa.start()]));

        let mut states = vec![subset_state(nfa, 0, initial.clone())];
        let mut memo: HashMap<String, DfaStateId> = HashMap::new();
        memo.insert(signature(&initial), 0);

        let mut queue = VecDeque::from([0]);

        while let Some(current) = queue.pop_front() {
            if states.len() > MAX_DFA_STATES || started.elapsed() > MAX_CONVERSION_TIME {
                return fallback(nfa);
            }

            let subset = states[current].nfa_states.clone();

            // Any matches every character, so its targets join the move on
            // each concrete symbol; on their own they form the last-resort
            // transition for characters outside the alphabet
            let any_moved = arena.move_on(&subset, &Symbol::Any);

            for symbol in alphabet.iter().chain(
                (!any_moved.is_empty())
                    .then_some(&Symbol::Any)
                    .into_iter(),
            ) {
                let mut moved = arena.move_on(&subset, symbol);
                if *symbol != Symbol::Any {
                    moved.extend(any_moved.iter().copied());
                }

                if moved.is_empty() {
                    continue;
                }

                let target_subset = arena.sentinel_closure(&moved);
                let target_signature = signature(&target_subset);

                let target = if let Some(existing) = memo.get(&target_signature) {
                    *existing
                } else {
                    let id = states.len();
                    states.push(subset_state(nfa, id, target_subset));
                    memo.insert(target_signature, id);
                    queue.push_back(id);
                    id
                };

                states[current].transitions.insert(symbol.clone(), target);
            }
        }

        Self {
            start: 0,
            states,
            alphabet,
            construction: Construction::Subset,
        }
    }

    /// Finds the longest prefix of the input this automaton accepts,
    /// returning its byte length.
    ///
    /// At each position multi-character transition symbols are tried from
    /// longest to shortest before single characters, and [`Symbol::Any`]
    /// serves as the last resort.
    #[must_use]
    pub fn longest_prefix(&self, input: &str) -> Option<usize> {
        let mut current = self.start;
        let mut position = 0;
        let mut last_accepting = self.states[current].accepting.then_some(0);

        while position < input.len() {
            let rest = &input[position..];
            let state = &self.states[current];

            let mut step = None;

            // transitions iterate in Ord order, so the longest matching
            // text symbol wins
            for (symbol, target) in &state.transitions {
                if let Symbol::Text(text) = symbol {
                    if rest.starts_with(text.as_str())
                        && step.map_or(true, |(length, _)| text.len() > length)
                    {
                        step = Some((text.len(), *target));
                    }
                }
            }

            if step.is_none() {
                if let Some(target) = state.transitions.get(&Symbol::Any) {
                    let length = rest.chars().next().map_or(0, char::len_utf8);
                    if length > 0 {
                        step = Some((length, *target));
                    }
                }
            }

            let Some((length, target)) = step else { break };

            position += length;
            current = target;

            if self.states[current].accepting {
                last_accepting = Some(position);
            }
        }

        last_accepting
    }
}

/// Collects every consuming symbol of the automaton, substituting the
/// printable working alphabet when more than [`MAX_ALPHABET_SYMBOLS`]
/// distinct symbols are discovered.
fn discover_alphabet(nfa: &Nfa) -> BTreeSet<Symbol> {
    let arena = nfa.arena();
    let mut alphabet = BTreeSet::new();

    for id in 0..arena.len() {
        for symbol in arena.state(id).transitions.keys() {
            if !symbol.is_sentinel() && *symbol != Symbol::Any {
                alphabet.insert(symbol.clone());
            }
        }
    }

    if alphabet.len() > MAX_ALPHABET_SYMBOLS {
        alphabet = working_alphabet()
            .map(|x| Symbol::text(x.to_string()))
            .collect();
    }

    alphabet
}

/// Builds the canonical signature of an NFA-state subset: the sorted state
/// IDs joined by commas.
fn signature(subset: &BTreeSet<StateId>) -> String {
    subset
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn subset_state(nfa: &Nfa, id: DfaStateId, subset: BTreeSet<StateId>) -> DfaState {
    let arena = nfa.arena();

    let class = subset
        .iter()
        .filter(|state| arena.state(**state).accepting)
        .filter_map(|state| arena.state(*state).class)
        .min();

    DfaState {
        id,
        accepting: class.is_some(),
        class,
        transitions: BTreeMap::new(),
        nfa_states: subset,
    }
}

/// Builds the named two-state permissive fallback: the start state steps to
/// an accepting state on any single character, and the accepting state has
/// no way out, so the degraded automaton matches exactly one symbol at a
/// time.
fn fallback(nfa: &Nfa) -> Dfa {
    let arena = nfa.arena();
    let class = arena.state(nfa.end()).class;

    let start = DfaState {
        id: 0,
        accepting: false,
        class: None,
        transitions: BTreeMap::from([(Symbol::Any, 1)]),
        nfa_states: BTreeSet::from([nfa.start()]),
    };

    let accepting = DfaState {
        id: 1,
        accepting: true,
        class,
        transitions: BTreeMap::new(),
        nfa_states: BTreeSet::from([nfa.end()]),
    };

    Dfa {
        start: 0,
        states: vec![start, accepting],
        alphabet: BTreeSet::from([Symbol::Any]),
        construction: Construction::Fallback,
    }
}

#[cfg(test)]
pub(crate) mod tests;
