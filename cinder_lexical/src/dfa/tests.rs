use super::{Construction, Dfa, MAX_ALPHABET_SYMBOLS};
use crate::{
    nfa::{Nfa, Symbol},
    pattern::TokenClass,
    regex::compile,
};

fn determinize(pattern: &str, class: TokenClass) -> Dfa {
    Dfa::from_nfa(&Nfa::build(&compile(pattern), class).unwrap())
}

#[test]
fn keyword_matches_in_one_transition() {
    let dfa = determinize("while", TokenClass::Keyword);

    assert_eq!(dfa.construction(), Construction::Subset);
    assert!(dfa.alphabet().contains(&Symbol::text("while")));
    assert_eq!(dfa.longest_prefix("while"), Some(5));
    assert_eq!(dfa.longest_prefix("whilst"), None);
}

#[test]
fn longest_prefix_is_maximal() {
    let dfa = determinize("[a-zA-Z_][a-zA-Z0-9_]*", TokenClass::Identifier);

    assert_eq!(dfa.longest_prefix("counter = 1"), Some(7));
    assert_eq!(dfa.longest_prefix("x"), Some(1));
    assert_eq!(dfa.longest_prefix("_tmp9;"), Some(5));
    assert_eq!(dfa.longest_prefix("9abc"), None);
}

#[test]
fn alternation_collapses_deterministically() {
    let dfa = determinize("if|else|while", TokenClass::Keyword);

    assert_eq!(dfa.construction(), Construction::Subset);
    for (input, expected) in [("if", 2), ("else", 4), ("while", 5)] {
        assert_eq!(dfa.longest_prefix(input), Some(expected));
    }
    assert_eq!(dfa.longest_prefix("for"), None);
}

#[test]
fn accepting_state_carries_minimal_class() {
    let dfa = determinize("[0-9]+", TokenClass::Literal);

    let accepting = dfa
        .states()
        .iter()
        .find(|state| state.accepting())
        .unwrap();
    assert_eq!(accepting.class(), Some(TokenClass::Literal));
}

#[test]
fn equal_subsets_share_one_state() {
    // `a*` loops back to the same subset after every `a`
    let dfa = determinize("a*", TokenClass::Identifier);

    let loops = dfa
        .states()
        .iter()
        .filter(|state| state.transitions().values().any(|target| *target == state.id()))
        .count();
    assert!(loops >= 1);
    assert_eq!(dfa.longest_prefix("aaaa"), Some(4));
}

#[test]
fn dot_becomes_the_last_resort_transition() {
    let dfa = determinize("a.c", TokenClass::Identifier);

    assert_eq!(dfa.longest_prefix("abc"), Some(3));
    assert_eq!(dfa.longest_prefix("azc"), Some(3));
    assert_eq!(dfa.longest_prefix("ac"), None);
}

#[test]
fn permissive_program_accepts_everything() {
    // the empty pattern degrades to the permissive match-anything program
    let dfa = determinize("", TokenClass::Unknown);

    assert_eq!(dfa.longest_prefix(""), Some(0));
    assert_eq!(dfa.longest_prefix("anything at all"), Some(15));
}

#[test]
fn oversized_alphabet_is_substituted() {
    // 200 distinct multi-character literals exceed the symbol ceiling
    let giant = (0..200)
        .map(|x| format!("w{x}"))
        .collect::<Vec<_>>()
        .join("|");
    let nfa = Nfa::build(&compile(&giant), TokenClass::Keyword).unwrap();
    let dfa = Dfa::from_nfa(&nfa);

    assert!(dfa.alphabet().len() <= MAX_ALPHABET_SYMBOLS);
}

#[test]
fn fallback_automaton_shape() {
    let nfa = Nfa::build(&compile("a"), TokenClass::Identifier).unwrap();
    let dfa = super::fallback(&nfa);

    assert_eq!(dfa.construction(), Construction::Fallback);
    assert_eq!(dfa.states().len(), 2);

    // not the empty prefix: the start state does not accept
    assert_eq!(dfa.longest_prefix(""), None);
    assert_eq!(dfa.longest_prefix("x"), Some(1));

    // the accepting state has no way out, so a degraded pattern consumes
    // one symbol at a time instead of swallowing the rest of the input
    assert_eq!(dfa.longest_prefix("xyz"), Some(1));
}

#[test]
fn anchors_are_coarsened_away() {
    // subset construction treats anchors as freely crossable
    let dfa = determinize("^abc$", TokenClass::Identifier);

    assert_eq!(dfa.longest_prefix("abc"), Some(3));
}

#[test]
fn state_count_stays_within_bounds() {
    let dfa = determinize("(a|b)*abb", TokenClass::Identifier);

    assert!(dfa.states().len() <= super::MAX_DFA_STATES);
    assert_eq!(dfa.longest_prefix("abb"), Some(3));
    assert_eq!(dfa.longest_prefix("ababb"), Some(5));
}
