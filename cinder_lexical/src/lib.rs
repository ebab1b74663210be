//! This crate implements the lexical analysis phase of the Cinder compiler.
//!
//! Token patterns are declared as regular expressions in a prioritised
//! pattern table ([`pattern::default_table`]). Each pattern runs through a
//! small compilation pipeline (the [`regex`] atomizer and postfix compiler,
//! Thompson construction in [`nfa`], and subset construction in [`dfa`])
//! producing one deterministic automaton per pattern. The [`lexer::Lexer`]
//! then scans each source unit left to right, emitting the longest match
//! found by any automaton at every position.
//!
//! The final output of this phase is an ordered stream of
//! [`token::Token`]s, meant to be consumed by the next stage of the
//! compilation process.

#![deny(
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    clippy::missing_errors_doc
)]
#![allow(clippy::missing_panics_doc, clippy::missing_const_for_fn)]

pub mod dfa;
pub mod error;
pub mod lexer;
pub mod nfa;
pub mod pattern;
pub mod regex;
pub mod token;
