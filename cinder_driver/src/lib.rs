//! Contains the command line driver of the Cinder compiler front end.

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

use std::{cell::Cell, fmt::Display, fs, path::PathBuf, process::ExitCode};

pub use clap::Parser;
use cinder_base::{
    diagnostic::{Handler, Tracer},
    log::{Message, Severity},
};
use cinder_lexical::lexer::Lexer;

pub mod fixture;

/// The arguments to the program.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, clap::Parser)]
#[clap(
    name = "cinder",
    about = "Cinder programming language compiler front end.",
    author = "cfdefense@proton.me"
)]
pub struct Argument {
    /// The input file to tokenize.
    pub file: Option<PathBuf>,

    /// Prints out the token stream of the program.
    #[clap(long = "dump-tokens")]
    pub dump_tokens: bool,

    /// Runs the JSON test fixtures in the given directory instead of
    /// compiling a file.
    #[clap(long = "test")]
    pub test: Option<PathBuf>,

    /// Traces pattern compilation diagnostics to the standard error
    /// stream.
    #[clap(long = "verbose")]
    pub verbose: bool,
}

/// A struct that implements [`Handler`] but prints all the message to the standard error stream.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Printer {
    printed: Cell<bool>,
}

impl Printer {
    /// Creates a new [`Printer`].
    fn new() -> Self {
        Self {
            printed: Cell::new(false),
        }
    }

    fn has_printed(&self) -> bool { self.printed.get() }
}

impl<E: Display> Handler<E> for Printer {
    fn receive(&self, error: E) {
        eprintln!("{error}");
        self.printed.set(true);
    }
}

/// Runs the program with the given arguments.
#[must_use]
pub fn run(argument: &Argument) -> ExitCode {
    if let Some(directory) = &argument.test {
        return fixture::run_directory(directory);
    }

    let Some(file) = &argument.file else {
        let msg = Message::new(Severity::Error, "no input file given");
        eprintln!("{msg}");
        return ExitCode::FAILURE;
    };

    let content = match fs::read_to_string(file) {
        Ok(content) => content,
        Err(error) => {
            let msg = Message::new(Severity::Error, format!("{}: {error}", file.display()));
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let printer = Printer::new();

    let mut lexer = if argument.verbose {
        Lexer::new(&Tracer::new("pattern"))
    } else {
        Lexer::new(&printer)
    };
    lexer.set_content(file.display().to_string(), content);
    lexer.lexical_analysis(&printer);

    let token_stream = lexer.take_token_stream();

    if argument.dump_tokens {
        for token in &token_stream {
            println!(
                "{}:{}\t{}\t{:?}",
                token.row(),
                token.col(),
                token.kind(),
                token.text()
            );
        }
    }

    if printer.has_printed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
