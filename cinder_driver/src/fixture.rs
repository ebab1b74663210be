//! Contains the JSON test-fixture harness.
//!
//! A fixture file holds an array of test cases, each pairing a source
//! snippet with the token stream it must produce:
//!
//! ```json
//! [{
//!     "test_name": "assignment",
//!     "description": "a simple assignment statement",
//!     "code": "x = 42;",
//!     "result": [
//!         { "type": "IDENTIFIER", "content": "x" },
//!         { "type": "ASSIGN", "content": "=" },
//!         { "type": "INT_LITERAL", "content": "42" },
//!         { "type": "SEMICOLON", "content": ";" }
//!     ]
//! }]
//! ```

use std::{fs, path::Path, process::ExitCode};

use serde::Deserialize;

use cinder_base::{
    diagnostic::Dummy,
    log::{Message, Severity},
};
use cinder_lexical::{lexer::Lexer, token::Token};

/// Is one expected token of a fixture: its kind name and its exact text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResult {
    /// The canonical screaming-case name of the expected kind.
    #[serde(rename = "type")]
    pub kind: String,

    /// The exact source text of the expected token.
    pub content: String,
}

/// Is one test case of a fixture file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestCase {
    /// The name of the test case.
    pub test_name: String,

    /// A human-readable description of what the case covers.
    pub description: String,

    /// The source snippet to tokenize.
    pub code: String,

    /// The token stream the snippet must produce.
    pub result: Vec<TokenResult>,
}

/// Is the outcome of one executed test case.
#[derive(Debug, Clone)]
pub struct TestOutcome {
    /// The test case that was executed.
    pub case: TestCase,

    /// Whether the produced stream matched the expectation.
    pub passed: bool,

    /// The token stream the lexer actually produced.
    pub actual: Vec<Token>,
}

/// Runs one test case through a fresh analysis session of the given lexer.
pub fn run_case(lexer: &mut Lexer, case: TestCase) -> TestOutcome {
    lexer.reset();
    lexer.set_content("test_input", case.code.clone());
    lexer.lexical_analysis(&Dummy);

    let actual = lexer.take_token_stream();
    let passed = compare(&actual, &case.result);

    TestOutcome {
        case,
        passed,
        actual,
    }
}

/// Checks an actual token stream against the expected one, comparing kind
/// names and exact texts position by position.
#[must_use]
pub fn compare(actual: &[Token], expected: &[TokenResult]) -> bool {
    actual.len() == expected.len()
        && actual.iter().zip(expected).all(|(token, expectation)| {
            token.kind().as_str() == expectation.kind && *token.text() == expectation.content
        })
}

/// Parses a fixture file into its test cases.
///
/// # Errors
/// Returns the underlying I/O or JSON error message.
pub fn load_file(path: &Path) -> Result<Vec<TestCase>, String> {
    let content = fs::read_to_string(path).map_err(|error| error.to_string())?;
    serde_json::from_str(&content).map_err(|error| error.to_string())
}

/// Runs every `.json` fixture file in the given directory and prints a
/// summary; the exit code reflects whether every case passed.
#[must_use]
pub fn run_directory(directory: &Path) -> ExitCode {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(error) => {
            let msg = Message::new(
                Severity::Error,
                format!("{}: {error}", directory.display()),
            );
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let mut lexer = Lexer::new(&Dummy);
    let mut passed = 0usize;
    let mut failed = 0usize;

    let mut paths = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|extension| extension == "json"))
        .collect::<Vec<_>>();
    paths.sort();

    for path in paths {
        let cases = match load_file(&path) {
            Ok(cases) => cases,
            Err(error) => {
                let msg = Message::new(
                    Severity::Error,
                    format!("{}: {error}", path.display()),
                );
                eprintln!("{msg}");
                failed += 1;
                continue;
            }
        };

        for case in cases {
            let outcome = run_case(&mut lexer, case);

            if outcome.passed {
                passed += 1;
            } else {
                failed += 1;

                let msg = Message::new(
                    Severity::Error,
                    format!("test `{}` failed", outcome.case.test_name),
                );
                eprintln!("{msg}");

                for token in &outcome.actual {
                    eprintln!("    {}\t{:?}", token.kind(), token.text());
                }
            }
        }
    }

    let msg = Message::new(
        Severity::Info,
        format!("{passed} passed, {failed} failed"),
    );
    eprintln!("{msg}");

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
