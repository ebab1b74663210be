//! Contains all kinds of diagnostics the lexical analysis can report while
//! tokenizing the source code or compiling the pattern table.

use std::{fmt::Display, sync::Arc};

use derive_more::From;
use enum_as_inner::EnumAsInner;
use getset::Getters;

use cinder_base::{
    log::{Message, Severity, SourceLineDisplay},
    source_text::{Location, SourceText},
};

use crate::regex::Fidelity;

/// The source code contains a printable character no pattern recognizes.
#[derive(Debug, Clone, Getters)]
pub struct UnrecognizedCharacter {
    /// The source unit the character appears in.
    pub source: Arc<SourceText>,

    /// The location of the character.
    pub location: Location,

    /// The character itself.
    pub character: char,
}

impl Display for UnrecognizedCharacter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{}",
            Message::new(
                Severity::Error,
                format!("found an unrecognized character `{}`", self.character)
            ),
            SourceLineDisplay::new(&self.source, self.location, Option::<i32>::None)
        )
    }
}

/// The source code contains a control or non-ASCII character outside a
/// string or character literal.
#[derive(Debug, Clone, Getters)]
pub struct ForbiddenCharacter {
    /// The source unit the character appears in.
    pub source: Arc<SourceText>,

    /// The location of the character.
    pub location: Location,

    /// The character itself.
    pub character: char,
}

impl Display for ForbiddenCharacter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{}",
            Message::new(
                Severity::Error,
                format!(
                    "found a forbidden character `{}` outside any literal",
                    self.character.escape_default()
                )
            ),
            SourceLineDisplay::new(
                &self.source,
                self.location,
                Some("only printable ASCII characters may appear here")
            )
        )
    }
}

/// The source code contains a decimal integer literal too long to fit the
/// widest machine integer.
#[derive(Debug, Clone, Getters)]
pub struct OversizedIntegerLiteral {
    /// The source unit the literal appears in.
    pub source: Arc<SourceText>,

    /// The location where the literal starts.
    pub location: Location,

    /// The digit run of the literal.
    pub digits: String,
}

impl Display for OversizedIntegerLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{}",
            Message::new(
                Severity::Error,
                format!(
                    "found an integer literal of {} digits, which cannot fit any machine integer",
                    self.digits.len()
                )
            ),
            SourceLineDisplay::new(&self.source, self.location, Option::<i32>::None)
        )
    }
}

/// The source code contains two or more commas in a row.
#[derive(Debug, Clone, Getters)]
pub struct ConsecutiveCommas {
    /// The source unit the commas appear in.
    pub source: Arc<SourceText>,

    /// The location of the first extra comma.
    pub location: Location,

    /// The run of extra commas past the first.
    pub extra: String,
}

impl Display for ConsecutiveCommas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{}",
            Message::new(Severity::Error, "found consecutive commas"),
            SourceLineDisplay::new(
                &self.source,
                self.location,
                Some("only the first comma is kept; the rest are in error")
            )
        )
    }
}

/// A pattern table row could not be compiled exactly and was degraded to a
/// repaired or permissive program.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct DegradedPattern {
    /// The name of the pattern table row.
    pub pattern_name: String,

    /// Which degraded form the compilation produced.
    pub fidelity: Fidelity,
}

impl Display for DegradedPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let form = match self.fidelity {
            Fidelity::Exact => "exact",
            Fidelity::Repaired => "repaired",
            Fidelity::Permissive => "permissive match-anything",
        };

        write!(
            f,
            "{}",
            Message::new(
                Severity::Warning,
                format!(
                    "the pattern `{}` could not be compiled exactly; a {form} program was \
                     substituted",
                    self.pattern_name
                )
            )
        )
    }
}

/// A pattern's subset construction exceeded a resource ceiling and was
/// replaced by the permissive fallback automaton.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct FallbackConstruction {
    /// The name of the pattern table row.
    pub pattern_name: String,
}

impl Display for FallbackConstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            Message::new(
                Severity::Warning,
                format!(
                    "the pattern `{}` exceeded the subset construction limits; the permissive \
                     fallback automaton was substituted",
                    self.pattern_name
                )
            )
        )
    }
}

/// A pattern table row defeated automaton construction entirely and was
/// skipped.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MalformedPattern {
    /// The name of the pattern table row.
    pub pattern_name: String,
}

impl Display for MalformedPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            Message::new(
                Severity::Warning,
                format!(
                    "the pattern `{}` defeated automaton construction and was skipped",
                    self.pattern_name
                )
            )
        )
    }
}

/// Is an enumeration containing all kinds of diagnostics the lexical
/// analysis can report.
#[derive(Debug, Clone, EnumAsInner, From)]
#[allow(missing_docs)]
pub enum Error {
    UnrecognizedCharacter(UnrecognizedCharacter),
    ForbiddenCharacter(ForbiddenCharacter),
    OversizedIntegerLiteral(OversizedIntegerLiteral),
    ConsecutiveCommas(ConsecutiveCommas),
    DegradedPattern(DegradedPattern),
    FallbackConstruction(FallbackConstruction),
    MalformedPattern(MalformedPattern),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnrecognizedCharacter(err) => write!(f, "{err}"),
            Self::ForbiddenCharacter(err) => write!(f, "{err}"),
            Self::OversizedIntegerLiteral(err) => write!(f, "{err}"),
            Self::ConsecutiveCommas(err) => write!(f, "{err}"),
            Self::DegradedPattern(err) => write!(f, "{err}"),
            Self::FallbackConstruction(err) => write!(f, "{err}"),
            Self::MalformedPattern(err) => write!(f, "{err}"),
        }
    }
}
