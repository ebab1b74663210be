//! Provides the functions related to logging/printing messages to the console.

use std::fmt::Display;

use derive_new::new;
use formatting::{Color, Style};

use crate::source_text::{Location, SourceText};

pub mod formatting;

/// Represents the severity of a log message to be printed to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Severity {
    Error,
    Info,
    Warning,
}

/// Is a struct implementing [`Display`] that represents a log message to be
/// displayed to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, new)]
pub struct Message<T> {
    /// The severity of the log message.
    pub severity: Severity,

    /// The message to be displayed.
    pub display: T,
}

impl<T: Display> Display for Message<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let log_header = Style::Bold.with(match self.severity {
            Severity::Error => Style::Foreground(Color::Red).with("[error]:"),
            Severity::Info => Style::Foreground(Color::Green).with("[info]:"),
            Severity::Warning => Style::Foreground(Color::Yellow).with("[warning]:"),
        });

        let message_part = Style::Bold.with(&self.display);

        write!(f, "{log_header} {message_part}")
    }
}

/// Structure implementing [`Display`] that prints the source line containing
/// a particular location, with a caret marking the offending column.
#[derive(Debug, Clone, Copy, new)]
pub struct SourceLineDisplay<'a, T> {
    /// The source text the location points into.
    pub source: &'a SourceText,

    /// The location to be marked.
    pub location: Location,

    /// The help message to be displayed under the caret.
    pub help_display: Option<T>,
}

impl<'a, T: Display> Display for SourceLineDisplay<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let gutter = Style::Bold.with(Style::Foreground(Color::Cyan).with("┃"));

        writeln!(
            f,
            " {} {}:{}:{}",
            Style::Bold.with(Style::Foreground(Color::Cyan).with("-->")),
            self.source.name(),
            self.location.row,
            self.location.col
        )?;

        let Some(line) = self.source.get_line(self.location.row) else {
            return Ok(());
        };

        write!(
            f,
            "{}{} ",
            Style::Bold.with(Style::Foreground(Color::Cyan).with(self.location.row)),
            gutter
        )?;

        for char in line.chars() {
            // tabs are rendered as four spaces so the caret lines up
            if char == '\t' {
                write!(f, "    ")?;
            } else if char != '\n' && char != '\r' {
                write!(f, "{char}")?;
            }
        }
        writeln!(f)?;

        write!(f, "{:width$}{gutter} ", "", width = digit_count(self.location.row))?;

        for (index, char) in line.chars().enumerate() {
            if index + 1 >= self.location.col {
                break;
            }

            write!(f, "{}", if char == '\t' { "    " } else { " " })?;
        }

        write!(
            f,
            "{}",
            Style::Bold.with(Style::Foreground(Color::Red).with("^"))
        )?;

        if let Some(message) = &self.help_display {
            write!(f, " {}: {message}", Style::Bold.with("help"))?;
        }

        writeln!(f)
    }
}

fn digit_count(mut number: usize) -> usize {
    let mut digits = 0;

    while number > 0 {
        number /= 10;
        digits += 1;
    }

    digits
}

#[cfg(test)]
pub(crate) mod tests;
