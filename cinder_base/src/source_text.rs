//! Contains the code related to the in-memory source text input.
//!
//! The lexical engine never touches a filesystem: whichever collaborator
//! scanned the project directory is responsible for reading each file and
//! registering its full text in a [`SourceMap`] before analysis begins.

use std::{fmt::Debug, ops::Range, sync::Arc};

use getset::Getters;

/// Represents one complete source unit handed to the lexical engine.
#[derive(Getters)]
pub struct SourceText {
    /// Gets the identifier of the source unit (typically a file name).
    #[get = "pub"]
    name: String,

    /// Gets the full text of the source unit.
    #[get = "pub"]
    content: String,

    lines: Vec<Range<usize>>,
}

impl Debug for SourceText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceText")
            .field("name", &self.name)
            .field("lines", &self.lines.len())
            .finish()
    }
}

impl SourceText {
    /// Creates a new [`SourceText`] from the given identifier and content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Arc<Self> {
        let content = content.into();
        let lines = get_line_byte_positions(&content);

        Arc::new(Self {
            name: name.into(),
            content,
            lines,
        })
    }

    /// Gets the line of the source text at the given line number.
    ///
    /// The line number starts at 1.
    #[must_use]
    pub fn get_line(&self, line: usize) -> Option<&str> {
        if line == 0 {
            return None;
        }

        self.lines
            .get(line - 1)
            .map(|range| &self.content[range.clone()])
    }

    /// Gets the number of lines in the source text.
    #[must_use]
    pub fn line_number(&self) -> usize { self.lines.len() }
}

/// Is a struct pointing to a particular row and column in a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Location {
    /// The row number of the location (starts at 1).
    pub row: usize,

    /// The column number of the location (starts at 1).
    pub col: usize,
}

impl Location {
    /// Creates a new [`Location`] from the given row and column.
    #[must_use]
    pub fn new(row: usize, col: usize) -> Self { Self { row, col } }
}

/// Is an insertion-ordered collection mapping source-unit identifiers to
/// their full text.
///
/// Registering a unit under an identifier that already exists replaces the
/// previous entry in place, keeping its position in the iteration order.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    entries: Vec<Arc<SourceText>>,
}

impl SourceMap {
    /// Creates a new empty [`SourceMap`].
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Registers a source unit, returning the stored [`SourceText`].
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Arc<SourceText> {
        let source = SourceText::new(name, content);

        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|entry| entry.name() == source.name())
        {
            *existing = source.clone();
        } else {
            self.entries.push(source.clone());
        }

        source
    }

    /// Gets the source unit registered under the given identifier.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<SourceText>> {
        self.entries.iter().find(|entry| entry.name() == name)
    }

    /// Iterates over the registered source units in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SourceText>> { self.entries.iter() }

    /// Gets the number of registered source units.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Checks whether the map has no registered source units.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Removes every registered source unit.
    pub fn clear(&mut self) { self.entries.clear(); }
}

fn get_line_byte_positions(text: &str) -> Vec<Range<usize>> {
    let mut current_position = 0;
    let mut results = Vec::new();

    let mut skip = false;

    for (byte, char) in text.char_indices() {
        if skip {
            skip = false;
            continue;
        }

        // ordinary lf
        if char == '\n' {
            #[allow(clippy::range_plus_one)]
            results.push(current_position..byte + 1);

            current_position = byte + 1;
        }

        // crlf
        if char == '\r' {
            if text.as_bytes().get(byte + 1) == Some(&b'\n') {
                results.push(current_position..byte + 2);

                current_position = byte + 2;

                skip = true;
            } else {
                #[allow(clippy::range_plus_one)]
                results.push(current_position..byte + 1);

                current_position = byte + 1;
            }
        }
    }

    results.push(current_position..text.len());

    results
}

#[cfg(test)]
mod tests;
