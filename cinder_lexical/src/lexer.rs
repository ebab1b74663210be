//! Contains the tokenization engine driving the compiled pattern automata
//! over source units.

use std::sync::Arc;

use getset::Getters;

use cinder_base::{
    diagnostic::Handler,
    source_text::{Location, SourceMap, SourceText},
};

use crate::{
    error::{
        ConsecutiveCommas, Error, ForbiddenCharacter, OversizedIntegerLiteral,
        UnrecognizedCharacter,
    },
    pattern::{self, CompiledPattern, PatternDefinition, TokenClass},
    token::{
        self, is_oversized_decimal, keyword_kind, Token, TokenKind, OPERATORS, PUNCTUATORS,
        SPECIALS,
    },
};

/// Is the bracketing context a `{` opens: a plain block, or the body of an
/// `asm` block.
///
/// The lexer maintains an explicit stack of these so that assembly-specific
/// scanning rules apply exactly inside `asm { ... }` bodies, at any nesting
/// depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BraceContext {
    /// An ordinary block.
    Plain,

    /// The body of an `asm` block.
    Asm,
}

/// Is the tokenization engine: it owns the compiled pattern table, the
/// registered source units, and the token stream accumulated so far.
#[derive(Debug, Getters)]
pub struct Lexer {
    /// Gets the pattern table this lexer was built from.
    #[get = "pub"]
    table: Vec<PatternDefinition>,

    patterns: Vec<CompiledPattern>,

    /// Gets the registered source units.
    #[get = "pub"]
    sources: SourceMap,

    /// Gets the tokens accumulated by [`Self::lexical_analysis`].
    #[get = "pub"]
    token_stream: Vec<Token>,

    row: usize,
    col: usize,
    brace_stack: Vec<BraceContext>,
    asm_pending: bool,
}

impl Lexer {
    /// Creates a new [`Lexer`] from the default pattern table.
    ///
    /// Pattern compilation diagnostics are reported to the given handler.
    pub fn new(handler: &impl Handler<Error>) -> Self {
        Self::with_table(pattern::default_table(), handler)
    }

    /// Creates a new [`Lexer`] from the given pattern table, preserving the
    /// table's priority order.
    pub fn with_table(table: Vec<PatternDefinition>, handler: &impl Handler<Error>) -> Self {
        let patterns = pattern::compile_table(&table, handler);

        Self {
            table,
            patterns,
            sources: SourceMap::new(),
            token_stream: Vec::new(),
            row: 1,
            col: 1,
            brace_stack: Vec::new(),
            asm_pending: false,
        }
    }

    /// Registers a source unit under the given name, replacing any previous
    /// unit of the same name in place.
    pub fn set_content(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.sources.insert(name, content);
    }

    /// Tokenizes every registered source unit in registration order,
    /// appending to the token stream.
    ///
    /// Anomalies in the input never abort the scan; each is reported to the
    /// handler and represented in the stream by an `UNKNOWN` or `ERROR`
    /// token, so the output always covers the whole input.
    pub fn lexical_analysis(&mut self, handler: &impl Handler<Error>) {
        let sources = self.sources.iter().cloned().collect::<Vec<_>>();

        for source in sources {
            self.scan(&source, handler);
        }
    }

    /// Takes the accumulated token stream, leaving the lexer's stream empty.
    pub fn take_token_stream(&mut self) -> Vec<Token> { std::mem::take(&mut self.token_stream) }

    /// Clears all per-session state: the token stream, the registered
    /// sources, the position counters, and the bracketing mode stack.
    ///
    /// The compiled pattern table is kept; it is independent of any
    /// particular input.
    pub fn reset(&mut self) {
        self.token_stream.clear();
        self.sources.clear();
        self.row = 1;
        self.col = 1;
        self.brace_stack.clear();
        self.asm_pending = false;
    }

    fn in_asm(&self) -> bool { self.brace_stack.last() == Some(&BraceContext::Asm) }

    /// Scans one source unit from start to end.
    fn scan(&mut self, source: &Arc<SourceText>, handler: &impl Handler<Error>) {
        let content = source.content().as_str().to_owned();
        self.row = 1;
        self.col = 1;
        self.brace_stack.clear();
        self.asm_pending = false;

        let mut position = 0;

        while position < content.len() {
            if let Some(next) = self.skip_whitespace(&content, position) {
                position = next;
                continue;
            }

            if let Some(next) = self.scan_hash(&content, position) {
                position = next;
                continue;
            }

            if let Some(next) = self.scan_multi_line_comment(&content, position) {
                position = next;
                continue;
            }

            if let Some(next) = self.scan_compound(&content, position, source, handler) {
                position = next;
                continue;
            }

            if let Some(next) = self.scan_pattern_match(&content, position, source, handler) {
                position = next;
                continue;
            }

            position = self.scan_unrecognized(&content, position, source, handler);
        }
    }

    /// Records a token starting at the current position, then advances the
    /// position counters over its text and maintains the bracketing mode
    /// stack.
    fn emit(&mut self, kind: TokenKind, text: &str) {
        self.token_stream
            .push(Token::new(kind, text.to_string(), self.row, self.col));

        for character in text.chars() {
            if character == '\n' {
                self.row += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }

        match kind {
            TokenKind::Asm => self.asm_pending = true,

            TokenKind::OpeningBrace => {
                let context = if self.asm_pending {
                    BraceContext::Asm
                } else {
                    BraceContext::Plain
                };
                self.brace_stack.push(context);
                self.asm_pending = false;
            }

            TokenKind::ClosingBrace => {
                self.brace_stack.pop();
                self.asm_pending = false;
            }

            _ => self.asm_pending = false,
        }
    }

    fn skip_whitespace(&mut self, content: &str, position: usize) -> Option<usize> {
        let byte = content.as_bytes()[position];

        matches!(byte, b' ' | b'\t' | b'\n' | b'\r').then(|| {
            if byte == b'\n' {
                self.row += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }

            position + 1
        })
    }

    /// Scans a `#`: a doubled `##` yields two `HASH` tokens, a `#` in
    /// comment position swallows the rest of the line, and anything else is
    /// a lone `HASH`.
    fn scan_hash(&mut self, content: &str, position: usize) -> Option<usize> {
        let bytes = content.as_bytes();

        if bytes[position] != b'#' {
            return None;
        }

        if bytes.get(position + 1) == Some(&b'#') {
            self.emit(TokenKind::Hash, "#");
            self.emit(TokenKind::Hash, "#");
            return Some(position + 2);
        }

        // comment position: start of input, after whitespace, after one of
        // `} , )`, or anywhere inside an asm body
        let comment_position = position == 0
            || self.in_asm()
            || matches!(
                bytes[position - 1],
                b' ' | b'\t' | b'\n' | b'\r' | b'}' | b',' | b')'
            );

        // and only when followed by a space or the end of the line
        let followed = position + 1 >= bytes.len() || bytes[position + 1] == b' ';

        if comment_position && followed {
            let mut end = position + 1;
            while end < bytes.len() && bytes[end] != b'\n' && bytes[end] != b'\r' {
                end += 1;
            }

            self.emit(TokenKind::SingleLineComment, &content[position..end]);
            Some(end)
        } else {
            self.emit(TokenKind::Hash, "#");
            Some(position + 1)
        }
    }

    /// Scans a `/* ... */` comment; an unterminated comment swallows the
    /// rest of the input.
    fn scan_multi_line_comment(&mut self, content: &str, position: usize) -> Option<usize> {
        if !content[position..].starts_with("/*") {
            return None;
        }

        let end = content[position + 2..]
            .find("*/")
            .map_or(content.len(), |found| position + 2 + found + 2);

        self.emit(TokenKind::MultiLineComment, &content[position..end]);
        Some(end)
    }

    /// Scans the multi-character and context-dependent sequences the
    /// pattern automata cannot express on their own.
    #[allow(clippy::too_many_lines)]
    fn scan_compound(
        &mut self,
        content: &str,
        position: usize,
        source: &Arc<SourceText>,
        handler: &impl Handler<Error>,
    ) -> Option<usize> {
        let bytes = content.as_bytes();
        let rest = &content[position..];

        // `>>=` is two tokens, the shift and the assignment
        if rest.starts_with(">>=") {
            self.emit(TokenKind::RightShift, ">>");
            self.emit(TokenKind::Assign, "=");
            return Some(position + 3);
        }

        // `&mut` is the reference operator followed by the keyword
        if rest.starts_with("&mut") {
            self.emit(TokenKind::Ampersand, "&");
            self.emit(TokenKind::Mut, "mut");
            return Some(position + 4);
        }

        // prefix `++`/`--` split into two operator tokens; the postfix
        // forms fall through and match one character at a time
        if rest.starts_with("++") || rest.starts_with("--") {
            if position > 0 && is_word_byte(bytes[position - 1]) {
                return None;
            }

            let (kind, text) = if bytes[position] == b'+' {
                (TokenKind::Plus, "+")
            } else {
                (TokenKind::Minus, "-")
            };

            self.emit(kind, text);
            self.emit(kind, text);
            return Some(position + 2);
        }

        if rest.starts_with(":=") {
            self.emit(TokenKind::DeclareAssign, ":=");
            return Some(position + 2);
        }

        // a `%` outside an asm body is always the modulo operator; inside,
        // a letter after it starts a register name
        if bytes[position] == b'%' {
            let register = self.in_asm()
                && bytes
                    .get(position + 1)
                    .is_some_and(u8::is_ascii_alphabetic);

            if register {
                return Some(self.scan_register(content, position));
            }

            self.emit(TokenKind::Modulo, "%");
            return Some(position + 1);
        }

        if let Some(next) = self.scan_quoted(content, position, b'"', TokenKind::StringLiteral) {
            return Some(next);
        }

        if let Some(next) = self.scan_quoted(content, position, b'\'', TokenKind::CharLiteral) {
            return Some(next);
        }

        // `$` starts an immediate value inside an asm body
        if bytes[position] == b'$' {
            if self.in_asm() && bytes.get(position + 1).is_some_and(u8::is_ascii_digit) {
                let mut end = position + 1;
                while end < bytes.len()
                    && (bytes[end].is_ascii_hexdigit() || bytes[end] == b'x' || bytes[end] == b'X')
                {
                    end += 1;
                }

                self.emit(TokenKind::Identifier, &content[position..end]);
                return Some(end);
            }

            self.emit(TokenKind::Dollar, "$");
            return Some(position + 1);
        }

        // a standalone underscore is its own token; one leading an
        // identifier falls through to the identifier pattern
        if bytes[position] == b'_'
            && !bytes.get(position + 1).copied().is_some_and(is_word_byte)
        {
            self.emit(TokenKind::Underscore, "_");
            return Some(position + 1);
        }

        // of a run of consecutive commas only the first is well-formed
        if bytes[position] == b',' {
            let run = bytes[position..].iter().take_while(|x| **x == b',').count();

            if run >= 2 {
                self.emit(TokenKind::Comma, ",");

                let location = Location::new(self.row, self.col);
                self.emit(TokenKind::Error, &content[position + 1..position + run]);

                handler.receive(Error::ConsecutiveCommas(ConsecutiveCommas {
                    source: source.clone(),
                    location,
                    extra: content[position + 1..position + run].to_string(),
                }));

                return Some(position + run);
            }
        }

        // an over-long run of slashes splits into `//` operator pairs with
        // a trailing single divide when the run is odd
        if bytes[position] == b'/' {
            let run = bytes[position..].iter().take_while(|x| **x == b'/').count();

            if run >= 3 {
                for _ in 0..run / 2 {
                    self.emit(TokenKind::Operator, "//");
                }

                if run % 2 == 1 {
                    self.emit(TokenKind::Divide, "/");
                }

                return Some(position + run);
            }
        }

        // asm memory addressing: `-8(%rbp)` and `16(%rsp)` keep the
        // displacement as one identifier
        if self.in_asm() {
            let digits_start =
                if bytes[position] == b'-' && bytes.get(position + 1).is_some_and(u8::is_ascii_digit)
                {
                    Some(position + 1)
                } else if bytes[position].is_ascii_digit() {
                    Some(position)
                } else {
                    None
                };

            if let Some(start) = digits_start {
                let mut end = start;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }

                let addressing = bytes.get(end) == Some(&b'(');

                if addressing || bytes[position] != b'-' {
                    self.emit(TokenKind::Identifier, &content[position..end]);
                    return Some(end);
                }
            }
        }

        // `0x`/`0b` literals are scanned whole so the prefix is never
        // split off as a bare zero
        if bytes[position] == b'0'
            && matches!(bytes.get(position + 1), Some(b'x' | b'X' | b'b' | b'B'))
        {
            let mut end = position + 2;
            while end < bytes.len() && bytes[end].is_ascii_alphanumeric() {
                end += 1;
            }

            let text = &content[position..end];

            if token::is_numeric(text) {
                self.emit(TokenKind::IntLiteral, text);
                return Some(end);
            }
        }

        // a digit run flush against a word is a literal and an identifier,
        // not one malformed name
        if bytes[position].is_ascii_digit() {
            let mut digits_end = position;
            while digits_end < bytes.len() && bytes[digits_end].is_ascii_digit() {
                digits_end += 1;
            }

            if digits_end < bytes.len() && is_word_byte(bytes[digits_end]) {
                let mut word_end = digits_end;
                while word_end < bytes.len() && is_word_byte(bytes[word_end]) {
                    word_end += 1;
                }

                self.emit(TokenKind::IntLiteral, &content[position..digits_end]);
                self.emit(TokenKind::Identifier, &content[digits_end..word_end]);
                return Some(word_end);
            }
        }

        None
    }

    /// Scans an asm register name from a `%`, keeping balanced parentheses
    /// such as `%st(1)` inside the token.
    fn scan_register(&mut self, content: &str, position: usize) -> usize {
        let bytes = content.as_bytes();
        let mut end = position + 1;
        let mut depth = 0;

        while end < bytes.len() {
            let byte = bytes[end];

            match byte {
                b'(' => depth += 1,
                b')' => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                b',' if depth == 0 => break,
                byte if byte.is_ascii_alphanumeric() => (),
                _ => break,
            }

            end += 1;
        }

        self.emit(TokenKind::Identifier, &content[position..end]);
        end
    }

    /// Scans a quoted literal with backslash escapes; an unterminated
    /// literal falls through to the pattern automata.
    fn scan_quoted(
        &mut self,
        content: &str,
        position: usize,
        quote: u8,
        kind: TokenKind,
    ) -> Option<usize> {
        let bytes = content.as_bytes();

        if bytes[position] != quote {
            return None;
        }

        let mut end = position + 1;
        while end < bytes.len() && bytes[end] != quote {
            if bytes[end] == b'\\' && end + 1 < bytes.len() {
                end += 2;
            } else {
                end += 1;
            }
        }

        if end >= bytes.len() {
            return None;
        }

        end += 1;
        self.emit(kind, &content[position..end]);
        Some(end)
    }

    /// Runs every pattern automaton at the current position and emits the
    /// classified longest match.
    ///
    /// Ties go to the pattern earliest in the table; a later pattern must
    /// match strictly longer to win.
    fn scan_pattern_match(
        &mut self,
        content: &str,
        position: usize,
        source: &Arc<SourceText>,
        handler: &impl Handler<Error>,
    ) -> Option<usize> {
        let rest = &content[position..];

        let mut best: Option<(usize, TokenClass)> = None;

        for pattern in &self.patterns {
            if let Some(length) = pattern.dfa().longest_prefix(rest) {
                if length > 0 && best.map_or(true, |(best_length, _)| length > best_length) {
                    best = Some((length, pattern.class()));
                }
            }
        }

        let (length, class) = best?;
        let text = &rest[..length];

        self.classify(class, text, source, handler);
        Some(position + length)
    }

    /// Turns a classified match into its final token kind and emits it.
    fn classify(
        &mut self,
        class: TokenClass,
        text: &str,
        source: &Arc<SourceText>,
        handler: &impl Handler<Error>,
    ) {
        match class {
            TokenClass::Identifier => match text {
                "true" | "false" => self.emit(TokenKind::BoolLiteral, text),
                _ => self.emit(keyword_kind(text).unwrap_or(TokenKind::Identifier), text),
            },

            TokenClass::Keyword => {
                self.emit(keyword_kind(text).unwrap_or(TokenKind::Identifier), text);
            }

            TokenClass::Literal => match text {
                "true" | "false" => self.emit(TokenKind::BoolLiteral, text),

                digits if is_oversized_decimal(digits) => {
                    let location = Location::new(self.row, self.col);
                    self.emit(TokenKind::Error, digits);

                    handler.receive(Error::OversizedIntegerLiteral(OversizedIntegerLiteral {
                        source: source.clone(),
                        location,
                        digits: digits.to_string(),
                    }));
                }

                _ => self.emit(TokenKind::IntLiteral, text),
            },

            TokenClass::Operator => {
                self.emit(
                    OPERATORS.get(text).copied().unwrap_or(TokenKind::Operator),
                    text,
                );
            }

            TokenClass::Constant => self.emit(TokenKind::Constant, text),

            TokenClass::Punctuator => {
                self.emit(
                    PUNCTUATORS
                        .get(text)
                        .copied()
                        .unwrap_or(TokenKind::Punctuator),
                    text,
                );
            }

            TokenClass::Special => {
                self.emit(SPECIALS.get(text).copied().unwrap_or(TokenKind::Special), text);
            }

            TokenClass::Unknown => self.emit(TokenKind::Unknown, text),
        }
    }

    /// Consumes one character no pattern claims: printable ASCII becomes an
    /// `UNKNOWN` token, control and non-ASCII characters become `ERROR`
    /// tokens.
    fn scan_unrecognized(
        &mut self,
        content: &str,
        position: usize,
        source: &Arc<SourceText>,
        handler: &impl Handler<Error>,
    ) -> usize {
        let character = content[position..].chars().next().unwrap();
        let location = Location::new(self.row, self.col);
        let text = character.to_string();

        if character.is_ascii_graphic() || character == ' ' {
            self.emit(TokenKind::Unknown, &text);
            handler.receive(Error::UnrecognizedCharacter(UnrecognizedCharacter {
                source: source.clone(),
                location,
                character,
            }));
        } else {
            self.emit(TokenKind::Error, &text);
            handler.receive(Error::ForbiddenCharacter(ForbiddenCharacter {
                source: source.clone(),
                location,
                character,
            }));
        }

        position + character.len_utf8()
    }
}

fn is_word_byte(byte: u8) -> bool { byte.is_ascii_alphanumeric() || byte == b'_' }

#[cfg(test)]
pub(crate) mod tests;
