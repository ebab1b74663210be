//! Contains the token representation produced by the lexical analysis.

use std::{collections::HashMap, fmt::Display};

use derive_new::new;
use getset::{CopyGetters, Getters};
use lazy_static::lazy_static;
use strum_macros::EnumIter;

use crate::pattern::TokenClass;

/// Is a closed enumeration of every kind of token the lexer can emit.
///
/// Every lexical role has a named variant; the `Operator`, `Punctuator`, and
/// `Special` variants are the named fallbacks of their class, emitted when a
/// match belongs to the class but no dedicated variant claims its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
#[allow(missing_docs)]
pub enum TokenKind {
    // names
    Identifier,
    Constant,
    Underscore,

    // keywords
    If,
    Else,
    While,
    Do,
    For,
    Match,
    Enum,
    Struct,
    Const,
    VoidType,
    IntType,
    BoolType,
    Function,
    Mut,
    Return,
    Default,
    Break,
    Continue,
    Sizeof,
    Asm,

    // literals
    IntLiteral,
    BoolLiteral,
    StringLiteral,
    CharLiteral,

    // operators
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Assign,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    LogicalAnd,
    LogicalOr,
    Not,
    Caret,
    Ampersand,
    LeftShift,
    RightShift,
    DeclareAssign,
    /// The named fallback for operator-class matches without a dedicated
    /// variant.
    Operator,

    // punctuators
    OpeningBrace,
    ClosingBrace,
    OpeningParen,
    ClosingParen,
    OpeningBracket,
    ClosingBracket,
    Comma,
    Semicolon,
    Dot,
    Colon,
    Question,
    /// The named fallback for punctuator-class matches without a dedicated
    /// variant.
    Punctuator,

    // specials
    At,
    Hash,
    Dollar,
    Tilde,
    Backtick,
    /// The named fallback for special-class matches without a dedicated
    /// variant.
    Special,

    // comments
    SingleLineComment,
    MultiLineComment,

    // fallbacks
    Unknown,
    Error,
}

impl TokenKind {
    /// Gets the canonical screaming-case name of this kind, used in token
    /// dumps and test fixtures.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identifier => "IDENTIFIER",
            Self::Constant => "CONSTANT",
            Self::Underscore => "UNDERSCORE",
            Self::If => "IF",
            Self::Else => "ELSE",
            Self::While => "WHILE",
            Self::Do => "DO",
            Self::For => "FOR",
            Self::Match => "MATCH",
            Self::Enum => "ENUM",
            Self::Struct => "STRUCT",
            Self::Const => "CONST",
            Self::VoidType => "VOID_TYPE",
            Self::IntType => "INT_TYPE",
            Self::BoolType => "BOOL_TYPE",
            Self::Function => "FUNCTION",
            Self::Mut => "MUT",
            Self::Return => "RETURN",
            Self::Default => "DEFAULT",
            Self::Break => "BREAK",
            Self::Continue => "CONTINUE",
            Self::Sizeof => "SIZEOF",
            Self::Asm => "ASM",
            Self::IntLiteral => "INT_LITERAL",
            Self::BoolLiteral => "BOOL_LITERAL",
            Self::StringLiteral => "STRING_LITERAL",
            Self::CharLiteral => "CHAR_LITERAL",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Multiply => "MULTIPLY",
            Self::Divide => "DIVIDE",
            Self::Modulo => "MODULO",
            Self::Assign => "ASSIGN",
            Self::Equal => "EQUAL",
            Self::NotEqual => "NOT_EQUAL",
            Self::LessThan => "LESS_THAN",
            Self::GreaterThan => "GREATER_THAN",
            Self::LessEqual => "LESS_EQUAL",
            Self::GreaterEqual => "GREATER_EQUAL",
            Self::LogicalAnd => "LOGICAL_AND",
            Self::LogicalOr => "LOGICAL_OR",
            Self::Not => "NOT",
            Self::Caret => "CARET",
            Self::Ampersand => "AMPERSAND",
            Self::LeftShift => "LEFT_SHIFT",
            Self::RightShift => "RIGHT_SHIFT",
            Self::DeclareAssign => "DECLARE_ASSIGN",
            Self::Operator => "OPERATOR",
            Self::OpeningBrace => "OPENING_BRACE",
            Self::ClosingBrace => "CLOSING_BRACE",
            Self::OpeningParen => "OPENING_PAREN",
            Self::ClosingParen => "CLOSING_PAREN",
            Self::OpeningBracket => "OPENING_BRACKET",
            Self::ClosingBracket => "CLOSING_BRACKET",
            Self::Comma => "COMMA",
            Self::Semicolon => "SEMICOLON",
            Self::Dot => "DOT",
            Self::Colon => "COLON",
            Self::Question => "QUESTION",
            Self::Punctuator => "PUNCTUATOR",
            Self::At => "AT",
            Self::Hash => "HASH",
            Self::Dollar => "DOLLAR",
            Self::Tilde => "TILDE",
            Self::Backtick => "BACKTICK",
            Self::Special => "SPECIAL",
            Self::SingleLineComment => "SINGLE_LINE_COMMENT",
            Self::MultiLineComment => "MULTI_LINE_COMMENT",
            Self::Unknown => "UNKNOWN",
            Self::Error => "ERROR",
        }
    }

    /// Checks whether this kind is a reserved word of the language.
    #[must_use]
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            Self::If
                | Self::Else
                | Self::While
                | Self::Do
                | Self::For
                | Self::Match
                | Self::Enum
                | Self::Struct
                | Self::Const
                | Self::VoidType
                | Self::IntType
                | Self::BoolType
                | Self::Function
                | Self::Mut
                | Self::Return
                | Self::Default
                | Self::Break
                | Self::Continue
                | Self::Sizeof
                | Self::Asm
        )
    }

    /// Gets the coarse classification this kind belongs to.
    #[must_use]
    pub fn class(self) -> TokenClass {
        match self {
            Self::Identifier | Self::Underscore => TokenClass::Identifier,
            Self::Constant => TokenClass::Constant,

            kind if kind.is_keyword() => TokenClass::Keyword,

            Self::IntLiteral | Self::BoolLiteral | Self::StringLiteral | Self::CharLiteral => {
                TokenClass::Literal
            }

            Self::Plus
            | Self::Minus
            | Self::Multiply
            | Self::Divide
            | Self::Modulo
            | Self::Assign
            | Self::Equal
            | Self::NotEqual
            | Self::LessThan
            | Self::GreaterThan
            | Self::LessEqual
            | Self::GreaterEqual
            | Self::LogicalAnd
            | Self::LogicalOr
            | Self::Not
            | Self::Caret
            | Self::Ampersand
            | Self::LeftShift
            | Self::RightShift
            | Self::DeclareAssign
            | Self::Operator => TokenClass::Operator,

            Self::OpeningBrace
            | Self::ClosingBrace
            | Self::OpeningParen
            | Self::ClosingParen
            | Self::OpeningBracket
            | Self::ClosingBracket
            | Self::Comma
            | Self::Semicolon
            | Self::Dot
            | Self::Colon
            | Self::Question
            | Self::Punctuator => TokenClass::Punctuator,

            Self::At | Self::Hash | Self::Dollar | Self::Tilde | Self::Backtick | Self::Special => {
                TokenClass::Special
            }

            _ => TokenClass::Unknown,
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

lazy_static! {
    /// The reserved words of the language, mapped to their dedicated kinds.
    pub static ref KEYWORDS: HashMap<&'static str, TokenKind> = HashMap::from([
        ("if", TokenKind::If),
        ("else", TokenKind::Else),
        ("while", TokenKind::While),
        ("do", TokenKind::Do),
        ("for", TokenKind::For),
        ("match", TokenKind::Match),
        ("enum", TokenKind::Enum),
        ("struct", TokenKind::Struct),
        ("const", TokenKind::Const),
        ("void", TokenKind::VoidType),
        ("int", TokenKind::IntType),
        ("bool", TokenKind::BoolType),
        ("function", TokenKind::Function),
        ("mut", TokenKind::Mut),
        ("return", TokenKind::Return),
        ("default", TokenKind::Default),
        ("break", TokenKind::Break),
        ("continue", TokenKind::Continue),
        ("sizeof", TokenKind::Sizeof),
        ("asm", TokenKind::Asm),
    ]);

    /// The operator texts with dedicated kinds.
    pub static ref OPERATORS: HashMap<&'static str, TokenKind> = HashMap::from([
        ("+", TokenKind::Plus),
        ("-", TokenKind::Minus),
        ("*", TokenKind::Multiply),
        ("/", TokenKind::Divide),
        ("%", TokenKind::Modulo),
        ("=", TokenKind::Assign),
        ("==", TokenKind::Equal),
        ("!=", TokenKind::NotEqual),
        ("<", TokenKind::LessThan),
        (">", TokenKind::GreaterThan),
        ("<=", TokenKind::LessEqual),
        (">=", TokenKind::GreaterEqual),
        ("&&", TokenKind::LogicalAnd),
        ("||", TokenKind::LogicalOr),
        ("!", TokenKind::Not),
        ("^", TokenKind::Caret),
        ("&", TokenKind::Ampersand),
        ("<<", TokenKind::LeftShift),
        (">>", TokenKind::RightShift),
        (":=", TokenKind::DeclareAssign),
    ]);

    /// The punctuator texts with dedicated kinds.
    pub static ref PUNCTUATORS: HashMap<&'static str, TokenKind> = HashMap::from([
        ("{", TokenKind::OpeningBrace),
        ("}", TokenKind::ClosingBrace),
        ("(", TokenKind::OpeningParen),
        (")", TokenKind::ClosingParen),
        ("[", TokenKind::OpeningBracket),
        ("]", TokenKind::ClosingBracket),
        (",", TokenKind::Comma),
        (";", TokenKind::Semicolon),
        (".", TokenKind::Dot),
        (":", TokenKind::Colon),
        ("?", TokenKind::Question),
    ]);

    /// The special-character texts with dedicated kinds.
    pub static ref SPECIALS: HashMap<&'static str, TokenKind> = HashMap::from([
        ("@", TokenKind::At),
        ("#", TokenKind::Hash),
        ("$", TokenKind::Dollar),
        ("~", TokenKind::Tilde),
        ("`", TokenKind::Backtick),
    ]);
}

/// Looks up the keyword kind for the given text, if it is a reserved word.
#[must_use]
pub fn keyword_kind(text: &str) -> Option<TokenKind> { KEYWORDS.get(text).copied() }

/// The number of decimal digits beyond which an integer literal cannot fit
/// the widest machine integer.
pub const MAX_DECIMAL_DIGITS: usize = 19;

/// Checks whether the text is a well-formed numeric literal: decimal,
/// `0x`-prefixed hexadecimal, or `0b`-prefixed binary.
#[must_use]
pub fn is_numeric(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    let bytes = text.as_bytes();

    if bytes.len() > 2 && bytes[0] == b'0' && (bytes[1] == b'x' || bytes[1] == b'X') {
        return bytes[2..].iter().all(u8::is_ascii_hexdigit);
    }

    if bytes.len() > 2 && bytes[0] == b'0' && (bytes[1] == b'b' || bytes[1] == b'B') {
        return bytes[2..].iter().all(|x| *x == b'0' || *x == b'1');
    }

    bytes.iter().all(u8::is_ascii_digit)
}

/// Checks whether the text is a decimal run too long to fit the widest
/// machine integer.
#[must_use]
pub fn is_oversized_decimal(text: &str) -> bool {
    text.len() > MAX_DECIMAL_DIGITS && text.bytes().all(|x| x.is_ascii_digit())
}

/// Is one token of the output stream: its kind, its exact source text, and
/// the 1-based position where it starts.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters, new)]
pub struct Token {
    /// Gets the kind of the token.
    #[get_copy = "pub"]
    kind: TokenKind,

    /// Gets the exact source text of the token.
    #[get = "pub"]
    text: String,

    /// Gets the 1-based line the token starts on.
    #[get_copy = "pub"]
    row: usize,

    /// Gets the 1-based column the token starts at.
    #[get_copy = "pub"]
    col: usize,
}

#[cfg(test)]
pub(crate) mod tests;
