use strum::IntoEnumIterator;

use super::{
    is_numeric, is_oversized_decimal, keyword_kind, Token, TokenKind, KEYWORDS,
    MAX_DECIMAL_DIGITS,
};
use crate::pattern::TokenClass;

#[test]
fn names_are_unique() {
    let mut names = TokenKind::iter().map(TokenKind::as_str).collect::<Vec<_>>();
    let total = names.len();

    names.sort_unstable();
    names.dedup();

    assert_eq!(names.len(), total);
}

#[test]
fn keyword_lookup() {
    assert_eq!(keyword_kind("while"), Some(TokenKind::While));
    assert_eq!(keyword_kind("void"), Some(TokenKind::VoidType));
    assert_eq!(keyword_kind("int"), Some(TokenKind::IntType));
    assert_eq!(keyword_kind("bool"), Some(TokenKind::BoolType));
    assert_eq!(keyword_kind("iffy"), None);
    assert_eq!(keyword_kind("IF"), None);
}

#[test]
fn every_keyword_kind_knows_it_is_one() {
    for kind in KEYWORDS.values() {
        assert!(kind.is_keyword(), "{kind} not marked as keyword");
        assert_eq!(kind.class(), TokenClass::Keyword);
    }

    assert!(!TokenKind::Identifier.is_keyword());
    assert!(!TokenKind::BoolLiteral.is_keyword());
}

#[test]
fn kinds_classify_into_their_classes() {
    assert_eq!(TokenKind::Identifier.class(), TokenClass::Identifier);
    assert_eq!(TokenKind::Plus.class(), TokenClass::Operator);
    assert_eq!(TokenKind::Constant.class(), TokenClass::Constant);
    assert_eq!(TokenKind::IntLiteral.class(), TokenClass::Literal);
    assert_eq!(TokenKind::Semicolon.class(), TokenClass::Punctuator);
    assert_eq!(TokenKind::Hash.class(), TokenClass::Special);
    assert_eq!(TokenKind::Error.class(), TokenClass::Unknown);
}

#[test]
fn numeric_forms() {
    assert!(is_numeric("0"));
    assert!(is_numeric("1234567890"));
    assert!(is_numeric("0xDEADbeef"));
    assert!(is_numeric("0b1010"));

    assert!(!is_numeric(""));
    assert!(!is_numeric("12a"));
    assert!(!is_numeric("0x"));
    assert!(!is_numeric("0xG1"));
    assert!(!is_numeric("0b102"));
}

#[test]
fn oversized_decimal_detection() {
    let fits = "9".repeat(MAX_DECIMAL_DIGITS);
    let overflows = "9".repeat(MAX_DECIMAL_DIGITS + 1);

    assert!(!is_oversized_decimal(&fits));
    assert!(is_oversized_decimal(&overflows));

    // only plain decimal runs are subject to the digit ceiling
    assert!(!is_oversized_decimal(&format!("0x{overflows}")));
}

#[test]
fn token_position_is_one_based() {
    let token = Token::new(TokenKind::Identifier, "x".to_string(), 1, 1);

    assert_eq!(token.kind(), TokenKind::Identifier);
    assert_eq!(token.text(), "x");
    assert_eq!(token.row(), 1);
    assert_eq!(token.col(), 1);
}
