use proptest::{
    prelude::*,
    proptest,
    test_runner::TestCaseResult,
};

use cinder_base::diagnostic::{Counter, Dummy, Storage};
use cinder_test::input::Input;

use super::Lexer;
use crate::{
    error::Error,
    pattern::{PatternDefinition, TokenClass},
    token::{Token, TokenKind},
};

fn lex(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(&Dummy);
    lexer.set_content("test_input", source);
    lexer.lexical_analysis(&Dummy);
    lexer.take_token_stream()
}

fn kinds(tokens: &[Token]) -> Vec<TokenKind> { tokens.iter().map(Token::kind).collect() }

fn texts(tokens: &[Token]) -> Vec<&str> { tokens.iter().map(|x| x.text().as_str()).collect() }

#[test]
fn assignment_statement() {
    let tokens = lex("x = 42;");

    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::IntLiteral,
            TokenKind::Semicolon
        ]
    );
    assert_eq!(texts(&tokens), vec!["x", "=", "42", ";"]);

    let positions = tokens
        .iter()
        .map(|x| (x.row(), x.col()))
        .collect::<Vec<_>>();
    assert_eq!(positions, vec![(1, 1), (1, 3), (1, 5), (1, 7)]);
}

#[test]
fn keyword_prefix_stays_an_identifier() {
    let tokens = lex("iffy");
    assert_eq!(kinds(&tokens), vec![TokenKind::Identifier]);
    assert_eq!(tokens[0].text(), "iffy");

    let tokens = lex("if");
    assert_eq!(kinds(&tokens), vec![TokenKind::If]);
}

#[test]
fn keywords_are_promoted() {
    let tokens = lex("while (x) { return; }");

    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::While,
            TokenKind::OpeningParen,
            TokenKind::Identifier,
            TokenKind::ClosingParen,
            TokenKind::OpeningBrace,
            TokenKind::Return,
            TokenKind::Semicolon,
            TokenKind::ClosingBrace
        ]
    );
}

#[test]
fn comment_swallows_the_rest_of_the_line() {
    let tokens = lex("# note\nx");

    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::SingleLineComment, TokenKind::Identifier]
    );
    assert_eq!(tokens[0].text(), "# note");
    assert_eq!((tokens[1].row(), tokens[1].col()), (2, 1));
}

#[test]
fn doubled_hash_is_two_tokens() {
    let tokens = lex("##");

    assert_eq!(kinds(&tokens), vec![TokenKind::Hash, TokenKind::Hash]);
}

#[test]
fn hash_flush_against_text_is_not_a_comment() {
    let tokens = lex("a#b");

    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::Identifier, TokenKind::Hash, TokenKind::Identifier]
    );
}

#[test]
fn consecutive_commas_split_into_comma_and_error() {
    let storage: Storage<Error> = Storage::new();
    let mut lexer = Lexer::new(&Dummy);
    lexer.set_content("test_input", "a,,b");
    lexer.lexical_analysis(&storage);

    let tokens = lexer.take_token_stream();
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Identifier,
            TokenKind::Comma,
            TokenKind::Error,
            TokenKind::Identifier
        ]
    );
    assert_eq!(tokens[2].text(), ",");

    let diagnostics = storage.into_vec();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].as_consecutive_commas().is_some());
}

#[test]
fn oversized_integer_literal_is_an_error_token() {
    let storage: Storage<Error> = Storage::new();
    let mut lexer = Lexer::new(&Dummy);
    lexer.set_content("test_input", &"9".repeat(20));
    lexer.lexical_analysis(&storage);

    let tokens = lexer.take_token_stream();
    assert_eq!(kinds(&tokens), vec![TokenKind::Error]);

    let diagnostics = storage.into_vec();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].as_oversized_integer_literal().is_some());
}

#[test]
fn boolean_literals() {
    let tokens = lex("true false");

    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::BoolLiteral, TokenKind::BoolLiteral]
    );
}

#[test]
fn shift_assignment_splits() {
    let tokens = lex("x >>= 1");

    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Identifier,
            TokenKind::RightShift,
            TokenKind::Assign,
            TokenKind::IntLiteral
        ]
    );
}

#[test]
fn reference_to_mutable_splits() {
    let tokens = lex("&mut x");

    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::Ampersand, TokenKind::Mut, TokenKind::Identifier]
    );
}

#[test]
fn slash_runs_split_into_pairs() {
    let tokens = lex("///");
    assert_eq!(kinds(&tokens), vec![TokenKind::Operator, TokenKind::Divide]);
    assert_eq!(texts(&tokens), vec!["//", "/"]);

    let tokens = lex("////");
    assert_eq!(kinds(&tokens), vec![TokenKind::Operator, TokenKind::Operator]);

    // a lone pair is two divisions, not an operator pair
    let tokens = lex("a//b");
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Identifier,
            TokenKind::Divide,
            TokenKind::Divide,
            TokenKind::Identifier
        ]
    );
}

#[test]
fn declare_assign_operator() {
    let tokens = lex("x := 5");

    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Identifier,
            TokenKind::DeclareAssign,
            TokenKind::IntLiteral
        ]
    );
}

#[test]
fn increment_splits_into_two_operators() {
    let tokens = lex("++x");
    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::Plus, TokenKind::Plus, TokenKind::Identifier]
    );

    let tokens = lex("x++");
    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::Identifier, TokenKind::Plus, TokenKind::Plus]
    );
}

#[test]
fn string_and_character_literals() {
    let tokens = lex(r#""hi \" there" 'a'"#);

    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::StringLiteral, TokenKind::CharLiteral]
    );
    assert_eq!(tokens[0].text(), r#""hi \" there""#);
    assert_eq!(tokens[1].text(), "'a'");
}

#[test]
fn unterminated_block_comment_runs_to_the_end() {
    let tokens = lex("/* abc");

    assert_eq!(kinds(&tokens), vec![TokenKind::MultiLineComment]);
    assert_eq!(tokens[0].text(), "/* abc");
}

#[test]
fn block_comment_is_one_token() {
    let tokens = lex("a /* b\nc */ d");

    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Identifier,
            TokenKind::MultiLineComment,
            TokenKind::Identifier
        ]
    );
}

#[test]
fn hex_and_binary_literals_stay_whole() {
    let tokens = lex("0x1F 0b10");

    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::IntLiteral, TokenKind::IntLiteral]
    );
    assert_eq!(texts(&tokens), vec!["0x1F", "0b10"]);
}

#[test]
fn digits_flush_against_a_word_split() {
    let tokens = lex("123abc");

    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::IntLiteral, TokenKind::Identifier]
    );
    assert_eq!(texts(&tokens), vec!["123", "abc"]);
}

#[test]
fn standalone_underscore() {
    let tokens = lex("_ _x");

    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::Underscore, TokenKind::Identifier]
    );
    assert_eq!(tokens[1].text(), "_x");
}

#[test]
fn identifier_wins_class_ties() {
    // the identifier pattern matches everything the constant pattern does,
    // and equal lengths resolve to the earlier table row
    let tokens = lex("RED");

    assert_eq!(kinds(&tokens), vec![TokenKind::Identifier]);
}

#[test]
fn asm_scanning_is_scoped_to_asm_blocks() {
    let tokens = lex("asm { movq %rax, -8(%rbp) }");

    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Asm,
            TokenKind::OpeningBrace,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Comma,
            TokenKind::Identifier,
            TokenKind::OpeningParen,
            TokenKind::Identifier,
            TokenKind::ClosingParen,
            TokenKind::ClosingBrace
        ]
    );
    assert_eq!(tokens[3].text(), "%rax");
    assert_eq!(tokens[5].text(), "-8");
    assert_eq!(tokens[7].text(), "%rbp");
}

#[test]
fn percent_outside_asm_is_modulo() {
    let tokens = lex("a % rax");

    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::Identifier, TokenKind::Modulo, TokenKind::Identifier]
    );
}

#[test]
fn plain_brace_does_not_enter_asm_mode() {
    // the displacement heuristic must not fire in ordinary blocks
    let tokens = lex("{ 8(x) }");

    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::OpeningBrace,
            TokenKind::IntLiteral,
            TokenKind::OpeningParen,
            TokenKind::Identifier,
            TokenKind::ClosingParen,
            TokenKind::ClosingBrace
        ]
    );
}

#[test]
fn asm_immediate_value() {
    let tokens = lex("asm { $42 }");

    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Asm,
            TokenKind::OpeningBrace,
            TokenKind::Identifier,
            TokenKind::ClosingBrace
        ]
    );
    assert_eq!(tokens[2].text(), "$42");
}

#[test]
fn dollar_outside_asm_is_special() {
    let tokens = lex("$42");

    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::Dollar, TokenKind::IntLiteral]
    );
}

#[test]
fn unrecognized_printable_becomes_unknown() {
    let storage: Storage<Error> = Storage::new();
    let mut lexer = Lexer::new(&Dummy);
    lexer.set_content("test_input", "a \\ b");
    lexer.lexical_analysis(&storage);

    let tokens = lexer.take_token_stream();
    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::Identifier, TokenKind::Unknown, TokenKind::Identifier]
    );

    let diagnostics = storage.into_vec();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].as_unrecognized_character().is_some());
}

#[test]
fn forbidden_character_becomes_error() {
    let storage: Storage<Error> = Storage::new();
    let mut lexer = Lexer::new(&Dummy);
    lexer.set_content("test_input", "a\u{7}é");
    lexer.lexical_analysis(&storage);

    let tokens = lexer.take_token_stream();
    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::Identifier, TokenKind::Error, TokenKind::Error]
    );

    let diagnostics = storage.into_vec();
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics
        .iter()
        .all(|x| x.as_forbidden_character().is_some()));
}

#[test]
fn reset_clears_per_session_state() {
    let mut lexer = Lexer::new(&Dummy);
    lexer.set_content("test_input", "x = 1;");
    lexer.lexical_analysis(&Dummy);
    assert!(!lexer.token_stream().is_empty());

    lexer.reset();
    assert!(lexer.token_stream().is_empty());
    assert!(lexer.sources().is_empty());

    // the compiled table survives a reset
    lexer.set_content("test_input", "y");
    lexer.lexical_analysis(&Dummy);
    assert_eq!(kinds(&lexer.take_token_stream()), vec![TokenKind::Identifier]);
}

#[test]
fn sources_are_scanned_in_registration_order() {
    let mut lexer = Lexer::new(&Dummy);
    lexer.set_content("a", "1");
    lexer.set_content("b", "2");
    lexer.lexical_analysis(&Dummy);

    assert_eq!(texts(&lexer.take_token_stream()), vec!["1", "2"]);
}

#[test]
fn degraded_table_still_produces_a_lexer() {
    let table = vec![PatternDefinition::new(
        "broken".to_string(),
        "|".to_string(),
        TokenClass::Unknown,
    )];

    let counter = Counter::default();
    let mut lexer = Lexer::with_table(table, &counter);
    assert_eq!(counter.count(), 1);

    lexer.set_content("test_input", "abc");
    lexer.lexical_analysis(&Dummy);
    assert!(!lexer.take_token_stream().is_empty());
}

/// One generated lexeme together with the token it must lex to.
#[derive(Debug, Clone)]
struct ExpectedToken {
    kind: TokenKind,
    text: String,
}

impl Input<&Token> for &ExpectedToken {
    fn assert(self, output: &Token) -> TestCaseResult {
        prop_assert_eq!(self.kind, output.kind());
        prop_assert_eq!(&self.text, output.text());
        Ok(())
    }
}

fn expected_token() -> impl Strategy<Value = ExpectedToken> {
    prop_oneof![
        "[a-z][a-z0-9]{0,5}"
            .prop_filter("reserved words lex differently", |x| {
                crate::token::keyword_kind(x).is_none() && x != "true" && x != "false"
            })
            .prop_map(|text| ExpectedToken {
                kind: TokenKind::Identifier,
                text,
            }),
        "[1-9][0-9]{0,8}".prop_map(|text| ExpectedToken {
            kind: TokenKind::IntLiteral,
            text,
        }),
        Just(ExpectedToken {
            kind: TokenKind::Semicolon,
            text: ";".to_string(),
        }),
        Just(ExpectedToken {
            kind: TokenKind::OpeningParen,
            text: "(".to_string(),
        }),
        Just(ExpectedToken {
            kind: TokenKind::ClosingParen,
            text: ")".to_string(),
        }),
    ]
}

proptest! {
    #[test]
    fn spaced_lexemes_lex_to_their_tokens(
        expected in proptest::collection::vec(expected_token(), 0..12)
    ) {
        let source = expected
            .iter()
            .map(|x| x.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let tokens = lex(&source);
        (&expected).assert(&tokens)?;
    }

    #[test]
    fn plain_identifiers_round_trip(
        text in "[a-zA-Z][a-zA-Z0-9_]{0,10}"
            .prop_filter("reserved words lex differently", |x| {
                crate::token::keyword_kind(x).is_none() && x != "true" && x != "false"
            })
    ) {
        let tokens = lex(&text);

        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind(), TokenKind::Identifier);
        prop_assert_eq!(tokens[0].text(), &text);
    }

    #[test]
    fn lexing_is_deterministic(source in "[a-z0-9 =;(){}+,.-]{0,40}") {
        prop_assert_eq!(lex(&source), lex(&source));
    }

    #[test]
    fn token_texts_reconstruct_the_input(
        lexemes in proptest::collection::vec(
            prop_oneof![
                "[a-z][a-z0-9]{0,5}".prop_filter("reserved", |x| {
                    crate::token::keyword_kind(x).is_none() && x != "true" && x != "false"
                }),
                "[1-9][0-9]{0,8}",
                Just(";".to_string()),
                Just("(".to_string()),
                Just(")".to_string()),
            ],
            0..10,
        )
    ) {
        let source = lexemes.join(" ");
        let tokens = lex(&source);

        let reconstructed = tokens
            .iter()
            .map(|x| x.text().as_str())
            .collect::<String>();
        prop_assert_eq!(reconstructed, lexemes.concat());
    }
}
