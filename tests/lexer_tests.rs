// Black-box tests for the Conso lexer

use conso::lexer::{tokenize, LexErrorKind, Lexer, SourceLocation, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).tokens.iter().map(|t| t.kind).collect()
}

#[test]
fn test_declaration_token_sequence() {
    let out = tokenize("nt x = 5 ;");
    assert!(out.is_clean(), "{:?}", out.errors);

    let tokens: Vec<(TokenKind, &str)> =
        out.tokens.iter().map(|t| (t.kind, t.lexeme.as_str())).collect();
    assert_eq!(
        tokens,
        vec![
            (TokenKind::Int, "nt"),
            (TokenKind::Identifier, "x"),
            (TokenKind::Assign, "="),
            (TokenKind::IntLit, "5"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Eof, "EOF"),
        ]
    );
}

#[test]
fn test_negative_literal_is_one_token() {
    let out = tokenize("~7");
    assert!(out.is_clean());
    assert_eq!(out.tokens.len(), 2);
    assert_eq!(out.tokens[0].kind, TokenKind::NegIntLit);
    assert_eq!(out.tokens[0].lexeme, "-7");
}

#[test]
fn test_long_identifier_is_dropped() {
    let name = "abcdefghijklmnopq";
    assert_eq!(name.len(), 17);

    let out = tokenize(&format!("nt {name};"));
    assert_eq!(out.errors.len(), 1);
    assert_eq!(
        out.errors[0].kind,
        LexErrorKind::IdentifierTooLong {
            name: name.to_string(),
            limit: 16
        }
    );
    assert!(out.tokens.iter().all(|t| t.lexeme != name));
    assert_eq!(
        kinds(&format!("nt {name};")),
        vec![TokenKind::Int, TokenKind::Semicolon, TokenKind::Eof]
    );
}

#[test]
fn test_sixteen_letters_is_fine() {
    let out = tokenize("nt abcdefghijklmnop;");
    assert!(out.is_clean(), "{:?}", out.errors);
    assert_eq!(out.tokens[1].lexeme, "abcdefghijklmnop");
}

#[test]
fn test_identifier_limit_is_configurable() {
    let out = Lexer::new("nt abcdefghijklmnopq;")
        .with_max_identifier_len(25)
        .tokenize();
    assert!(out.is_clean());
    assert_eq!(out.tokens[1].kind, TokenKind::Identifier);
}

#[test]
fn test_always_ends_with_eof() {
    let inputs = [
        "",
        "   ",
        "# only a comment",
        "\"never closed",
        "'",
        "@@@ $$$",
        "~",
        "1.2.3.4",
        "nt(x",
        "mn() { end; }",
        "_____",
        "''''''",
    ];
    for input in inputs {
        let out = tokenize(input);
        let last = out.tokens.last().map(|t| t.kind);
        assert_eq!(last, Some(TokenKind::Eof), "input {input:?}");
        assert_eq!(
            out.tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(),
            1,
            "input {input:?}"
        );
    }
}

#[test]
fn test_keywords_are_case_sensitive() {
    assert_eq!(
        kinds("nt Nt NT"),
        vec![
            TokenKind::Int,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_boolean_literals_share_a_kind() {
    let out = tokenize("tr fls");
    assert_eq!(out.tokens[0].kind, TokenKind::BoolLit);
    assert_eq!(out.tokens[1].kind, TokenKind::BoolLit);
    assert_eq!(out.tokens[0].lexeme, "tr");
    assert_eq!(out.tokens[1].lexeme, "fls");
}

#[test]
fn test_control_keywords_need_their_follow_character() {
    let out = tokenize("f (tr) { } ls { }");
    assert!(out.is_clean(), "{:?}", out.errors);

    let out = tokenize("brk ;");
    assert!(out.is_clean());

    let out = tokenize("brk)");
    assert_eq!(
        out.errors[0].kind,
        LexErrorKind::InvalidDelimiter {
            found: ')',
            after: "brk".to_string()
        }
    );
    assert_eq!(out.errors[0].location, SourceLocation::new(1, 4));
}

#[test]
fn test_lexer_keeps_going_after_errors() {
    let out = tokenize("nt a = 1 @ 2;\nnt _b;\nnt c = 3;");
    assert_eq!(out.errors.len(), 2);
    assert_eq!(out.errors[0].location.line, 1);
    assert_eq!(out.errors[1].location, SourceLocation::new(2, 4));

    let identifiers: Vec<&str> = out
        .tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Identifier)
        .map(|t| t.lexeme.as_str())
        .collect();
    assert_eq!(identifiers, vec!["a", "c"]);
}

#[test]
fn test_concat_and_comparison_operators() {
    assert_eq!(
        kinds("\"a\" ` \"b\" <= c"),
        vec![
            TokenKind::StringLit,
            TokenKind::Concat,
            TokenKind::StringLit,
            TokenKind::LtEq,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_error_messages() {
    let out = tokenize("nt 1abc;");
    assert_eq!(
        out.errors[0].to_string(),
        "Lexical Error at line 1, column 4: Invalid identifier starting with a number: '1abc'"
    );

    let out = tokenize("dbl x = 3.;");
    assert_eq!(
        out.errors[0].to_string(),
        "Lexical Error at line 1, column 9: Missing digits after decimal point"
    );
}
