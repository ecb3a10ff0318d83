// Black-box tests for the LL(1) parser

use conso::lexer::tokenize;
use conso::parser::{parse, ParseError, ParseOutcome, ACCEPTED_MESSAGE};

fn parse_source(source: &str) -> ParseOutcome {
    let out = tokenize(source);
    assert!(out.is_clean(), "lexical errors: {:?}", out.errors);
    parse(&out.tokens)
}

fn assert_accepted(source: &str) {
    let outcome = parse_source(source);
    assert!(outcome.accepted, "{source}\n{:?}", outcome.messages);
    assert_eq!(outcome.messages, vec![ACCEPTED_MESSAGE.to_string()]);
    assert!(outcome.error.is_none());
}

fn assert_rejected(source: &str) -> ParseError {
    let outcome = parse_source(source);
    assert!(!outcome.accepted, "expected a syntax error for {source}");
    assert_eq!(outcome.messages.len(), 1);
    outcome.error.expect("rejected parse carries an error")
}

#[test]
fn test_complete_program_accepted() {
    assert_accepted(
        r#"
        nt count = 0;
        cnst dbl RATE = 1.50;

        strct Point {
            nt x;
            nt y;
        };

        fnctn nt twice(nt n) {
            rtrn n * 2;
        }

        mn() {
            dfstrct Point origin;
            strng greeting = "hi" ` "there";
            origin.x = twice(count);
            prnt(greeting, origin.x);
            end;
        }
    "#,
    );
}

#[test]
fn test_missing_closing_brace() {
    let err = assert_rejected("mn() {\n    end;\n");
    match err {
        ParseError::UnexpectedEnd { expected, .. } => assert_eq!(expected, "}"),
        other => panic!("expected end-of-input error, got {other:?}"),
    }
}

#[test]
fn test_missing_end_statement() {
    let err = assert_rejected("mn() { nt x = 1; }");
    assert!(err.to_string().contains("Unexpected token '}'"), "{err}");
}

#[test]
fn test_conditionals() {
    assert_accepted(
        r#"
        mn() {
            nt a = 1;
            f (a > 0) {
                a = 2;
            } lsf (a < 0) {
                a = 3;
            } ls {
                a = 4;
            }
            end;
        }
    "#,
    );
}

#[test]
fn test_loops() {
    assert_accepted(
        r#"
        mn() {
            nt i;
            fr (i = 0; i < 10; i += 2) {
                prnt(i);
            }
            whl (i > 0) {
                i--;
            }
            d {
                ++i;
            } whl (i < 3);
            end;
        }
    "#,
    );
}

#[test]
fn test_switch() {
    assert_accepted(
        r#"
        mn() {
            chr c = 'a';
            swtch (c) {
                cs 'a':
                    prnt("first");
                    brk;
                cs 'b':
                    brk;
                dflt:
                    brk;
            }
            end;
        }
    "#,
    );
}

#[test]
fn test_switch_selector_must_be_identifier() {
    let err = assert_rejected("mn() { swtch (1) { dflt: brk; } end; }");
    assert!(matches!(
        err,
        ParseError::UnexpectedSymbol { ref found, ref expected, .. }
            if found == "ntlit" && expected == "id"
    ));
}

#[test]
fn test_arrays_and_input() {
    assert_accepted(
        r#"
        nt grid[2][2] = {{1, 2}, {3, 4}};
        mn() {
            strng name;
            nt n = ~5;
            name = npt("Name: ");
            grid[0][1] = n;
            end;
        }
    "#,
    );
}

#[test]
fn test_function_forms() {
    assert_accepted(
        r#"
        fnctn vd greet() {
            prnt("hello");
            rtrn;
        }
        fnctn bln positive(nt n) {
            rtrn n > 0;
        }
        mn() {
            greet();
            end;
        }
    "#,
    );
}

#[test]
fn test_function_after_entry_point_rejected() {
    let err = assert_rejected("mn() { end; } fnctn vd late() { }");
    assert!(matches!(err, ParseError::TrailingTokens { .. }));
}

#[test]
fn test_declaration_after_statement_rejected() {
    assert_rejected("mn() { nt x; x = 1; nt y; end; }");
}

#[test]
fn test_double_initializer_rejects_parentheses() {
    assert_rejected("mn() { dbl x = (1.50); end; }");
}

#[test]
fn test_print_needs_an_argument() {
    assert_rejected("mn() { prnt(); end; }");
}

#[test]
fn test_error_reports_position() {
    let err = assert_rejected("mn() {\n  nt x = ;\n  end;\n}");
    let location = err.location().expect("position");
    assert_eq!((location.line, location.column), (2, 10));
    assert!(err.to_string().starts_with("Syntax Error at line 2, column 10"), "{err}");
}

#[test]
fn test_demos_parse() {
    for source in [
        include_str!("../demos/grades.cns"),
        include_str!("../demos/countdown.cns"),
        include_str!("../demos/rejected.cns"),
    ] {
        assert_accepted(source);
    }
}
