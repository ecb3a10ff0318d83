// Black-box tests for the semantic analyzer

use conso::lexer::{tokenize, TokenKind};
use conso::semantic::{
    analyze, Analysis, DataType, SemanticErrorKind, DEFAULT_MAX_NESTING, SEMANTIC_OK_MESSAGE,
};

fn check(source: &str) -> Analysis {
    let _ = env_logger::builder().is_test(true).try_init();
    let out = tokenize(source);
    assert!(out.is_clean(), "lexical errors: {:?}", out.errors);
    analyze(&out.tokens)
}

fn assert_ok(source: &str) -> Analysis {
    let analysis = check(source);
    assert!(analysis.accepted, "{source}\n{:?}", analysis.messages());
    assert_eq!(analysis.messages(), vec![SEMANTIC_OK_MESSAGE.to_string()]);
    analysis
}

fn first_error(source: &str) -> SemanticErrorKind {
    let analysis = check(source);
    assert!(!analysis.accepted, "expected a semantic error for {source}");
    assert_eq!(analysis.errors.len(), 1);
    analysis.errors[0].kind.clone()
}

#[test]
fn test_call_before_declaration() {
    assert_ok(
        r#"
        fnctn nt first() {
            rtrn second();
        }
        fnctn nt second() {
            rtrn 1;
        }
        mn() {
            nt x = first();
            end;
        }
    "#,
    );
}

#[test]
fn test_function_after_entry_point() {
    let analysis = assert_ok(
        r#"
        mn() {
            nt x = later();
            end;
        }
        fnctn nt later() {
            rtrn 1;
        }
    "#,
    );
    assert!(analysis.symbols.function("later").is_some());
}

#[test]
fn test_redeclaration_in_one_scope() {
    let analysis = check("mn() { nt a; nt a; end; }");
    assert!(!analysis.accepted);
    let message = analysis.errors[0].to_string();
    assert!(message.contains("already declared"), "{message}");
    assert_eq!(message, "Semantic Error at line 1, column 17: Variable 'a' already declared");
}

#[test]
fn test_function_local_shadows_global() {
    let analysis = assert_ok("nt a; fnctn vd g() { dbl a; } mn() { end; }");
    assert_eq!(
        analysis.symbols.lookup_global("a").map(|s| s.data_type.clone()),
        Some(DataType::Int)
    );
    assert_eq!(
        analysis
            .symbols
            .lookup_in_function("g", "a")
            .map(|s| s.data_type.clone()),
        Some(DataType::Double)
    );
}

#[test]
fn test_mixed_arithmetic_widens() {
    assert_ok("mn() { nt a = 5; dbl b = 2.0; dbl c = a + b; end; }");
}

#[test]
fn test_integer_into_boolean_rejected() {
    assert_eq!(
        first_error("mn() { nt a = 5; bln b = a + 2; end; }"),
        SemanticErrorKind::AssignMismatch {
            target: DataType::Bool,
            value: DataType::Int
        }
    );
}

#[test]
fn test_literal_index_out_of_bounds() {
    assert_eq!(
        first_error("mn() { nt arr[3]; arr[5] = 1; end; }"),
        SemanticErrorKind::IndexOutOfBounds { index: 5, size: 3 }
    );
}

#[test]
fn test_variable_index_not_bounds_checked() {
    assert_ok("mn() { nt arr[3]; nt i = 5; arr[i] = 1; end; }");
}

#[test]
fn test_break_needs_loop_or_switch() {
    assert_eq!(
        first_error("fnctn vd g() { brk; } mn() { end; }"),
        SemanticErrorKind::BreakOutsideLoop
    );
    assert_ok("fnctn vd g() { whl (tr) { brk; } } mn() { end; }");
}

#[test]
fn test_entry_point_may_return_zero_only() {
    assert_ok("mn() { rtrn 0; end; }");
    assert_eq!(
        first_error("mn() { rtrn 1; end; }"),
        SemanticErrorKind::EntryPointReturn
    );
    assert!(matches!(
        first_error("fnctn vd g() { rtrn 0; } mn() { end; }"),
        SemanticErrorKind::VoidReturnsValue { .. }
    ));
}

#[test]
fn test_missing_switch_break() {
    assert!(matches!(
        first_error("mn() { nt n = 1; swtch (n) { cs 1: n = 2; cs 2: brk; } end; }"),
        SemanticErrorKind::MissingBreak { .. }
    ));
}

#[test]
fn test_duplicate_case_label() {
    assert_eq!(
        first_error("mn() { nt n = 1; swtch (n) { cs 1: brk; cs 1: brk; } end; }"),
        SemanticErrorKind::DuplicateCaseLabel {
            label: "1".to_string()
        }
    );
}

#[test]
fn test_wrong_arity() {
    assert_eq!(
        first_error("fnctn nt add(nt a, nt b) { rtrn a + b; } mn() { nt x = add(1); end; }"),
        SemanticErrorKind::ArgumentCount {
            function: "add".to_string(),
            expected: 2,
            found: 1
        }
    );
}

#[test]
fn test_undefined_struct_member() {
    assert_eq!(
        first_error("strct P { nt x; }; mn() { dfstrct P p; p.y = 1; end; }"),
        SemanticErrorKind::NoSuchMember {
            structure: "P".to_string(),
            member: "y".to_string()
        }
    );
}

#[test]
fn test_function_body_range_recorded() {
    let out = tokenize("fnctn vd g() { prnt(1); } mn() { end; }");
    let analysis = analyze(&out.tokens);
    assert!(analysis.accepted, "{:?}", analysis.messages());

    let info = analysis.symbols.function("g").expect("function g");
    assert_eq!(out.tokens[info.body.start - 1].kind, TokenKind::LBrace);
    assert_eq!(out.tokens[info.body.end].kind, TokenKind::RBrace);
    assert!(!info.is_entry_point);

    let main = analysis.symbols.function("mn").expect("entry point");
    assert!(main.is_entry_point);
    assert_eq!(main.return_type, DataType::Void);
}

#[test]
fn test_independent_runs_do_not_interact() {
    let first = check("nt shared = 1; mn() { end; }");
    let second = check("mn() { shared = 2; end; }");
    assert!(first.accepted);
    assert_eq!(
        second.errors[0].kind,
        SemanticErrorKind::UndefinedVariable {
            name: "shared".to_string()
        }
    );
}

#[test]
fn test_deep_parentheses_report_nesting_limit() {
    let depth = 30_000;
    let source = format!(
        "mn() {{ nt x = {}1{}; end; }}",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    assert_eq!(
        first_error(&source),
        SemanticErrorKind::NestingLimit {
            limit: DEFAULT_MAX_NESTING
        }
    );
}

#[test]
fn test_long_not_chain_reports_nesting_limit() {
    let source = format!("mn() {{ bln x = {}tr; end; }}", "! ".repeat(5_000));
    assert_eq!(
        first_error(&source),
        SemanticErrorKind::NestingLimit {
            limit: DEFAULT_MAX_NESTING
        }
    );
}

#[test]
fn test_deeply_nested_loops_report_nesting_limit() {
    let depth = 3_000;
    let source = format!(
        "mn() {{ {}{}end; }}",
        "whl (tr) { ".repeat(depth),
        "} ".repeat(depth)
    );
    let analysis = check(&source);
    assert!(!analysis.accepted);
    assert_eq!(
        analysis.errors[0].kind,
        SemanticErrorKind::NestingLimit {
            limit: DEFAULT_MAX_NESTING
        }
    );
    assert!(analysis.errors[0].to_string().contains("Internal error"));
}
