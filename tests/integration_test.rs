// End-to-end tests for the Conso front end

use conso::lexer::TokenKind;
use conso::parser::ACCEPTED_MESSAGE;
use conso::semantic::SEMANTIC_OK_MESSAGE;
use conso::{compile, Compilation, CompilerConfig};
use std::thread;

fn run(source: &str) -> Compilation {
    let _ = env_logger::builder().is_test(true).try_init();
    compile(source, &CompilerConfig::default())
}

#[test]
fn test_grades_demo() {
    let result = run(include_str!("../demos/grades.cns"));
    assert!(result.succeeded(), "{:?}", result.diagnostics());

    let parse = result.parse.as_ref().expect("parser ran");
    assert_eq!(parse.messages, vec![ACCEPTED_MESSAGE.to_string()]);

    let analysis = result.analysis.as_ref().expect("analyzer ran");
    assert_eq!(analysis.messages(), vec![SEMANTIC_OK_MESSAGE.to_string()]);
    assert!(analysis.symbols.function("passed").is_some());
    assert!(analysis.symbols.function("average").is_some());
    assert!(analysis.symbols.lookup_global("Student").is_some());
    assert!(analysis
        .symbols
        .lookup_in_function("mn", "top")
        .is_some_and(|s| s.initialized));
}

#[test]
fn test_countdown_demo() {
    let result = run(include_str!("../demos/countdown.cns"));
    assert!(result.succeeded(), "{:?}", result.diagnostics());

    let label = result
        .analysis
        .as_ref()
        .and_then(|a| a.symbols.function("label"))
        .expect("label recorded");
    assert!(label.has_return);
    assert_eq!(label.params.len(), 1);
}

#[test]
fn test_rejected_demo() {
    let result = run(include_str!("../demos/rejected.cns"));
    assert!(!result.succeeded());
    assert!(result.lex_errors.is_empty());
    assert!(result.parse.as_ref().is_some_and(|p| p.accepted));
    assert_eq!(
        result.diagnostics(),
        vec!["Semantic Error at line 4, column 15: Type mismatch: Cannot assign 'nt' to 'bln'"
            .to_string()]
    );
}

#[test]
fn test_token_stream_ends_with_eof() {
    let result = run(include_str!("../demos/grades.cns"));
    assert_eq!(result.tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    assert_eq!(result.tokens[0].kind, TokenKind::Const);
}

#[test]
fn test_stages_stop_at_first_failing_stage() {
    let lexical = run("mn() { nt 9lives = 1; end; }");
    assert_eq!(lexical.lex_errors.len(), 1);
    assert!(lexical.parse.is_none());
    assert!(lexical.analysis.is_none());

    let syntax = run("mn() { nt x = 1 end; }");
    assert!(syntax.lex_errors.is_empty());
    assert!(syntax.parse.as_ref().is_some_and(|p| !p.accepted));
    assert!(syntax.analysis.is_none());
    assert_eq!(syntax.diagnostics().len(), 1);
}

#[test]
fn test_keep_going_runs_the_analyzer() {
    let config = CompilerConfig {
        analyze_rejected: true,
        ..CompilerConfig::default()
    };
    let result = compile("mn() { end; } fnctn vd late() { }", &config);
    assert!(result.parse.as_ref().is_some_and(|p| !p.accepted));
    let analysis = result.analysis.as_ref().expect("analyzer ran");
    assert!(analysis.accepted, "{:?}", analysis.messages());
    assert!(!result.succeeded());
}

#[test]
fn test_compilation_is_repeatable() {
    let source = include_str!("../demos/countdown.cns");
    let first = run(source);
    let second = run(source);
    assert_eq!(first.tokens, second.tokens);
    assert_eq!(first.diagnostics(), second.diagnostics());
    assert_eq!(
        first.parse.as_ref().map(|p| p.trace.len()),
        second.parse.as_ref().map(|p| p.trace.len())
    );
}

#[test]
fn test_concurrent_compilations() {
    let sources = [
        include_str!("../demos/grades.cns"),
        include_str!("../demos/countdown.cns"),
        include_str!("../demos/rejected.cns"),
    ];
    let handles: Vec<_> = sources
        .iter()
        .map(|source| {
            let source = source.to_string();
            thread::spawn(move || compile(&source, &CompilerConfig::default()).succeeded())
        })
        .collect();
    let verdicts: Vec<bool> = handles
        .into_iter()
        .map(|h| h.join().expect("compilation thread"))
        .collect();
    assert_eq!(verdicts, vec![true, true, false]);
}

#[test]
fn test_scan_limit_is_reported_not_hung() {
    let config = CompilerConfig {
        scan_limit: 2,
        ..CompilerConfig::default()
    };
    let result = compile(include_str!("../demos/grades.cns"), &config);
    let analysis = result.analysis.as_ref().expect("analyzer ran");
    assert!(!analysis.accepted);
    assert!(
        analysis.errors[0].to_string().contains("2"),
        "{:?}",
        analysis.messages()
    );
}

#[test]
fn test_nesting_limit_is_configurable() {
    let source = format!(
        "mn() {{ {}{}end; }}",
        "whl (tr) { ".repeat(40),
        "} ".repeat(40)
    );
    assert!(run(&source).succeeded());

    let config = CompilerConfig {
        max_nesting: 10,
        ..CompilerConfig::default()
    };
    let result = compile(&source, &config);
    assert!(result.parse.as_ref().is_some_and(|p| p.accepted));
    assert_eq!(result.diagnostics().len(), 1);
    assert!(
        result.diagnostics()[0].contains("nesting deeper than 10 levels"),
        "{:?}",
        result.diagnostics()
    );
}
