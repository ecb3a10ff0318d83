//! Whole front-end run
//!
//! [`compile`] threads one source text through lexer, parser and analyzer,
//! honouring the gating in [`CompilerConfig`]. Stages that did not run are
//! `None` in the returned [`Compilation`].

use crate::config::CompilerConfig;
use crate::lexer::{LexError, Lexer, Token};
use crate::parser::{ParseOutcome, Parser};
use crate::semantic::{Analysis, Analyzer};
use log::debug;

#[derive(Debug, Clone)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub lex_errors: Vec<LexError>,
    pub parse: Option<ParseOutcome>,
    pub analysis: Option<Analysis>,
}

impl Compilation {
    /// Every stage that ran reported no error, and every stage ran.
    pub fn succeeded(&self) -> bool {
        self.lex_errors.is_empty()
            && self.parse.as_ref().is_some_and(|p| p.accepted)
            && self.analysis.as_ref().is_some_and(|a| a.accepted)
    }

    /// Diagnostics from every stage that ran, in stage order.
    pub fn diagnostics(&self) -> Vec<String> {
        let mut out: Vec<String> = self.lex_errors.iter().map(|e| e.to_string()).collect();
        if let Some(parse) = &self.parse {
            if let Some(err) = &parse.error {
                out.push(err.to_string());
            }
        }
        if let Some(analysis) = &self.analysis {
            out.extend(analysis.errors.iter().map(|e| e.to_string()));
        }
        out
    }
}

pub fn compile(source: &str, config: &CompilerConfig) -> Compilation {
    let lexed = Lexer::new(source)
        .with_max_identifier_len(config.max_identifier_len)
        .tokenize();
    debug!(
        "lexer: {} token(s), {} error(s)",
        lexed.tokens.len(),
        lexed.errors.len()
    );

    let mut compilation = Compilation {
        tokens: lexed.tokens,
        lex_errors: lexed.errors,
        parse: None,
        analysis: None,
    };
    if !compilation.lex_errors.is_empty() && config.halt_on_lexical_errors {
        debug!("halting after lexical errors");
        return compilation;
    }

    let parse = Parser::new(&compilation.tokens)
        .with_step_limit(config.parse_step_limit)
        .parse();
    let accepted = parse.accepted;
    compilation.parse = Some(parse);
    if !accepted && !config.analyze_rejected {
        debug!("halting after syntax error");
        return compilation;
    }

    let analysis = Analyzer::new(&compilation.tokens)
        .with_scan_limit(config.scan_limit)
        .with_max_nesting(config.max_nesting)
        .analyze();
    debug!("analyzer: accepted={}", analysis.accepted);
    compilation.analysis = Some(analysis);
    compilation
}
