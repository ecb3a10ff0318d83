//! Table-driven predictive parser
//!
//! An explicit stack machine: no recursion and no tree. The parse stack is
//! seeded with [`START_SYMBOL`]; each step pops one symbol and either matches
//! it against the lookahead token or replaces it with the production chosen
//! by `(symbol, lookahead)`. The first mismatch stops the parse.

use super::grammar::{Grammar, GrammarSymbol, START_SYMBOL};
use crate::lexer::{SourceLocation, Token, TokenKind};
use log::{debug, trace};
use thiserror::Error;

/// Fixed message reported for an accepted program.
pub const ACCEPTED_MESSAGE: &str = "Input accepted: Syntactically correct.";

/// Default ceiling on parser loop iterations.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Syntax errors. The parse stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A terminal on the stack did not match the lookahead.
    #[error("Syntax Error at {location}: Unexpected symbol '{found}', expected '{expected}'")]
    UnexpectedSymbol {
        found: String,
        expected: String,
        location: SourceLocation,
    },

    /// No production for the nonterminal on top of the stack.
    #[error("Syntax Error at {location}: Unexpected token '{found}', expected one of: [{}]", quoted(.expected))]
    UnexpectedToken {
        found: String,
        nonterminal: &'static str,
        expected: Vec<TokenKind>,
        location: SourceLocation,
    },

    /// The stream ended while the stack still expected input.
    #[error("Syntax Error at {location}: Unexpected end of input, expected '{expected}'")]
    UnexpectedEnd {
        expected: String,
        location: SourceLocation,
    },

    /// The stack emptied before the end-of-stream token.
    #[error("Syntax Error at {location}: Unexpected tokens remaining after program end, found '{found}'")]
    TrailingTokens {
        found: String,
        location: SourceLocation,
    },

    #[error("Syntax Error: Parse step limit of {limit} exceeded")]
    StepLimit { limit: usize },

    #[error("Syntax Error: Empty token sequence")]
    NoTokens,
}

fn quoted(kinds: &[TokenKind]) -> String {
    kinds
        .iter()
        .map(|k| format!("'{}'", k.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ParseError {
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            ParseError::UnexpectedSymbol { location, .. }
            | ParseError::UnexpectedToken { location, .. }
            | ParseError::UnexpectedEnd { location, .. }
            | ParseError::TrailingTokens { location, .. } => Some(*location),
            ParseError::StepLimit { .. } | ParseError::NoTokens => None,
        }
    }
}

/// Result of one parse: the step trace, the diagnostics and the verdict.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub trace: Vec<String>,
    pub messages: Vec<String>,
    pub accepted: bool,
    pub error: Option<ParseError>,
}

/// Parse `tokens` with the default step limit.
pub fn parse(tokens: &[Token]) -> ParseOutcome {
    Parser::new(tokens).parse()
}

/// Stack machine over one token sequence.
pub struct Parser<'t> {
    tokens: &'t [Token],
    position: usize,
    stack: Vec<GrammarSymbol>,
    grammar: &'static Grammar,
    trace: Vec<String>,
    step_limit: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            position: 0,
            stack: vec![GrammarSymbol::NonTerminal(START_SYMBOL)],
            grammar: Grammar::get(),
            trace: Vec::new(),
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    /// Run the parse to completion.
    pub fn parse(mut self) -> ParseOutcome {
        let result = self.run();
        let (messages, accepted, error) = match result {
            Ok(()) => (vec![ACCEPTED_MESSAGE.to_string()], true, None),
            Err(err) => (vec![err.to_string()], false, Some(err)),
        };
        debug!("parse finished: accepted={accepted}");
        ParseOutcome {
            trace: self.trace,
            messages,
            accepted,
            error,
        }
    }

    fn run(&mut self) -> Result<(), ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::NoTokens);
        }

        let mut steps = 0usize;
        while let Some(top) = self.stack.pop() {
            steps += 1;
            if steps > self.step_limit {
                return Err(ParseError::StepLimit {
                    limit: self.step_limit,
                });
            }

            let token = self.current()?;
            let lookahead = token.kind;
            let location = token.location;
            self.log(format!(
                "Stack top: {top}, lookahead: {lookahead} (line {}, column {})",
                location.line, location.column
            ));

            match top {
                GrammarSymbol::Terminal(expected) if expected == lookahead => {
                    self.log(format!("Matched: {lookahead}"));
                    self.position += 1;
                }
                GrammarSymbol::Terminal(expected) => {
                    return Err(if lookahead == TokenKind::Eof {
                        ParseError::UnexpectedEnd {
                            expected: expected.as_str().to_string(),
                            location,
                        }
                    } else {
                        ParseError::UnexpectedSymbol {
                            found: lookahead.as_str().to_string(),
                            expected: expected.as_str().to_string(),
                            location,
                        }
                    });
                }
                GrammarSymbol::NonTerminal(name) => {
                    let Some(rule) = self.grammar.production(name, lookahead) else {
                        return Err(ParseError::UnexpectedToken {
                            found: lookahead.as_str().to_string(),
                            nonterminal: name,
                            expected: self.grammar.expected(name),
                            location,
                        });
                    };
                    if rule.is_empty() {
                        self.log(format!("Skipping {name} (empty production)"));
                    } else {
                        let body: Vec<String> = rule.iter().map(|s| s.to_string()).collect();
                        self.log(format!("Applying rule: {name} -> {}", body.join(" ")));
                        self.stack.extend(rule.iter().rev().copied());
                    }
                }
            }
        }

        let token = self.current()?;
        if token.kind == TokenKind::Eof && self.position + 1 == self.tokens.len() {
            Ok(())
        } else {
            Err(ParseError::TrailingTokens {
                found: token.kind.as_str().to_string(),
                location: token.location,
            })
        }
    }

    /// The lookahead token. Past the end the sentinel is repeated.
    fn current(&self) -> Result<&'t Token, ParseError> {
        self.tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .ok_or(ParseError::NoTokens)
    }

    fn log(&mut self, line: String) {
        trace!("{line}");
        self.trace.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_source(source: &str) -> ParseOutcome {
        let out = tokenize(source);
        assert!(out.is_clean(), "lexical errors: {:?}", out.errors);
        parse(&out.tokens)
    }

    #[test]
    fn test_minimal_program() {
        let outcome = parse_source("mn() { end; }");
        assert!(outcome.accepted, "{:?}", outcome.messages);
        assert_eq!(outcome.messages, vec![ACCEPTED_MESSAGE.to_string()]);
        assert!(outcome.trace[0].starts_with("Stack top: <program>, lookahead: mn"));
    }

    #[test]
    fn test_trace_records_rules_and_matches() {
        let outcome = parse_source("mn() { end; }");
        assert!(outcome
            .trace
            .iter()
            .any(|l| l.starts_with("Applying rule: <program> -> <global_declaration>")));
        assert!(outcome.trace.iter().any(|l| l == "Matched: mn"));
        assert!(outcome
            .trace
            .iter()
            .any(|l| l == "Skipping <global_declaration> (empty production)"));
    }

    #[test]
    fn test_missing_brace_reports_end_of_input() {
        let outcome = parse_source("mn() { end;");
        assert!(!outcome.accepted);
        assert!(matches!(
            outcome.error,
            Some(ParseError::UnexpectedEnd { ref expected, .. }) if expected == "}"
        ));
    }

    #[test]
    fn test_unexpected_token_lists_alternatives() {
        let outcome = parse_source("x mn() { end; }");
        assert!(!outcome.accepted);
        let message = &outcome.messages[0];
        assert!(message.contains("Unexpected token 'id'"), "{message}");
        assert!(message.contains("'mn'"), "{message}");
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let outcome = parse_source("mn() { end; } nt");
        assert!(matches!(outcome.error, Some(ParseError::TrailingTokens { .. })));
    }

    #[test]
    fn test_step_limit() {
        let out = tokenize("mn() { end; }");
        let outcome = Parser::new(&out.tokens).with_step_limit(3).parse();
        assert_eq!(outcome.error, Some(ParseError::StepLimit { limit: 3 }));
    }

    #[test]
    fn test_empty_token_sequence() {
        let outcome = parse(&[]);
        assert_eq!(outcome.error, Some(ParseError::NoTokens));
    }
}
