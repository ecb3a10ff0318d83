//! Compiler configuration
//!
//! Limits and stage gating for one [`compile`](crate::pipeline::compile) run.

use crate::lexer::MAX_IDENTIFIER_LEN;
use crate::parser::predictive::DEFAULT_STEP_LIMIT;
use crate::semantic::{DEFAULT_MAX_NESTING, DEFAULT_SCAN_LIMIT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Longest identifier the lexer accepts
    pub max_identifier_len: usize,
    /// Iteration ceiling for every analyzer scan loop
    pub scan_limit: usize,
    /// Deepest block or sub-expression nesting the analyzer follows
    pub max_nesting: usize,
    /// Ceiling on parser loop iterations
    pub parse_step_limit: usize,
    /// Skip parsing and analysis when the lexer reported errors
    pub halt_on_lexical_errors: bool,
    /// Run the analyzer even when the parser rejected the input
    pub analyze_rejected: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            max_identifier_len: MAX_IDENTIFIER_LEN,
            scan_limit: DEFAULT_SCAN_LIMIT,
            max_nesting: DEFAULT_MAX_NESTING,
            parse_step_limit: DEFAULT_STEP_LIMIT,
            halt_on_lexical_errors: true,
            analyze_rejected: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.max_identifier_len, 16);
        assert_eq!(config.scan_limit, 1_000_000);
        assert_eq!(config.max_nesting, 128);
        assert_eq!(config.parse_step_limit, 1_000_000);
        assert!(config.halt_on_lexical_errors);
        assert!(!config.analyze_rejected);
    }
}
