//! Lexical analysis
//!
//! This module turns Conso source text into tokens:
//! - [`token`]: token kinds, the [`Token`] record and the reserved-word table
//! - [`delimiters`]: per-kind legal follow characters
//! - [`scanner`]: the [`Lexer`] itself and its [`LexError`] diagnostics

pub mod delimiters;
pub mod scanner;
pub mod token;

pub use scanner::{tokenize, LexError, LexErrorKind, LexOutput, Lexer, MAX_IDENTIFIER_LEN};
pub use token::{keyword, SourceLocation, Token, TokenKind};
