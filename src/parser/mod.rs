//! Syntax checking for Conso token sequences
//!
//! This module decides whether a token sequence derives from the start symbol:
//! - [`grammar`]: the static LL(1) production table
//! - [`predictive`]: the explicit-stack parser that walks it
//!
//! # Parser Implementation
//!
//! Non-recursive, table-driven predictive parsing with one token of lookahead.
//! No tree is built; the semantic analyzer re-scans the token sequence itself.

pub mod grammar;
pub mod predictive;

pub use grammar::{Grammar, GrammarSymbol, START_SYMBOL};
pub use predictive::{parse, ParseError, ParseOutcome, Parser, ACCEPTED_MESSAGE};
