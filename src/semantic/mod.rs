//! Semantic analysis of accepted token sequences
//!
//! This module checks declarations, scoping, types and control-flow placement:
//! - [`analyzer`]: the two-pass driver, its token cursor and block contexts
//! - [`declarations`], [`statements`], [`expressions`]: the rules themselves
//! - [`scope`]: the scope arena and the [`SymbolTable`] returned to callers
//! - [`symbol`]: symbol records and built-in functions
//! - [`types`]: data types and operator typing
//! - [`errors`]: [`SemanticError`] and every rule it can name
//!
//! # Passes
//!
//! ```text
//! tokens ─► pass 1: functions, mn, structs ─► pass 2: bodies + globals ─► Analysis
//! ```
//!
//! Analysis stops at the first error. Reads of variables that were never
//! assigned are logged as warnings and do not fail the run.

pub mod analyzer;
mod declarations;
pub mod errors;
mod expressions;
pub mod scope;
mod statements;
pub mod symbol;
pub mod types;

pub use analyzer::{
    analyze, Analysis, Analyzer, DEFAULT_MAX_NESTING, DEFAULT_SCAN_LIMIT, SEMANTIC_OK_MESSAGE,
};
pub use errors::{SemanticError, SemanticErrorKind};
pub use scope::{Scope, ScopeArena, ScopeId, SymbolTable};
pub use symbol::{ArrayShape, ArraySize, Builtin, FunctionInfo, Parameter, Symbol, SymbolKind};
pub use types::{BinaryOperator, DataType};
