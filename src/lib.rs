//! # Introduction
//!
//! `conso` is the front end of a compiler for Conso, a small C-like teaching
//! language with abbreviated keywords (`nt`, `dbl`, `f`, `lsf`, `whl`, ...).
//! It decides whether a source text is lexically, syntactically and
//! semantically valid and reports the first problem it finds in each stage.
//! No code is generated.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Parser (LL(1) table) → Analyzer (2 passes) → Verdict
//! ```
//!
//! 1. [`lexer`]: turns characters into tokens, normalizes numeric literals
//!    and checks which character may follow each token.
//! 2. [`parser`]: runs a table-driven predictive parse over the tokens and
//!    records a step trace. No tree is built.
//! 3. [`semantic`]: re-scans the tokens to check declarations, scopes, types
//!    and control flow, producing a [`semantic::SymbolTable`].
//! 4. [`pipeline`]: runs the stages in order under a [`config::CompilerConfig`].
//!
//! ## Language summary
//!
//! Types: `nt`, `dbl`, `bln`, `chr`, `strng`, `vd`, structs (`strct`,
//! `dfstrct`), arrays of up to two dimensions, constants (`cnst`).
//! Control flow: `f`/`lsf`/`ls`, `swtch`/`cs`/`dflt`, `fr`, `whl`, `d`-`whl`,
//! `brk`, `cntn`, `rtrn`. I/O: `prnt(...)`, `npt("prompt")`.
//! Every program ends with `mn() { ... end; }`.

pub mod config;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod semantic;

pub use config::CompilerConfig;
pub use pipeline::{compile, Compilation};
