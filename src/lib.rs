//! # stackc
//!
//! The front end of a compiler for stacklang, a C++-like surface
//! language: a hand-written scanner plus a recursive-descent parser that
//! produces a fully resolved abstract syntax tree for one translation
//! unit.
//!
//! ## Pipeline
//!
//! ```text
//! Source -> Scanner -> Token assembly -> Parser (+ context stack) -> AST
//! ```
//!
//! The scanner splits runs of special characters by longest match over
//! the operator tables. The parser resolves every identifier to its
//! declaration while parsing, handles C++-style ambiguities by
//! checkpointed speculation, supports templates with type and integer
//! parameters, and normalizes operator precedence by rotating freshly
//! built nodes rather than by precedence climbing.
//!
//! ## Quick start
//!
//! ```rust
//! use stackc::{parse, DeclKind};
//!
//! let unit = parse("int add(int x, int y) { return x + y; }").unwrap();
//!
//! let add = unit.find_decl("add").unwrap();
//! let DeclKind::Func(func) = &unit.decl(add).kind else {
//!     panic!("expected a function");
//! };
//! assert_eq!(func.params.len(), 2);
//! assert_eq!(func.body.len(), 1);
//! ```
//!
//! ## Errors
//!
//! Every failure is one of the closed [`Error`] kinds with a message and
//! a (possibly unknown) location:
//!
//! ```rust
//! use stackc::{parse, Error};
//!
//! let err = parse("int sum(int x, int y) { return x; } int top(int x) { return sum(x); }")
//!     .unwrap_err();
//! assert!(matches!(err, Error::Arity { .. }));
//! ```
//!
//! ## Module overview
//!
//! - [`scanner`] — tokenization and token assembly
//! - [`tokens`] — operator precedence and special-token tables
//! - [`ast`] — AST sums and the [`ParsedUnit`] parse result
//! - [`arena`] — typed id arena backing the declaration DAG
//! - [`context`] — the lexical context stack
//! - [`parser`] — the recursive-descent parser
//! - [`diagnostics`] — error kinds, codes, and the report emitter
//! - [`span`] — source locations

pub mod arena;
pub mod ast;
pub mod context;
pub mod diagnostics;
pub mod parser;
pub mod scanner;
pub mod span;
pub mod tokens;

pub use ast::{
    Decl, DeclId, DeclKind, Expr, ExprKind, Namespace, ParsedUnit, Stmt, TemplateArg,
    TemplateParamKind, Type, Value, VarInit,
};
pub use diagnostics::{Diagnostic, DiagnosticEmitter, Error, ErrorCode, Result};
pub use parser::Parser;
pub use scanner::{scan, Token};
pub use span::Location;

/// Parse one translation unit: tokenize, then parse into the anonymous
/// root namespace. This is the crate's single public parse operation.
pub fn parse(source: &str) -> Result<ParsedUnit> {
    Parser::new(source)?.parse_translation_unit()
}
