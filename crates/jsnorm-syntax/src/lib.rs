//! JavaScript syntax tree for the jsnorm normalizer.
//!
//! `jsnorm-syntax` reads JavaScript into a closed, strongly typed tree,
//! lets passes rewrite it in place, and writes it back out as source.
//!
//! # Architecture
//!
//! ```text
//! source ──> JavaScriptReader ──> Program ──> VisitMut passes ──> JavaScriptWriter ──> source
//!            (tree-sitter)        (ir.rs)                         (precedence-aware)
//! ```
//!
//! # Example
//!
//! ```
//! use jsnorm_syntax::{input, output};
//!
//! let program = input::read_javascript("a && b();").unwrap();
//! let js = output::JavaScriptWriter::emit(&program);
//! assert_eq!(js, "a && b();\n");
//! ```
//!
//! The same tree types describe rewrite patterns: the `Placeholder` variants
//! of identifiers, statements and expressions stand for holes a pattern binds.

pub mod ir;
pub mod traits;
pub mod visit_mut;

pub mod input;
pub mod output;

// Re-exports: IR types
pub use ir::{
    BinaryOp, Expr, ForInit, Function, Ident, Literal, NodeId, Pat, Program, Stmt, StmtKind,
    UnaryOp, VarKind,
};

// Re-exports: Traits
pub use traits::{ReadError, Reader, Writer};
pub use visit_mut::VisitMut;

// Re-exports: Built-in reader and writer
pub use input::{JavaScriptReader, read_javascript};
pub use output::{JavaScriptWriter, JavaScriptWriterImpl};
