//! Pattern-driven rewriting of JavaScript syntax trees.
//!
//! Rules are written as pairs of JavaScript snippets with placeholders (see
//! [`pattern`]) and compiled once into a [`RuleSet`]. A [`Rewriter`] applies
//! a rule set to a whole [`Program`](jsnorm_syntax::Program) in one pass.
//!
//! ```
//! use jsnorm_rules::{RuleSet, Rewriter};
//! use jsnorm_syntax::{JavaScriptWriter, read_javascript};
//!
//! let rules = RuleSet::builtin().unwrap();
//! let mut program = read_javascript("if (!0) a(), b();").unwrap();
//! Rewriter::new(&rules).rewrite(&mut program).unwrap();
//! assert_eq!(
//!     JavaScriptWriter::emit(&program),
//!     "if (true) {\n  a();\n  b();\n}\n"
//! );
//! ```

mod builtin;
pub mod pattern;
mod rewrite;
mod rule;

pub use builtin::BUILTIN_RULES;
pub use pattern::{
    Bound, CompileError, Environment, FillError, MatchOptions, Pattern, PlaceholderKey,
};
pub use rewrite::{RewriteError, RewriteStats, Rewriter};
pub use rule::{Rule, RuleError, RuleSet, RuleSpec};
