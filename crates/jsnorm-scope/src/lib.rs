//! Lexical scope analysis for JavaScript programs.
//!
//! [`analyze`] builds a [`ScopeGraph`]: every scope (program, function,
//! block, catch clause, `for` head, class body), every binding declared in
//! it, and every identifier occurrence resolved to its binding by
//! [`NodeId`]. Names nothing declares are recorded as globals.
//!
//! Renaming is two-phase. [`ScopeGraph::rename`] records the new name (and
//! later lookups see it), [`ScopeGraph::apply_renames`] rewrites every
//! occurrence in the tree afterwards.

mod analyze;
mod graph;

pub use analyze::analyze;
pub use graph::{Binding, BindingId, BindingKind, Reference, Scope, ScopeGraph, ScopeId, ScopeKind};
