//! Patterns: syntax trees with typed holes.
//!
//! A pattern is written as ordinary JavaScript in which some identifiers are
//! placeholders:
//!
//! | written | family | binds |
//! |---|---|---|
//! | `placeholderN` | generic | an identifier name |
//! | `statementN;` / `statementN.multiLine;` | statement | any statement / a compound one |
//! | `expressionN` / `expressionN.orDeclaration` | expression | an expression / also a loop-head declaration |
//!
//! [`Pattern::compile`] turns such text into a tree, [`match_stmt`] and
//! [`match_expr`] bind a pattern against concrete nodes, and
//! [`fill_stmt`] / [`fill_expr`] instantiate a template from the bindings.

mod compile;
mod fill;
mod matcher;

pub use compile::CompileError;
pub use fill::{FillError, fill_expr, fill_stmt};
pub use matcher::{match_expr, match_stmt, match_stmts};

use jsnorm_syntax::ir::{Expr, Ident, Stmt, StmtKind, VarDecl};
use jsnorm_syntax::output::JavaScriptWriter;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    Generic,
    Statement,
    Expression,
}

impl Family {
    /// Identifier prefix that introduces a placeholder of this family.
    pub fn prefix(self) -> &'static str {
        match self {
            Family::Generic => "placeholder",
            Family::Statement => "statement",
            Family::Expression => "expression",
        }
    }
}

/// Placeholder identity within one pattern: family plus index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlaceholderKey {
    pub family: Family,
    pub index: u32,
}

impl PlaceholderKey {
    pub fn generic(index: u32) -> Self {
        Self {
            family: Family::Generic,
            index,
        }
    }

    pub fn statement(index: u32) -> Self {
        Self {
            family: Family::Statement,
            index,
        }
    }

    pub fn expression(index: u32) -> Self {
        Self {
            family: Family::Expression,
            index,
        }
    }

    /// Parse `placeholder3` / `statement1` / `expression2`.
    pub fn parse(name: &str) -> Option<Self> {
        [Family::Generic, Family::Statement, Family::Expression]
            .into_iter()
            .find_map(|family| {
                let digits = name.strip_prefix(family.prefix())?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                let index = digits.parse().ok()?;
                Some(Self { family, index })
            })
    }
}

impl fmt::Display for PlaceholderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.family.prefix(), self.index)
    }
}

/// A value bound to a placeholder, borrowed from the matched tree.
#[derive(Debug, Clone, Copy)]
pub enum Bound<'a> {
    Name(&'a Ident),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    /// A `var`/`let`/`const` in a loop head, bound by `expressionN.orDeclaration`.
    Decl(&'a VarDecl),
}

impl PartialEq for Bound<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Bound::Name(a), Bound::Name(b)) => a.name() == b.name(),
            (Bound::Stmt(a), Bound::Stmt(b)) => a == b,
            (Bound::Expr(a), Bound::Expr(b)) => a == b,
            (Bound::Decl(a), Bound::Decl(b)) => a == b,
            _ => false,
        }
    }
}

/// Bindings produced by one successful match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment<'a> {
    bindings: BTreeMap<PlaceholderKey, Bound<'a>>,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: PlaceholderKey) -> Option<Bound<'a>> {
        self.bindings.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlaceholderKey, Bound<'a>)> + '_ {
        self.bindings.iter().map(|(key, bound)| (*key, *bound))
    }

    /// Bind `key`, or check that an existing binding agrees. Returns `false`
    /// on disagreement.
    pub fn bind(&mut self, key: PlaceholderKey, value: Bound<'a>) -> bool {
        match self.bindings.get(&key) {
            Some(existing) => *existing == value,
            None => {
                self.bindings.insert(key, value);
                true
            }
        }
    }
}

/// A compiled pattern or replacement template.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Expr(Expr),
    /// One statement, or several held in a `Stmt::Sequence`.
    Stmt(Stmt),
}

impl Pattern {
    pub fn compile(text: &str) -> Result<Pattern, CompileError> {
        compile::compile(text)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Pattern::Expr(_) => "expression",
            Pattern::Stmt(Stmt::Sequence(_)) => "statement list",
            Pattern::Stmt(_) => "statement",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Expr(expr) => f.write_str(&JavaScriptWriter::emit_expr(expr)),
            Pattern::Stmt(stmt) => f.write_str(JavaScriptWriter::emit_stmt(stmt).trim_end()),
        }
    }
}

/// Knobs for the matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOptions {
    /// Statement kinds a `statementN.multiLine` placeholder accepts.
    pub multi_line_kinds: Vec<StmtKind>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            multi_line_kinds: StmtKind::MULTI_LINE.to_vec(),
        }
    }
}

impl MatchOptions {
    pub fn is_multi_line(&self, kind: StmtKind) -> bool {
        self.multi_line_kinds.contains(&kind)
    }
}
