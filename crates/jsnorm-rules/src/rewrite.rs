//! The rewrite driver: one depth-first pass applying a rule table.
//!
//! At each statement the driver first splits a comma-expression statement
//! into one statement per operand, otherwise it applies the first matching
//! rule and keeps walking into the replacement. On the way out of every
//! statement list it splices transient `Stmt::Sequence` containers into the
//! list; a container left as the lone body of an `if`, loop or label
//! becomes a block.
//!
//! A rule that replaces one function declaration with another (helper
//! deduplication) gets a collision-free name from the scope graph, and every
//! reference to the original binding follows it.

use crate::pattern::FillError;
use crate::rule::{Rule, RuleSet};
use jsnorm_scope::{ScopeGraph, analyze};
use jsnorm_syntax::ir::{Expr, Ident, Program, Stmt};
use jsnorm_syntax::visit_mut::{VisitMut, walk_expr_mut, walk_stmt_mut, walk_stmts_mut};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("rule `{rule}` produced an incomplete replacement: {source}")]
    Fill {
        rule: String,
        #[source]
        source: FillError,
    },

    #[error("no scope declares `{name}`")]
    ScopeNotFound { name: String },
}

/// What one pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Rule name to number of applications.
    pub applied: BTreeMap<String, usize>,
    pub sequences_split: usize,
    pub blocks_coerced: usize,
    /// Bindings renamed to avoid a collision.
    pub renames: usize,
}

impl RewriteStats {
    pub fn total(&self) -> usize {
        self.applied.values().sum::<usize>() + self.sequences_split + self.blocks_coerced
    }

    /// Whether the pass changed the tree at all.
    pub fn changed(&self) -> bool {
        self.total() > 0 || self.renames > 0
    }

    pub fn merge(&mut self, other: RewriteStats) {
        for (rule, count) in other.applied {
            *self.applied.entry(rule).or_default() += count;
        }
        self.sequences_split += other.sequences_split;
        self.blocks_coerced += other.blocks_coerced;
        self.renames += other.renames;
    }
}

pub struct Rewriter<'r> {
    rules: &'r RuleSet,
}

impl<'r> Rewriter<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// Rewrite `program` in place with one pass.
    ///
    /// On error the tree is left partially rewritten.
    pub fn rewrite(&self, program: &mut Program) -> Result<RewriteStats, RewriteError> {
        let mut pass = Pass {
            rules: self.rules,
            graph: analyze(program),
            stats: RewriteStats::default(),
            error: None,
        };
        pass.visit_program_mut(program);
        if let Some(error) = pass.error {
            return Err(error);
        }
        let renamed = pass.graph.apply_renames(program);
        if renamed > 0 {
            debug!(identifiers = renamed, "applied renames");
        }
        Ok(pass.stats)
    }
}

struct Pass<'r> {
    rules: &'r RuleSet,
    graph: ScopeGraph,
    stats: RewriteStats,
    error: Option<RewriteError>,
}

impl Pass<'_> {
    fn record(&mut self, rule: &Rule) {
        debug!(rule = rule.name(), "applied rule");
        *self.stats.applied.entry(rule.name().to_string()).or_default() += 1;
    }

    fn fail(&mut self, error: RewriteError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Rules spanning several statements, tried at each list position.
    fn apply_windows(&mut self, stmts: &mut Vec<Stmt>) {
        let rules = self.rules;
        let options = rules.options();
        let mut i = 0;
        'positions: while i < stmts.len() {
            for rule in rules.rules() {
                let Some(len) = rule.window() else {
                    continue;
                };
                if i + len > stmts.len() {
                    continue;
                }
                match rule.rewrite_stmts(&stmts[i..i + len], options) {
                    None => continue,
                    Some(Err(source)) => {
                        return self.fail(RewriteError::Fill {
                            rule: rule.name().to_string(),
                            source,
                        });
                    }
                    Some(Ok(replacement)) => {
                        let replacement = match replacement {
                            Stmt::Sequence(stmts) => stmts,
                            stmt => vec![stmt],
                        };
                        if replacement[..] == stmts[i..i + len] {
                            break;
                        }
                        self.record(rule);
                        let count = replacement.len();
                        stmts.splice(i..i + len, replacement);
                        i += count;
                        continue 'positions;
                    }
                }
            }
            i += 1;
        }
    }

    /// Apply the first statement rule that matches `stmt`.
    fn apply_stmt_rules(&mut self, stmt: &mut Stmt) {
        let rules = self.rules;
        for rule in rules.rules() {
            let replacement = match rule.rewrite_stmt(stmt, rules.options()) {
                None => continue,
                Some(Ok(replacement)) => replacement,
                Some(Err(source)) => {
                    return self.fail(RewriteError::Fill {
                        rule: rule.name().to_string(),
                        source,
                    });
                }
            };
            let mut replacement = replacement;
            if let Err(error) = self.disambiguate(stmt, &mut replacement) {
                return self.fail(error);
            }
            if replacement != *stmt {
                self.record(rule);
                *stmt = replacement;
            }
            return;
        }
    }

    fn apply_expr_rules(&mut self, expr: &mut Expr) {
        let rules = self.rules;
        for rule in rules.rules() {
            match rule.rewrite_expr(expr, rules.options()) {
                None => continue,
                Some(Ok(replacement)) => {
                    if replacement != *expr {
                        self.record(rule);
                        *expr = replacement;
                    }
                }
                Some(Err(source)) => self.fail(RewriteError::Fill {
                    rule: rule.name().to_string(),
                    source,
                }),
            }
            return;
        }
    }

    /// Give a replacement function declaration a name nothing else in scope
    /// uses, renaming the binding it replaces to match.
    fn disambiguate(&mut self, original: &Stmt, replacement: &mut Stmt) -> Result<(), RewriteError> {
        let (Stmt::Function(original), Stmt::Function(replacement)) = (original, replacement) else {
            return Ok(());
        };
        let (Some(declared), Some(proposed)) = (&original.name, &replacement.name) else {
            return Ok(());
        };
        let Some(proposed) = proposed.name().map(str::to_string) else {
            return Ok(());
        };

        let id = declared.id();
        let binding = id
            .and_then(|id| self.graph.binding_at(id))
            .ok_or_else(|| RewriteError::ScopeNotFound {
                name: declared.name().unwrap_or_default().to_string(),
            })?;

        let name = self.graph.free_name(binding, &proposed);
        if name != self.graph.binding(binding).name {
            self.graph.rename(binding, name.clone());
            self.stats.renames += 1;
        }
        replacement.name = Some(match id {
            Some(id) => Ident::with_id(name, id),
            None => Ident::new(name),
        });
        Ok(())
    }
}

/// Splice every `Stmt::Sequence` in `stmts` into the list itself.
fn flatten(stmts: &mut Vec<Stmt>) {
    let mut i = 0;
    while i < stmts.len() {
        if let Stmt::Sequence(inner) = &mut stmts[i] {
            let inner = std::mem::take(inner);
            // The spliced statements may be containers too; look at `i` again.
            stmts.splice(i..=i, inner);
        } else {
            i += 1;
        }
    }
}

impl VisitMut for Pass<'_> {
    fn visit_stmts_mut(&mut self, stmts: &mut Vec<Stmt>) {
        if self.error.is_some() {
            return;
        }
        self.apply_windows(stmts);
        walk_stmts_mut(self, stmts);
        flatten(stmts);
    }

    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) {
        if self.error.is_some() {
            return;
        }
        if let Stmt::Expr(Expr::Sequence(exprs)) = stmt {
            let exprs = std::mem::take(exprs);
            debug!(count = exprs.len(), "split comma sequence");
            *stmt = Stmt::Sequence(exprs.into_iter().map(Stmt::Expr).collect());
            self.stats.sequences_split += 1;
        } else {
            self.apply_stmt_rules(stmt);
        }
        walk_stmt_mut(self, stmt);
    }

    fn visit_body_mut(&mut self, body: &mut Stmt) {
        self.visit_stmt_mut(body);
        if let Stmt::Sequence(stmts) = body {
            let stmts = std::mem::take(stmts);
            *body = Stmt::Block(stmts);
            self.stats.blocks_coerced += 1;
        }
    }

    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        if self.error.is_some() {
            return;
        }
        self.apply_expr_rules(expr);
        walk_expr_mut(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_nested_containers() {
        let a = Stmt::Expr(Expr::ident("a"));
        let b = Stmt::Expr(Expr::ident("b"));
        let c = Stmt::Expr(Expr::ident("c"));
        let mut stmts = vec![
            a.clone(),
            Stmt::Sequence(vec![Stmt::Sequence(vec![b.clone()]), Stmt::Sequence(vec![])]),
            c.clone(),
        ];
        flatten(&mut stmts);
        assert_eq!(stmts, vec![a, b, c]);
    }

    #[test]
    fn test_stats_merge() {
        let mut total = RewriteStats::default();
        let mut pass = RewriteStats::default();
        pass.applied.insert("if-braces".to_string(), 2);
        pass.sequences_split = 1;
        total.merge(pass.clone());
        total.merge(pass);
        assert_eq!(total.applied["if-braces"], 4);
        assert_eq!(total.total(), 6);
        assert!(total.changed());
        assert!(!RewriteStats::default().changed());
    }
}
