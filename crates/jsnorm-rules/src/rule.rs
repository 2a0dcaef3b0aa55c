//! Rewrite rules and ordered rule tables.

use crate::builtin::BUILTIN_RULES;
use crate::pattern::{
    CompileError, FillError, MatchOptions, Pattern, fill_expr, fill_stmt, match_expr, match_stmt,
    match_stmts,
};
use jsnorm_syntax::ir::{Expr, Stmt};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("rule `{name}`: bad pattern: {source}")]
    Pattern {
        name: String,
        #[source]
        source: CompileError,
    },

    #[error("rule `{name}`: bad replacement: {source}")]
    Replacement {
        name: String,
        #[source]
        source: CompileError,
    },

    #[error("rule `{name}`: {pattern} pattern cannot be replaced by {replacement}")]
    ShapeMismatch {
        name: String,
        pattern: &'static str,
        replacement: &'static str,
    },

    #[error("duplicate rule `{0}`")]
    Duplicate(String),

    #[error("unknown rule `{0}`")]
    Unknown(String),
}

/// A rule as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    pub pattern: String,
    pub replacement: String,
}

/// A compiled pattern and the template that replaces what it matches.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    pattern: Pattern,
    replacement: Pattern,
}

impl Rule {
    pub fn new(name: &str, pattern: &str, replacement: &str) -> Result<Self, RuleError> {
        let compiled = Pattern::compile(pattern).map_err(|source| RuleError::Pattern {
            name: name.to_string(),
            source,
        })?;
        let template = Pattern::compile(replacement).map_err(|source| RuleError::Replacement {
            name: name.to_string(),
            source,
        })?;
        Self::from_patterns(name, compiled, template)
    }

    pub fn from_spec(spec: &RuleSpec) -> Result<Self, RuleError> {
        Self::new(&spec.name, &spec.pattern, &spec.replacement)
    }

    /// Expression patterns need expression replacements; statement patterns
    /// (single or several) take any statement replacement.
    pub fn from_patterns(
        name: &str,
        pattern: Pattern,
        replacement: Pattern,
    ) -> Result<Self, RuleError> {
        if matches!(pattern, Pattern::Expr(_)) != matches!(replacement, Pattern::Expr(_)) {
            return Err(RuleError::ShapeMismatch {
                name: name.to_string(),
                pattern: pattern.kind_name(),
                replacement: replacement.kind_name(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            pattern,
            replacement,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn replacement(&self) -> &Pattern {
        &self.replacement
    }

    /// Number of consecutive statements the pattern spans, for
    /// statement-list patterns.
    pub fn window(&self) -> Option<usize> {
        match &self.pattern {
            Pattern::Stmt(Stmt::Sequence(patterns)) => Some(patterns.len()),
            _ => None,
        }
    }

    /// `None` when the rule does not apply to `node`.
    pub fn rewrite_stmt(
        &self,
        node: &Stmt,
        options: &MatchOptions,
    ) -> Option<Result<Stmt, FillError>> {
        let (Pattern::Stmt(pattern), Pattern::Stmt(template)) = (&self.pattern, &self.replacement)
        else {
            return None;
        };
        if matches!(pattern, Stmt::Sequence(_)) {
            return None;
        }
        let env = match_stmt(pattern, node, options)?;
        Some(fill_stmt(template, &env))
    }

    /// Apply a statement-list pattern to exactly [`window`](Self::window)
    /// statements.
    pub fn rewrite_stmts(
        &self,
        nodes: &[Stmt],
        options: &MatchOptions,
    ) -> Option<Result<Stmt, FillError>> {
        let (Pattern::Stmt(Stmt::Sequence(patterns)), Pattern::Stmt(template)) =
            (&self.pattern, &self.replacement)
        else {
            return None;
        };
        let env = match_stmts(patterns, nodes, options)?;
        Some(fill_stmt(template, &env))
    }

    pub fn rewrite_expr(
        &self,
        node: &Expr,
        options: &MatchOptions,
    ) -> Option<Result<Expr, FillError>> {
        let (Pattern::Expr(pattern), Pattern::Expr(template)) = (&self.pattern, &self.replacement)
        else {
            return None;
        };
        let env = match_expr(pattern, node, options)?;
        Some(fill_expr(template, &env))
    }
}

/// Ordered rule table. The first rule that matches a node wins.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    options: MatchOptions,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rules jsnorm ships with, in priority order.
    pub fn builtin() -> Result<Self, RuleError> {
        let mut set = Self::new();
        for (name, pattern, replacement) in BUILTIN_RULES {
            set.push(Rule::new(name, pattern, replacement)?)?;
        }
        Ok(set)
    }

    /// Append a rule after all existing ones.
    pub fn push(&mut self, rule: Rule) -> Result<(), RuleError> {
        if self.get(rule.name()).is_some() {
            return Err(RuleError::Duplicate(rule.name));
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn disable(&mut self, name: &str) -> Result<(), RuleError> {
        let before = self.rules.len();
        self.rules.retain(|rule| rule.name() != name);
        if self.rules.len() == before {
            return Err(RuleError::Unknown(name.to_string()));
        }
        Ok(())
    }

    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name() == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_rule_set_is_shareable() {
        assert_send_sync::<RuleSet>();
    }

    #[test]
    fn test_shape_mismatch() {
        let err = Rule::new("bad", "!!expression1", "f(expression1);").unwrap_err();
        assert!(matches!(err, RuleError::ShapeMismatch { .. }));
        assert_eq!(
            err.to_string(),
            "rule `bad`: expression pattern cannot be replaced by statement"
        );
    }

    #[test]
    fn test_bad_pattern_names_rule() {
        let err = Rule::new("typo", "expression1.orDeclarations", "expression1").unwrap_err();
        assert!(matches!(err, RuleError::Pattern { ref name, .. } if name == "typo"));
    }

    #[test]
    fn test_push_and_disable() {
        let mut set = RuleSet::new();
        set.push(Rule::new("a", "!1", "false").unwrap()).unwrap();
        assert!(matches!(
            set.push(Rule::new("a", "!0", "true").unwrap()),
            Err(RuleError::Duplicate(_))
        ));
        assert!(matches!(set.disable("b"), Err(RuleError::Unknown(_))));
        set.disable("a").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_rule_spec_from_toml() {
        let spec: RuleSpec = toml::from_str(
            r#"
            name = "double-not"
            pattern = "!!expression1"
            replacement = "Boolean(expression1)"
            "#,
        )
        .unwrap();
        let rule = Rule::from_spec(&spec).unwrap();
        assert_eq!(rule.pattern().to_string(), "!!expression1");
        assert_eq!(rule.replacement().to_string(), "Boolean(expression1)");
    }
}
