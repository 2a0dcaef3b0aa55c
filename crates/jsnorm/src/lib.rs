//! jsnorm: normalize minified and machine-generated JavaScript.
//!
//! [`Normalizer`] ties the pieces together: it reads source with
//! `jsnorm-syntax`, runs the `jsnorm-rules` driver until a pass changes
//! nothing (or a pass limit is hit), and writes the result back out.
//!
//! ```
//! use jsnorm::Normalizer;
//!
//! let normalizer = Normalizer::builtin().unwrap();
//! let out = normalizer.normalize_source("x && y(), z = !0;").unwrap();
//! assert_eq!(out.code, "if (x) {\n  y();\n}\nz = true;\n");
//! ```

pub mod commands;
pub mod config;

use config::JsnormConfig;
use jsnorm_rules::{MatchOptions, RewriteError, RewriteStats, Rewriter, Rule, RuleError, RuleSet};
use jsnorm_syntax::{JavaScriptWriter, Program, ReadError, read_javascript};
use std::path::Path;

/// Passes per file when the configuration does not say otherwise.
pub const DEFAULT_MAX_PASSES: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

/// Result of normalizing one source text.
#[derive(Debug)]
pub struct Normalized {
    pub program: Program,
    pub code: String,
    pub stats: RewriteStats,
    /// Driver passes run, including the final one that changed nothing.
    pub passes: usize,
}

pub struct Normalizer {
    rules: RuleSet,
    max_passes: usize,
}

impl Normalizer {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    /// The built-in rule table with default settings.
    pub fn builtin() -> Result<Self, RuleError> {
        Ok(Self::new(RuleSet::builtin()?))
    }

    /// Built-in rules adjusted by `config`: disabled rules removed, custom
    /// rules appended, matcher options applied.
    pub fn from_config(config: &JsnormConfig) -> Result<Self, RuleError> {
        let mut rules = RuleSet::builtin()?;
        for spec in &config.rules {
            rules.push(Rule::from_spec(spec)?)?;
        }
        for name in &config.rewrite.disabled {
            rules.disable(name)?;
        }
        if let Some(kinds) = &config.rewrite.multi_line_kinds {
            rules = rules.with_options(MatchOptions {
                multi_line_kinds: kinds.clone(),
            });
        }
        let max_passes = config.rewrite.max_passes.unwrap_or(DEFAULT_MAX_PASSES);
        Ok(Self::new(rules).with_max_passes(max_passes))
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    /// Rewrite `source` until a pass changes nothing or the pass limit is
    /// reached.
    pub fn normalize_source(&self, source: &str) -> Result<Normalized, NormalizeError> {
        let rewriter = Rewriter::new(&self.rules);
        let mut program = read_javascript(source)?;
        let mut stats = RewriteStats::default();
        let mut passes = 0;

        while passes < self.max_passes {
            let pass = rewriter.rewrite(&mut program)?;
            passes += 1;
            tracing::debug!(pass = passes, changes = pass.total(), "rewrite pass");
            if !pass.changed() {
                break;
            }
            stats.merge(pass);
            // Rewritten nodes carry no source ids; re-read so the next
            // pass sees a fully resolved scope graph.
            program = read_javascript(&JavaScriptWriter::emit(&program))?;
        }

        let code = JavaScriptWriter::emit(&program);
        Ok(Normalized {
            program,
            code,
            stats,
            passes,
        })
    }
}

/// Write `text` to `path`, creating missing parent directories first.
pub fn write_output(path: &Path, text: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reaches_fixed_point_across_passes() {
        // `!!0` needs two passes: `!true`, then nothing more applies.
        let normalizer = Normalizer::builtin().unwrap();
        let out = normalizer.normalize_source("x = !!0;").unwrap();
        assert_eq!(out.code, "x = !true;\n");
        assert_eq!(out.passes, 2);
    }

    #[test]
    fn test_pass_limit() {
        let normalizer = Normalizer::builtin().unwrap().with_max_passes(1);
        let out = normalizer.normalize_source("a, b;").unwrap();
        assert_eq!(out.passes, 1);
        assert_eq!(out.stats.sequences_split, 1);
    }

    #[test]
    fn test_syntax_error() {
        let normalizer = Normalizer::builtin().unwrap();
        assert!(matches!(
            normalizer.normalize_source("if ("),
            Err(NormalizeError::Read(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config: JsnormConfig = toml::from_str(
            r#"
[rewrite]
max_passes = 0
disabled = ["not-zero"]

[[rules]]
name = "double-not"
pattern = "!!expression1"
replacement = "Boolean(expression1)"
"#,
        )
        .unwrap();
        let normalizer = Normalizer::from_config(&config).unwrap();
        assert_eq!(normalizer.max_passes(), 1);
        assert!(normalizer.rules().get("not-zero").is_none());

        let out = normalizer.normalize_source("f(!!x, !0);").unwrap();
        assert_eq!(out.code, "f(Boolean(x), !0);\n");
    }

    #[test]
    fn test_from_config_unknown_disabled_rule() {
        let mut config = JsnormConfig::default();
        config.rewrite.disabled.push("no-such-rule".to_string());
        assert!(matches!(
            Normalizer::from_config(&config),
            Err(RuleError::Unknown(_))
        ));
    }

    #[test]
    fn test_write_output_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("out.js");
        write_output(&path, "x;\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x;\n");
    }
}
