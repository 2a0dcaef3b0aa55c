//! Configuration for jsnorm.
//!
//! Loads config from:
//! 1. Global: ~/.config/jsnorm/config.toml
//! 2. Per-project: .jsnorm/config.toml (overrides global)
//!
//! Example config.toml:
//! ```toml
//! [rewrite]
//! max_passes = 8
//! disabled = ["void-zero"]
//! multi_line_kinds = ["if", "for", "while"]
//!
//! [[rules]]
//! name = "double-not"
//! pattern = "!!expression1"
//! replacement = "Boolean(expression1)"
//! ```

use jsnorm_rules::RuleSpec;
use jsnorm_syntax::StmtKind;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Rewrite driver configuration.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RewriteConfig {
    /// Upper bound on driver passes per file.
    pub max_passes: Option<usize>,
    /// Built-in or custom rules to skip, by name.
    pub disabled: Vec<String>,
    /// Statement kinds `statementN.multiLine` accepts.
    pub multi_line_kinds: Option<Vec<StmtKind>>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct JsnormConfig {
    pub rewrite: RewriteConfig,
    /// Extra rules, tried after the built-in ones.
    pub rules: Vec<RuleSpec>,
}

impl JsnormConfig {
    /// Load configuration for a project.
    ///
    /// Loads global config from ~/.config/jsnorm/config.toml,
    /// then merges with per-project config from .jsnorm/config.toml.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::load_file(&global_path)? {
                config = config.merge(global);
            }
        }

        let project_path = root.join(".jsnorm").join("config.toml");
        if let Some(project) = Self::load_file(&project_path)? {
            config = config.merge(project);
        }

        Ok(config)
    }

    /// Get the global config path.
    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("jsnorm").join("config.toml"))
    }

    /// Load config from a file path. A missing file is not an error.
    pub fn load_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Merge another config into this one.
    /// Scalars set in `other` win; lists accumulate.
    fn merge(self, other: Self) -> Self {
        let mut disabled = self.rewrite.disabled;
        for name in other.rewrite.disabled {
            if !disabled.contains(&name) {
                disabled.push(name);
            }
        }
        let mut rules = self.rules;
        rules.extend(other.rules);

        Self {
            rewrite: RewriteConfig {
                max_passes: other.rewrite.max_passes.or(self.rewrite.max_passes),
                disabled,
                multi_line_kinds: other
                    .rewrite
                    .multi_line_kinds
                    .or(self.rewrite.multi_line_kinds),
            },
            rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = JsnormConfig::default();
        assert_eq!(config.rewrite.max_passes, None);
        assert!(config.rewrite.disabled.is_empty());
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        let jsnorm_dir = dir.path().join(".jsnorm");
        std::fs::create_dir_all(&jsnorm_dir).unwrap();

        let config_path = jsnorm_dir.join("config.toml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
[rewrite]
max_passes = 3
disabled = ["void-zero"]
multi_line_kinds = ["if", "for-in", "do-while"]

[[rules]]
name = "double-not"
pattern = "!!expression1"
replacement = "Boolean(expression1)"
"#
        )
        .unwrap();

        let config = JsnormConfig::load_file(&config_path).unwrap().unwrap();
        assert_eq!(config.rewrite.max_passes, Some(3));
        assert_eq!(config.rewrite.disabled, vec!["void-zero".to_string()]);
        assert_eq!(
            config.rewrite.multi_line_kinds,
            Some(vec![StmtKind::If, StmtKind::ForIn, StmtKind::DoWhile])
        );
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].name, "double-not");
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(JsnormConfig::load_file(&missing).unwrap().is_none());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[rewrite]\nmax_passes = \"many\"\n").unwrap();
        let err = JsnormConfig::load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_merge_project_over_global() {
        let global: JsnormConfig = toml::from_str(
            r#"
[rewrite]
max_passes = 2
disabled = ["not-one"]
"#,
        )
        .unwrap();
        let project: JsnormConfig = toml::from_str(
            r#"
[rewrite]
disabled = ["not-zero", "not-one"]
"#,
        )
        .unwrap();

        let merged = JsnormConfig::default().merge(global).merge(project);
        assert_eq!(merged.rewrite.max_passes, Some(2));
        assert_eq!(
            merged.rewrite.disabled,
            vec!["not-one".to_string(), "not-zero".to_string()]
        );
    }
}
