//! Normalize command - rewrite JavaScript into canonical, readable form.

use super::rules::format_rules;
use crate::config::JsnormConfig;
use crate::{Normalized, Normalizer, write_output};
use anyhow::{Context, Result, bail};
use clap::Args;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// File extensions picked up when the input is a directory.
pub const EXTENSIONS: &[&str] = &["js", "mjs", "cjs"];

/// Normalize command arguments
#[derive(Args, Debug, Default)]
pub struct NormalizeArgs {
    /// Input file or directory, use - for stdin
    #[arg(required_unless_present = "list_rules")]
    pub input: Option<PathBuf>,

    /// Output file, or directory when the input is a directory (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum rewrite passes per file
    #[arg(long)]
    pub passes: Option<usize>,

    /// Skip a rule by name (repeatable)
    #[arg(long = "disable", value_name = "RULE")]
    pub disabled: Vec<String>,

    /// Print the normalized syntax tree as JSON instead of source
    #[arg(long)]
    pub dump_ir: bool,

    /// Print the rule table and exit
    #[arg(long)]
    pub list_rules: bool,
}

/// Run the normalize command. `root` is where project config is looked up.
pub fn run(args: &NormalizeArgs, root: &Path) -> Result<()> {
    let mut config = JsnormConfig::load(root)?;
    if let Some(passes) = args.passes {
        config.rewrite.max_passes = Some(passes);
    }
    for name in &args.disabled {
        if !config.rewrite.disabled.contains(name) {
            config.rewrite.disabled.push(name.clone());
        }
    }
    let normalizer = Normalizer::from_config(&config)?;

    if args.list_rules {
        print!("{}", format_rules(normalizer.rules()));
        return Ok(());
    }

    let Some(input) = &args.input else {
        bail!("no input given");
    };

    if input.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read stdin")?;
        let normalized = normalizer
            .normalize_source(&content)
            .context("failed to normalize stdin")?;
        return emit(&normalized, args);
    }

    if input.is_dir() {
        let Some(out_dir) = &args.output else {
            bail!("--output is required when the input is a directory");
        };
        let count = normalize_dir(&normalizer, input, out_dir, args.dump_ir)?;
        eprintln!(
            "Normalized {} files: {} -> {}",
            count,
            input.display(),
            out_dir.display()
        );
        return Ok(());
    }

    let normalized = normalize_file(&normalizer, input)?;
    emit(&normalized, args)
}

fn normalize_file(normalizer: &Normalizer, path: &Path) -> Result<Normalized> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let normalized = normalizer
        .normalize_source(&content)
        .with_context(|| format!("failed to normalize {}", path.display()))?;
    info!(
        path = %path.display(),
        passes = normalized.passes,
        changes = normalized.stats.total(),
        renames = normalized.stats.renames,
        "normalized file"
    );
    Ok(normalized)
}

/// Normalize every JavaScript file under `input` into the same relative path
/// under `out_dir`. Returns the number of files written.
fn normalize_dir(
    normalizer: &Normalizer,
    input: &Path,
    out_dir: &Path,
    dump_ir: bool,
) -> Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let is_source = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| EXTENSIONS.contains(&ext));
        if !entry.file_type().is_file() || !is_source {
            continue;
        }
        let relative = path.strip_prefix(input)?;
        let mut target = out_dir.join(relative);
        if dump_ir {
            target.set_extension("json");
        }
        let normalized = normalize_file(normalizer, path)?;
        write_output(&target, &render(&normalized, dump_ir)?)
            .with_context(|| format!("failed to write {}", target.display()))?;
        count += 1;
    }
    Ok(count)
}

fn render(normalized: &Normalized, dump_ir: bool) -> Result<String> {
    if dump_ir {
        let mut json = serde_json::to_string_pretty(&normalized.program)?;
        json.push('\n');
        Ok(json)
    } else {
        Ok(normalized.code.clone())
    }
}

fn emit(normalized: &Normalized, args: &NormalizeArgs) -> Result<()> {
    let text = render(normalized, args.dump_ir)?;
    match &args.output {
        Some(path) => {
            write_output(path, &text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "Normalized {} -> {} ({} changes)",
                args.input
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                path.display(),
                normalized.stats.total()
            );
        }
        None => print!("{}", text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(input: &Path, output: Option<PathBuf>) -> NormalizeArgs {
        NormalizeArgs {
            input: Some(input.to_path_buf()),
            output,
            ..Default::default()
        }
    }

    #[test]
    fn test_file_to_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.js");
        std::fs::write(&input, "a && b();").unwrap();
        let output = dir.path().join("out").join("in.js");

        run(&args(&input, Some(output.clone())), dir.path()).unwrap();
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "if (a) {\n  b();\n}\n"
        );
    }

    #[test]
    fn test_directory_is_mirrored() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("lib")).unwrap();
        std::fs::write(src.join("main.js"), "x = !1;").unwrap();
        std::fs::write(src.join("lib").join("util.cjs"), "for (;;) y();").unwrap();
        std::fs::write(src.join("README.md"), "not js").unwrap();
        let out = dir.path().join("dist");

        run(&args(&src, Some(out.clone())), dir.path()).unwrap();
        assert_eq!(
            std::fs::read_to_string(out.join("main.js")).unwrap(),
            "x = false;\n"
        );
        assert_eq!(
            std::fs::read_to_string(out.join("lib").join("util.cjs")).unwrap(),
            "for (;;) {\n  y();\n}\n"
        );
        assert!(!out.join("README.md").exists());
    }

    #[test]
    fn test_directory_needs_output() {
        let dir = TempDir::new().unwrap();
        let err = run(&args(dir.path(), None), dir.path()).unwrap_err();
        assert!(err.to_string().contains("--output"));
    }

    #[test]
    fn test_project_config_disables_rules() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".jsnorm")).unwrap();
        std::fs::write(
            dir.path().join(".jsnorm").join("config.toml"),
            "[rewrite]\ndisabled = [\"not-one\"]\n",
        )
        .unwrap();
        let input = dir.path().join("in.js");
        std::fs::write(&input, "x = !1;").unwrap();
        let output = dir.path().join("out.js");

        run(&args(&input, Some(output.clone())), dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "x = !1;\n");
    }
}
