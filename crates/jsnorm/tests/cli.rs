//! Tests for the `jsnorm` binary.

use assert_cmd::Command;
use tempfile::TempDir;

/// A command isolated from any user or project configuration.
fn jsnorm(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("jsnorm").unwrap();
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config-home"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn stdin_to_stdout() {
    let dir = TempDir::new().unwrap();
    let output = jsnorm(&dir)
        .arg("-")
        .write_stdin("if (cond) if (x) y;\n")
        .output()
        .unwrap();
    assert!(output.status.success());
    insta::assert_snapshot!(String::from_utf8(output.stdout).unwrap(), @r"
if (cond) {
  if (x) {
    y;
  }
}
");
}

#[test]
fn file_to_output_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("min.js"), "a(),b(),!0&&c();").unwrap();

    jsnorm(&dir)
        .args(["min.js", "-o", "out/pretty.js"])
        .assert()
        .success();

    let written = std::fs::read_to_string(dir.path().join("out").join("pretty.js")).unwrap();
    insta::assert_snapshot!(written, @r"
a();
b();
if (true) {
  c();
}
");
}

#[test]
fn disable_flag_skips_rule() {
    let dir = TempDir::new().unwrap();
    jsnorm(&dir)
        .args(["-", "--disable", "void-zero"])
        .write_stdin("x = void 0;")
        .assert()
        .success()
        .stdout("x = void 0;\n");
}

#[test]
fn unknown_rule_is_an_error() {
    let dir = TempDir::new().unwrap();
    let output = jsnorm(&dir)
        .args(["-", "--disable", "no-such-rule"])
        .write_stdin("x;")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown rule `no-such-rule`"));
}

#[test]
fn syntax_error_fails() {
    let dir = TempDir::new().unwrap();
    let output = jsnorm(&dir)
        .arg("-")
        .write_stdin("function (")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to normalize stdin"));
}

#[test]
fn list_rules_needs_no_input() {
    let dir = TempDir::new().unwrap();
    let output = jsnorm(&dir).arg("--list-rules").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("not-one\n    !1\n => false\n"));
    assert!(stdout.contains("interop-require-default\n"));
}

#[test]
fn project_config_adds_rules() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".jsnorm")).unwrap();
    std::fs::write(
        dir.path().join(".jsnorm").join("config.toml"),
        r#"
[[rules]]
name = "double-not"
pattern = "!!expression1"
replacement = "Boolean(expression1)"
"#,
    )
    .unwrap();

    jsnorm(&dir)
        .arg("-")
        .write_stdin("ok = !!flags.ready;")
        .assert()
        .success()
        .stdout("ok = Boolean(flags.ready);\n");
}

#[test]
fn dump_ir_prints_json() {
    let dir = TempDir::new().unwrap();
    let output = jsnorm(&dir)
        .args(["-", "--dump-ir"])
        .write_stdin("!1;")
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json["body"][0]["Expr"]["Literal"]["Bool"],
        serde_json::Value::Bool(false)
    );
}
