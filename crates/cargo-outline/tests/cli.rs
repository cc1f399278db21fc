//! End-to-end tests for the `cargo-outline` binary.

#![expect(clippy::expect_used, reason = "tests drive the binary with fixture files")]

use assert_cmd::Command;
use rstest::{fixture, rstest};
use tempfile::TempDir;

const CART: &str = "\
Feature: Cart
  Examples:
    | currency |
    | EUR      |
    | USD      |

  Scenario Outline: Add items
    Given a cart with <count> items
    Then the total is shown in <currency>

    Examples: Vertical
    | count | 1 | 5 |
";

const BROKEN: &str = "\
Feature: Broken
  Given a step outside any scenario
";

#[fixture]
fn features() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    std::fs::write(dir.path().join("cart.feature"), CART).expect("write cart");
    dir
}

fn outline() -> Command {
    Command::cargo_bin("cargo-outline").expect("binary exists")
}

#[rstest]
fn check_accepts_valid_documents(features: TempDir) {
    let output = outline()
        .args(["outline", "check"])
        .arg(features.path())
        .output()
        .expect("runs");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.contains("cart.feature (1 scenario(s))"));
    assert!(stdout.ends_with("1 feature file(s) checked, 0 failed\n"));
}

#[rstest]
fn check_fails_on_structural_errors(features: TempDir) {
    std::fs::write(features.path().join("broken.feature"), BROKEN).expect("write broken");
    let output = outline()
        .arg("check")
        .arg(features.path())
        .output()
        .expect("runs");
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.contains("step definition outside of a Scenario or a Background"));
    assert!(stdout.contains("line number: 2"));
}

#[rstest]
fn params_prints_every_instance(features: TempDir) {
    let output = outline()
        .args(["params", "--scenario", "Add"])
        .arg(features.path().join("cart.feature"))
        .output()
        .expect("runs");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(
        stdout,
        "Add items (line 7): 4 instance(s)\n\
         \x20 count=1, currency=EUR\n\
         \x20 count=1, currency=USD\n\
         \x20 count=5, currency=EUR\n\
         \x20 count=5, currency=USD\n"
    );
}

#[rstest]
fn parse_dumps_json(features: TempDir) {
    let output = outline()
        .arg("parse")
        .arg(features.path().join("cart.feature"))
        .output()
        .expect("runs");
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let rel_path = parsed.pointer("/0/rel_path").and_then(serde_json::Value::as_str);
    assert!(rel_path.is_some_and(|p| p.ends_with("cart.feature")));
}

#[rstest]
fn invalid_log_level_is_a_configuration_error(features: TempDir) {
    let output = outline()
        .env("BDD_OUTLINE_LOG_LEVEL", "chatty")
        .arg("check")
        .arg(features.path())
        .output()
        .expect("runs");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stderr.contains("unknown log level 'chatty'"));
}

#[rstest]
fn missing_files_are_reported_on_stderr(features: TempDir) {
    let output = outline()
        .arg("parse")
        .arg(features.path().join("absent.feature"))
        .output()
        .expect("runs");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stderr.contains("no such feature file or directory"));
}
