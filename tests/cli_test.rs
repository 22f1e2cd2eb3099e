//! Integration tests for the command-line interface.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_case(temp: &TempDir, yaml: &str) -> PathBuf {
    let path = temp.path().join("case.yml");
    fs::write(&path, yaml).unwrap();
    path
}

fn stagehand() -> Command {
    let mut cmd = Command::new(cargo_bin("stagehand"));
    cmd.env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

const PASSING_CASE: &str = r#"
name: greeting
setup:
  - type: context_set
    key: who
    value: world
execution:
  - type: context_assert
    key: who
    expected: world
cleanup:
  - type: context_remove
    key: who
"#;

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    stagehand()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("staged integration test runner"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    stagehand()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn run_passing_case_exits_zero() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let path = write_case(&temp, PASSING_CASE);

    stagehand()
        .arg("run")
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Test 'greeting' PASSED"));
    Ok(())
}

#[test]
fn run_failing_case_exits_one() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let path = write_case(
        &temp,
        r#"
name: mismatch
execution:
  - type: context_assert
    key: missing
    expected: anything
"#,
    );

    stagehand()
        .arg("run")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Test 'mismatch' FAILED"));
    Ok(())
}

#[test]
fn run_cleans_up_files_after_failure() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let artifact = temp.path().join("artifact.txt");
    let yaml = format!(
        r#"
name: cleanup_always
setup:
  - type: file_write
    path: "{path}"
    content: scratch
execution:
  - type: shell
    command: "exit 3"
cleanup:
  - type: file_delete
    path: "{path}"
"#,
        path = artifact.display()
    );
    let path = write_case(&temp, &yaml);

    stagehand().arg("run").arg(&path).assert().code(1);

    assert!(!artifact.exists());
    Ok(())
}

#[cfg(unix)]
#[test]
fn run_concurrent_shell_steps_with_validator() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let path = write_case(
        &temp,
        r#"
name: parallel
execution:
  - type: shell
    run_concurrently: true
    command: "sleep 0.1; echo order 42 created"
    validator: { type: contains, text: created }
    context_loader: { type: regex, pattern: "order (\\d+)", key: order_id }
  - type: shell
    run_concurrently: true
    command: "echo second"
cleanup:
  - type: context_assert
    key: order_id
    expected: "42"
"#,
    );

    stagehand()
        .arg("run")
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Test 'parallel' PASSED"));
    Ok(())
}

#[test]
fn quiet_hides_progress() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let path = write_case(&temp, PASSING_CASE);

    stagehand()
        .args(["--quiet", "run"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("PASSED").not());
    Ok(())
}

#[test]
fn validate_accepts_good_case() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let path = write_case(&temp, PASSING_CASE);

    stagehand()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Test 'greeting' is valid (3 steps)"));
    Ok(())
}

#[test]
fn validate_rejects_bad_step_config() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let path = write_case(
        &temp,
        r#"
name: broken
cleanup:
  - type: file_delete
    path: ""
"#,
    );

    stagehand()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("path must not be empty"));
    Ok(())
}

#[test]
fn unknown_step_type_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let path = write_case(
        &temp,
        r#"
name: unknown
execution:
  - type: teleport
"#,
    );

    stagehand()
        .arg("run")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown step type: teleport"));
    Ok(())
}

#[test]
fn missing_file_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;

    stagehand()
        .arg("run")
        .arg(temp.path().join("nope.yml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Test case not found"));
    Ok(())
}

#[test]
fn list_steps_shows_builtins() -> Result<(), Box<dyn std::error::Error>> {
    stagehand()
        .arg("list-steps")
        .assert()
        .success()
        .stdout(predicate::str::contains("shell"))
        .stdout(predicate::str::contains("file_write"))
        .stdout(predicate::str::contains("Validators:"));
    Ok(())
}
