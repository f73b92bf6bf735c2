//! CLI argument validation tests.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

/// `fer` with config and data directories isolated under `home`.
fn fer(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fer").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .current_dir(home);
    cmd
}

#[test]
fn test_missing_path_shows_error() {
    let home = tempfile::tempdir().unwrap();
    fer(home.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No paths specified"));
}

#[test]
fn test_nonexistent_path_warns_but_continues() {
    let home = tempfile::tempdir().unwrap();
    fer(home.path())
        .arg("/nonexistent/path/to/face.png")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_empty_directory_never_loads_model() {
    let home = tempfile::tempdir().unwrap();
    let faces = home.path().join("faces");
    std::fs::create_dir(&faces).unwrap();

    // No model file exists anywhere; an empty batch must not need it
    fer(home.path())
        .arg("classify")
        .arg(&faces)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_invalid_format_rejected() {
    let home = tempfile::tempdir().unwrap();
    fer(home.path())
        .args(["--format", "xml", "face.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("json").or(predicate::str::contains("jsonl")));
}

#[test]
fn test_evaluate_requires_dataset() {
    let home = tempfile::tempdir().unwrap();
    fer(home.path())
        .arg("evaluate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATASET"));
}

#[test]
fn test_evaluate_rejects_zero_limit() {
    let home = tempfile::tempdir().unwrap();
    fer(home.path())
        .args(["evaluate", "data.csv", "--limit", "0"])
        .assert()
        .failure();
}

#[test]
fn test_help_lists_subcommands() {
    let home = tempfile::tempdir().unwrap();
    fer(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("classify")
                .and(predicate::str::contains("evaluate"))
                .and(predicate::str::contains("model")),
        );
}

#[test]
fn test_model_path_uses_data_dir() {
    let home = tempfile::tempdir().unwrap();
    fer(home.path())
        .args(["model", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fer/models/fer_model.bin"));
}
