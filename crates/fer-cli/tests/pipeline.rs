//! End-to-end classification and evaluation with synthetic models.

#![allow(clippy::unwrap_used, clippy::float_cmp, deprecated)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use fer_test_support::{fer2013_csv, SyntheticImageBuilder, SyntheticModelBuilder};
use predicates::prelude::*;
use serde_json::Value;

fn fer(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fer").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .current_dir(home);
    cmd
}

fn write_model(home: &Path, logits: [f32; 7]) -> PathBuf {
    let path = home.join("model.bin");
    fs::write(&path, SyntheticModelBuilder::bias_only(logits).to_bytes()).unwrap();
    path
}

fn write_faces(home: &Path) -> PathBuf {
    let dir = home.join("faces");
    fs::create_dir(&dir).unwrap();
    SyntheticImageBuilder::gradient(48, 48)
        .image
        .save(dir.join("a.png"))
        .unwrap();
    SyntheticImageBuilder::checkerboard(96, 64, 8)
        .image
        .save(dir.join("b.png"))
        .unwrap();
    SyntheticImageBuilder::solid_rgb(30, 30, [200, 120, 40])
        .image
        .save(dir.join("c.bmp"))
        .unwrap();
    dir
}

const SURPRISE: [f32; 7] = [0.0, 0.0, 0.0, 0.0, 0.0, 4.0, 0.0];

fn jsonl(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_classify_directory_jsonl() {
    let home = tempfile::tempdir().unwrap();
    let model = write_model(home.path(), SURPRISE);
    let faces = write_faces(home.path());

    let output = fer(home.path())
        .arg("classify")
        .arg("--model")
        .arg(&model)
        .arg(&faces)
        .output()
        .unwrap();
    assert!(output.status.success());

    let records = jsonl(&output.stdout);
    assert_eq!(records.len(), 3);
    for record in &records {
        assert_eq!(record["index"], 5);
        assert_eq!(record["label"], "Surprise");
        assert!(record["confidence"].as_f64().unwrap() > 0.8);
        assert!(record.get("probabilities").is_none());
        assert!(record["timestamp"].as_str().unwrap().ends_with('Z'));
    }
    assert!(records[0]["path"].as_str().unwrap().ends_with("a.png"));
    assert_eq!(records[1]["dimensions"]["width"], 96);
}

#[test]
fn test_classify_json_with_probabilities() {
    let home = tempfile::tempdir().unwrap();
    let model = write_model(home.path(), SURPRISE);
    let faces = write_faces(home.path());

    let output = fer(home.path())
        .args(["--format", "json", "--pretty", "--probabilities", "--model"])
        .arg(&model)
        .arg(faces.join("a.png"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = parsed.as_array().unwrap();
    assert_eq!(records.len(), 1);

    let probabilities = records[0]["probabilities"].as_object().unwrap();
    assert_eq!(probabilities.len(), 7);
    let total: f64 = probabilities.values().map(|v| v.as_f64().unwrap()).sum();
    assert!((total - 1.0).abs() < 1e-4);
    assert_eq!(
        probabilities["surprise"].as_f64(),
        records[0]["confidence"].as_f64()
    );
}

#[test]
fn test_corrupt_image_is_skipped() {
    let home = tempfile::tempdir().unwrap();
    let model = write_model(home.path(), SURPRISE);
    let faces = write_faces(home.path());
    fs::write(faces.join("broken.png"), b"not an image").unwrap();

    let output = fer(home.path())
        .arg("--model")
        .arg(&model)
        .arg(&faces)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(jsonl(&output.stdout).len(), 3);
    assert!(String::from_utf8_lossy(&output.stderr).contains("broken.png"));
}

#[test]
fn test_missing_model_fails() {
    let home = tempfile::tempdir().unwrap();
    let faces = write_faces(home.path());

    fer(home.path())
        .arg(&faces)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load model"));
}

#[test]
fn test_truncated_model_fails() {
    let home = tempfile::tempdir().unwrap();
    let faces = write_faces(home.path());
    let model = home.path().join("short.bin");
    fs::write(&model, [6u8, 0, 0, 0]).unwrap();

    fer(home.path())
        .arg("--model")
        .arg(&model)
        .arg(&faces)
        .assert()
        .failure()
        .stderr(predicate::str::contains("header"));
}

#[test]
fn test_evaluate_reports_accuracy() {
    let home = tempfile::tempdir().unwrap();
    let model = write_model(home.path(), SURPRISE);
    let dataset = home.path().join("fer2013.csv");
    let mut csv = fer2013_csv(&[
        (5, 10, "PublicTest"),
        (5, 200, "PublicTest"),
        (2, 30, "PublicTest"),
        (3, 40, "Training"),
    ]);
    csv.push_str("1,1 2 3,PublicTest\n");
    fs::write(&dataset, csv).unwrap();

    let output = fer(home.path())
        .arg("evaluate")
        .arg(&dataset)
        .arg("--model")
        .arg(&model)
        .args(["--usage", "PublicTest"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["samples"], 3);
    assert_eq!(report["correct"], 2);
    assert_eq!(report["skipped_rows"], 1);
    assert!((report["accuracy"].as_f64().unwrap() - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(report["classes"][5]["recall"], 1.0);
    assert_eq!(report["classes"][2]["recall"], 0.0);
    assert!(report["classes"][0]["recall"].is_null());
    assert_eq!(report["confusion"][2][5], 1);
}

#[test]
fn test_evaluate_limit() {
    let home = tempfile::tempdir().unwrap();
    let model = write_model(home.path(), SURPRISE);
    let dataset = home.path().join("fer2013.csv");
    fs::write(
        &dataset,
        fer2013_csv(&[(5, 1, "Training"), (5, 2, "Training"), (5, 3, "Training")]),
    )
    .unwrap();

    let output = fer(home.path())
        .arg("evaluate")
        .arg(&dataset)
        .arg("--model")
        .arg(&model)
        .args(["--limit", "2"])
        .output()
        .unwrap();

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["samples"], 2);
    assert_eq!(report["accuracy"], 1.0);
}
