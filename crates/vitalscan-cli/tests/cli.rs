use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn vitalscan() -> Command {
    Command::cargo_bin("vitalscan").unwrap()
}

/// Empty config file so the user's own config never leaks into a test.
fn config_in(dir: &Path) -> PathBuf {
    let path = dir.join("config.json");
    fs::write(&path, "{}").unwrap();
    path
}

#[test]
fn test_template_to_stdout() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());

    vitalscan()
        .arg("-c")
        .arg(&config)
        .args(["template", "--domain", "thyroid"])
        .assert()
        .success()
        .stdout("age,TSH,T3,T4,TT4,T4U,FTI\n30,2.5,3,7.5,80,30,300\n");
}

#[test]
fn test_template_to_file_then_extract() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    let template = dir.path().join("bp.csv");

    vitalscan()
        .arg("-c")
        .arg(&config)
        .args(["template", "-d", "bp", "-o"])
        .arg(&template)
        .assert()
        .success();

    vitalscan()
        .arg("-c")
        .arg(&config)
        .arg("extract")
        .arg(&template)
        .args(["--domain", "blood_pressure"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"systolic\": 120.0"))
        .stderr(predicate::str::contains("Extracted 8 values"));
}

#[test]
fn test_extract_csv_json() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    let report = dir.path().join("thyroid.csv");
    fs::write(&report, "Age,TSH,T3,T4,TT4,FTI\n45,3.2,2.8,8.1,95,110\n").unwrap();

    vitalscan()
        .arg("-c")
        .arg(&config)
        .arg("extract")
        .arg(&report)
        .args(["--domain", "thyroid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"TSH\": 3.2"))
        .stdout(predicate::str::contains("\"source\": \"csv\""))
        .stderr(predicate::str::contains("Extracted 6 values"));
}

#[test]
fn test_extract_below_threshold() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    let report = dir.path().join("short.csv");
    fs::write(&report, "age,tsh\n40,9\n").unwrap();

    vitalscan()
        .arg("-c")
        .arg(&config)
        .arg("extract")
        .arg(&report)
        .args(["--domain", "thyroid", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile: Thyroid"))
        .stderr(predicate::str::contains("No values found in document"));
}

#[test]
fn test_threshold_override_from_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"extraction": {"min_matched_columns": {"thyroid": 2}}}"#).unwrap();
    let report = dir.path().join("short.csv");
    fs::write(&report, "age,tsh\n40,9\n").unwrap();

    vitalscan()
        .arg("-c")
        .arg(&config)
        .arg("extract")
        .arg(&report)
        .args(["--domain", "thyroid", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("age,TSH"))
        .stdout(predicate::str::contains("40,9"));
}

#[test]
fn test_extract_rejects_unknown_format_and_domain() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    let notes = dir.path().join("notes.docx");
    fs::write(&notes, b"PK\x03\x04").unwrap();

    vitalscan()
        .arg("-c")
        .arg(&config)
        .arg("extract")
        .arg(&notes)
        .args(["--domain", "thyroid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported file format"));

    vitalscan()
        .arg("extract")
        .arg(&notes)
        .args(["--domain", "kidney"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown domain"));
}

#[test]
fn test_predict_reports_bad_input() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());

    vitalscan()
        .arg("-c")
        .arg(&config)
        .args(["predict", "--domain", "thyroid", "--set", "weight=70"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field: weight"));

    vitalscan()
        .arg("-c")
        .arg(&config)
        .args(["predict", "--domain", "thyroid", "--set", "age=52"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load classifier"));
}

#[test]
fn test_config_set_then_get() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nested").join("config.json");

    vitalscan()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "pdf.min_text_length", "120"])
        .assert()
        .success();

    vitalscan()
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "pdf.min_text_length"])
        .assert()
        .success()
        .stdout("120\n");

    vitalscan()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "pdf.min_text_length", "\"lots\""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value for pdf.min_text_length"));
}

#[test]
fn test_config_profiles_export() {
    vitalscan()
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"blood_pressure\""))
        .stdout(predicate::str::contains("\"min_matched_columns\": 6"));
}
