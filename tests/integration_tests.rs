//! Integration tests for the Symbolista CLI

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// `a.txt` = "aaa", `b.txt` = "bb", `.gitignore` excludes `b.txt`
fn fixture() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.txt"), "aaa").unwrap();
    fs::write(temp.path().join("b.txt"), "bb").unwrap();
    fs::write(temp.path().join(".gitignore"), "b.txt\n").unwrap();
    temp
}

fn symbolista(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("symbolista").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("SYMBOLISTA_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--no-progress");
    cmd
}

/// Test CLI binary exists and responds to --help
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("symbolista").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Count character and character-sequence frequencies"));
}

/// Test CLI responds to --version
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("symbolista").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("symbolista {}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_table_output_and_summary() {
    let dir = fixture();
    symbolista(&dir)
        .arg(".")
        .assert()
        .success()
        .stdout(predicate::str::contains("Characters:"))
        .stdout(predicate::str::contains("a          3          100.00"))
        .stdout(predicate::str::contains("Sequences (2-3 chars):"))
        .stderr(predicate::str::contains("Files/directories ignored: 2"))
        .stderr(predicate::str::contains("Total characters: 3"))
        .stderr(predicate::str::contains("Unique characters: 1"));
}

#[test]
fn test_json_output() {
    let dir = fixture();
    let output = symbolista(&dir)
        .args([".", "--format", "json", "--threshold", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: Value = serde_json::from_slice(&output.stdout).unwrap();
    let characters = doc["result"]["characters"].as_array().unwrap();
    assert_eq!(characters.len(), 1);
    assert_eq!(characters[0]["char"], "a");
    assert_eq!(characters[0]["count"], 3);
    assert_eq!(characters[0]["percentage"], 100.0);

    let sequences = doc["result"]["sequences"].as_array().unwrap();
    assert_eq!(sequences[0]["sequence"], "aa");
    assert_eq!(sequences[0]["count"], 2);

    let meta = &doc["metadata"];
    assert_eq!(meta["files_found"], 3);
    assert_eq!(meta["files_ignored"], 2);
    assert_eq!(meta["files_processed"], 1);
    assert_eq!(meta["total_characters"], 3);
    assert!(meta["timing"]["total_duration"].is_u64());
}

#[test]
fn test_json_without_metadata() {
    let dir = fixture();
    let output = symbolista(&dir)
        .args([".", "-f", "json", "--metadata=false", "--percentages=false"])
        .output()
        .unwrap();
    let doc: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(doc.get("metadata").is_none());
    assert_eq!(doc["result"]["characters"][0]["percentage"], 0.0);
}

#[test]
fn test_csv_output() {
    let dir = fixture();
    symbolista(&dir)
        .args([".", "-f", "csv", "--no-sequences"])
        .assert()
        .success()
        .stdout("type,sequence,count,percentage\ncharacter,a,3,100.00%\n");
}

#[test]
fn test_include_dotfiles_counts_ignore_file() {
    let dir = fixture();
    let output = symbolista(&dir)
        .args([".", "-f", "json", "--include-dotfiles"])
        .output()
        .unwrap();
    let doc: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["metadata"]["files_ignored"], 1);
    assert_eq!(doc["metadata"]["files_processed"], 2);
}

#[test]
fn test_config_file_sets_defaults() {
    let dir = fixture();
    fs::write(
        dir.path().join("custom.toml"),
        "[output]\nformat = \"csv\"\npercentages = false\n\n[sequences]\nenabled = false\n",
    )
    .unwrap();

    symbolista(&dir)
        .args([".", "--config", "custom.toml"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("type,sequence,count\n"));
}

#[test]
fn test_flags_override_config_file() {
    let dir = fixture();
    fs::write(dir.path().join("symbolista.toml"), "[output]\nformat = \"csv\"\n").unwrap();

    symbolista(&dir)
        .args([".", "-f", "table"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Characters:"));
}

#[test]
fn test_quiet_suppresses_stderr() {
    let dir = fixture();
    symbolista(&dir)
        .args([".", "-q"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    symbolista(&dir)
        .arg("does-not-exist")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path does not exist"));
}

#[test]
fn test_invalid_sequence_config_fails() {
    let dir = fixture();
    fs::write(dir.path().join("symbolista.toml"), "[sequences]\nmax_length = 4\n").unwrap();
    symbolista(&dir)
        .arg(".")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Sequence lengths"));
}

#[test]
fn test_invalid_format_rejected() {
    let dir = fixture();
    symbolista(&dir)
        .args([".", "-f", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}
