//! Tests for CLI command handlers

use super::layout::parse_document;
use super::*;
use crate::config::cli::parse_args;
use rusqlite::Connection;
use std::io::Write;
use tempfile::TempDir;

fn recording_with_counters(counters: &[i64]) -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cases.sql");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE driver_iterations (id INTEGER PRIMARY KEY, counter INT,
         iteration_coordinate TEXT, timestamp REAL, success INT, msg TEXT,
         inputs BLOB, outputs BLOB);",
    )
    .unwrap();
    for counter in counters {
        conn.execute(
            "INSERT INTO driver_iterations (counter, iteration_coordinate, timestamp, success, msg)
             VALUES (?1, 'rank0:root|0', 0.0, 1, '')",
            [counter],
        )
        .unwrap();
    }
    (dir, path.display().to_string())
}

fn run(args: &[&str]) -> Result<u8, String> {
    let mut argv = vec!["caserec"];
    argv.extend_from_slice(args);
    run_command(parse_args(argv).unwrap())
}

#[test]
fn test_validate_exit_codes() {
    let (_dir, path) = recording_with_counters(&[]);
    assert_eq!(run(&["validate", &path]), Ok(EXIT_SUCCESS));
    assert_eq!(run(&["validate", "/nonexistent/cases.sql", "--format", "json"]), Ok(EXIT_INVALID));
}

#[test]
fn test_poll_exit_codes() {
    let (_dir, path) = recording_with_counters(&[1, 2]);
    assert_eq!(run(&["poll", &path, "--since", "1"]), Ok(EXIT_SUCCESS));
    assert_eq!(run(&["poll", &path, "--since", "2"]), Ok(EXIT_NO_NEW_DATA));
}

#[test]
fn test_read_commands_succeed() {
    let (_dir, path) = recording_with_counters(&[1]);
    assert_eq!(run(&["iterations", &path]), Ok(EXIT_SUCCESS));
    assert_eq!(run(&["iterations", &path, "--first", "--format", "json"]), Ok(EXIT_SUCCESS));
    assert_eq!(run(&["metadata", &path]), Ok(EXIT_SUCCESS));
    assert_eq!(run(&["variables", &path]), Ok(EXIT_SUCCESS));
    assert_eq!(run(&["get", &path, "metadata"]), Ok(EXIT_SUCCESS));
}

#[test]
fn test_layout_set_then_get() {
    let (_dir, path) = recording_with_counters(&[]);
    assert_eq!(run(&["layout", "set", &path, "{\"a\": 1}"]), Ok(EXIT_SUCCESS));

    let mut recording = RecordingFile::new();
    recording.connect(&path).unwrap();
    assert_eq!(recording.get_layout().unwrap(), vec![serde_json::json!({"a": 1})]);
    assert_eq!(run(&["layout", "get", &path]), Ok(EXIT_SUCCESS));
}

#[test]
fn test_invalid_recording_is_an_error() {
    let err = run(&["iterations", "/nonexistent/cases.sql"]).unwrap_err();
    assert!(err.contains("not a SQLite recording"));
}

#[test]
fn test_missing_config_is_an_error() {
    let (_dir, path) = recording_with_counters(&[]);
    let err = run(&["iterations", &path, "--config", "/nonexistent/caserec.yaml"]).unwrap_err();
    assert!(err.contains("Configuration file not found"));
}

#[test]
fn test_parse_document_inline_and_file() {
    assert_eq!(parse_document("[1, 2]").unwrap(), serde_json::json!([1, 2]));
    assert!(parse_document("{oops").is_err());

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{\"panels\": []}").unwrap();
    let arg = format!("@{}", file.path().display());
    assert_eq!(parse_document(&arg).unwrap(), serde_json::json!({"panels": []}));
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("rank0:SLSQP|123456", 10), "rank0:S...");
}
