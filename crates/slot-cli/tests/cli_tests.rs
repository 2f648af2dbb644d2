//! Integration tests for the `slots` CLI binary.
//!
//! These use `assert_cmd` and `predicates` to run each subcommand through the
//! actual binary, covering stdin/stdout piping, file I/O, and error exits.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn slots() -> Command {
    let mut cmd = Command::cargo_bin("slots").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("SLOTS_CALENDAR");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout must be JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// free
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn free_from_file_with_pinned_clock() {
    let out = stdout_json(slots().args([
        "free",
        "-i",
        fixture("free_request.json").as_str(),
        "--now",
        "2026-03-01T00:00:00Z",
    ]));

    assert_eq!(
        out,
        json!({
            "availableSlots": [
                {"start": "2026-03-02T09:00:00", "end": "2026-03-02T09:30:00"},
                {"start": "2026-03-02T10:40:00", "end": "2026-03-02T11:10:00"},
                {"start": "2026-03-02T11:20:00", "end": "2026-03-02T11:50:00"}
            ]
        })
    );
}

#[test]
fn free_from_stdin_without_events() {
    let input = r#"{"startTime":"2026-03-02T09:00:00","endTime":"2026-03-02T10:00:00",
                    "timezone":"UTC","meetingDuration":20}"#;

    let out = stdout_json(
        slots()
            .args(["free", "--now", "2026-03-01T00:00:00Z"])
            .write_stdin(input),
    );

    assert_eq!(out["availableSlots"].as_array().unwrap().len(), 3);
    assert_eq!(out["availableSlots"][2]["end"], "2026-03-02T10:00:00");
}

#[test]
fn free_now_after_window_gives_no_slots() {
    let out = stdout_json(slots().args([
        "free",
        "-i",
        fixture("free_request.json").as_str(),
        "--now",
        "2026-03-03T00:00:00Z",
    ]));

    assert_eq!(out, json!({"availableSlots": []}));
}

#[test]
fn free_events_for_another_calendar_are_still_used() {
    let out = stdout_json(
        slots()
            .args([
                "free",
                "-i",
                fixture("free_request.json").as_str(),
                "--now",
                "2026-03-01T00:00:00Z",
            ])
            .env("SLOTS_CALENDAR", "team@example.com"),
    );

    assert_eq!(out["availableSlots"].as_array().unwrap().len(), 3);
}

#[test]
fn free_zero_duration_fails() {
    let input = r#"{"startTime":"2026-03-02T09:00:00","endTime":"2026-03-02T10:00:00",
                    "timezone":"UTC","meetingDuration":0}"#;

    slots()
        .args(["free", "--now", "2026-03-01T00:00:00Z"])
        .write_stdin(input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid slot request"))
        .stderr(predicate::str::contains("duration must be positive"));
}

#[test]
fn free_unknown_timezone_fails() {
    let input = r#"{"startTime":"2026-03-02T09:00:00","endTime":"2026-03-02T10:00:00",
                    "timezone":"Moon/Tranquility","meetingDuration":30}"#;

    slots()
        .arg("free")
        .write_stdin(input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown timezone: Moon/Tranquility"));
}

#[test]
fn free_missing_fields_fail_to_parse() {
    slots()
        .arg("free")
        .write_stdin(r#"{"timezone":"UTC"}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse slot request"));
}

#[test]
fn free_bad_now_fails() {
    slots()
        .args(["free", "-i", fixture("free_request.json").as_str(), "--now", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --now timestamp"));
}

#[test]
fn free_writes_output_file() {
    let output_path = std::env::temp_dir().join("slots-test-free-output.json");
    let _ = std::fs::remove_file(&output_path);

    slots()
        .args([
            "free",
            "-i",
            fixture("free_request.json").as_str(),
            "--now",
            "2026-03-01T00:00:00Z",
            "-o",
            output_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(written["availableSlots"][0]["start"], "2026-03-02T09:00:00");
    let _ = std::fs::remove_file(&output_path);
}

#[test]
fn verbose_logs_go_to_stderr_only() {
    let assert = slots()
        .args([
            "-vv",
            "free",
            "-i",
            fixture("free_request.json").as_str(),
            "--now",
            "2026-03-01T00:00:00Z",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("computing free slots"));

    let stdout = assert.get_output().stdout.clone();
    assert!(serde_json::from_slice::<Value>(&stdout).is_ok());
}

// ─────────────────────────────────────────────────────────────────────────────
// events
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn events_lists_the_day_in_start_order() {
    let out = stdout_json(slots().args(["events", "-i", fixture("schedule_request.json").as_str()]));

    let ids: Vec<&str> = out["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["early", "late"]);
    assert_eq!(out["events"][0]["summary"], "Standup");
}

// ─────────────────────────────────────────────────────────────────────────────
// draft / patch
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn draft_from_stdin() {
    let input = r#"{"summary":"Call","start":"2026-03-02T09:00:00","end":"2026-03-02T09:30:00",
                    "timezone":"Asia/Kolkata","attendees":["x@example.com"]}"#;

    let out = stdout_json(slots().arg("draft").write_stdin(input));

    assert_eq!(out["start"]["dateTime"], "2026-03-02T09:00:00+05:30");
    assert_eq!(out["start"]["timeZone"], "Asia/Kolkata");
    assert_eq!(out["attendees"], json!([{"email": "x@example.com"}]));
    assert_eq!(out["reminders"]["overrides"][0], json!({"method": "email", "minutes": 1440}));
}

#[test]
fn draft_missing_end_fails() {
    slots()
        .arg("draft")
        .write_stdin(r#"{"summary":"Call","start":"2026-03-02T09:00:00"}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse event draft"));
}

#[test]
fn patch_from_file() {
    let out = stdout_json(slots().args(["patch", "-i", fixture("patch_request.json").as_str()]));

    assert_eq!(out["summary"], "Design review (moved)");
    assert_eq!(out["location"], "Room 4");
    assert_eq!(out["start"]["dateTime"], "2026-03-02T17:00:00+01:00");
    assert_eq!(out["end"]["timeZone"], "Europe/Berlin");
    assert_eq!(out["reminders"]["useDefault"], true);
}

#[test]
fn missing_input_file_fails() {
    slots()
        .args(["draft", "-i", "/nonexistent/draft.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn no_subcommand_shows_usage() {
    slots()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
