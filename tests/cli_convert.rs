//! Integration tests for the conversion commands.
//!
//! Every test runs in its own temp directory with an empty config home, so
//! a user's settings file never leaks in.

#![allow(deprecated)] // cargo_bin deprecation, replacement not yet stable

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TALK_VTT: &str = "WEBVTT

00:00:00.000 --> 00:00:01.500
Good morning

00:00:01.500 --> 00:00:03.000
and welcome

00:00:03.000 --> 00:00:04.250
to the talk

00:00:04.250 --> 00:00:06.000
on captions

00:00:06.000 --> 00:00:07.000
Thank you
";

const TALK_SRT: &str = "1
00:00:00,000 --> 00:00:02,000
Good morning and welcome

2
00:00:02,000 --> 00:00:04,000
to the talk

3
00:00:04,000 --> 00:00:07,000
on captions. Thank you
";

/// Helper: `viasplit` running inside `dir` with an isolated config home.
fn viasplit(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("viasplit").expect("binary 'viasplit' should be built");
    cmd.current_dir(dir).env("XDG_CONFIG_HOME", dir.join("config"));
    cmd
}

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("talk.vtt"), TALK_VTT).unwrap();
    fs::write(dir.path().join("talk.srt"), TALK_SRT).unwrap();
    dir
}

fn read_json(path: PathBuf) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ─── convert ─────────────────────────────────────────────────────────────────

#[test]
fn convert_writes_one_project_per_window() {
    let dir = workspace();

    viasplit(dir.path())
        .args([
            "convert",
            "https://media.example.org/talk.mp4",
            "talk.vtt",
            "--segments-per-split",
            "2",
            "--output-dir",
            "out",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.json"))
        .stdout(predicate::str::contains("3.json"));

    let out = dir.path().join("out");
    assert!(out.join("1.json").exists());
    assert!(out.join("2.json").exists());
    assert!(out.join("3.json").exists());
    assert!(!out.join("4.json").exists());

    let second = read_json(out.join("2.json"));
    assert_eq!(
        second["file"]["1"]["src"],
        "https://media.example.org/talk.mp4#t=3.0,6.0"
    );
    assert_eq!(second["file"]["1"]["type"], 4);
    assert_eq!(second["project"]["pid"], "__VIA_PROJECT_ID__");
    assert_eq!(second["metadata"].as_object().unwrap().len(), 2);
}

#[test]
fn convert_with_sequential_ids() {
    let dir = workspace();

    viasplit(dir.path())
        .args([
            "convert",
            "talk.mp4",
            "talk.vtt",
            "--sequential-ids",
            "--output-dir",
            "out",
        ])
        .assert()
        .success();

    let project = read_json(dir.path().join("out").join("1.json"));
    let metadata = project["metadata"].as_object().unwrap();
    let ids: Vec<&String> = metadata.keys().collect();
    assert_eq!(
        ids,
        vec!["1_000001", "1_000002", "1_000003", "1_000004", "1_000005"]
    );
    assert_eq!(metadata["1_000003"]["z"], serde_json::json!([3.0, 4.25]));
    assert_eq!(metadata["1_000003"]["av"]["1"], "to the talk");
}

#[test]
fn convert_rejects_zero_splits() {
    let dir = workspace();

    viasplit(dir.path())
        .args(["convert", "talk.mp4", "talk.vtt", "--num-splits", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid input"));
}

#[test]
fn convert_falls_back_when_store_unreachable() {
    let dir = workspace();

    viasplit(dir.path())
        .args([
            "convert",
            "talk.mp4",
            "talk.vtt",
            "--upload-url",
            "http://127.0.0.1:9",
            "--output-dir",
            "out",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Shared: 0/1"));

    assert!(dir.path().join("out").join("1.json").exists());
}

#[test]
fn convert_missing_captions_fails() {
    let dir = workspace();

    viasplit(dir.path())
        .args(["convert", "talk.mp4", "missing.vtt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.vtt"));
}

// ─── split ───────────────────────────────────────────────────────────────────

#[test]
fn split_json_lists_windows() {
    let dir = workspace();

    let output = viasplit(dir.path())
        .args(["split", "talk.vtt", "--num-splits", "2", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let windows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let windows = windows.as_array().unwrap();
    assert_eq!(windows.len(), 3);
    assert_eq!(windows[0]["first"], 0);
    assert_eq!(windows[0]["last"], 1);
    assert_eq!(windows[2]["start"], 6.0);
}

#[test]
fn split_aligned_to_reference() {
    let dir = workspace();

    let output = viasplit(dir.path())
        .args([
            "split",
            "talk.vtt",
            "--reference",
            "talk.srt",
            "--segments-per-split",
            "1",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let windows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ranges: Vec<(u64, u64)> = windows
        .as_array()
        .unwrap()
        .iter()
        .map(|w| (w["first"].as_u64().unwrap(), w["last"].as_u64().unwrap()))
        .collect();
    assert_eq!(ranges, vec![(0, 1), (2, 3), (4, 4)]);
}

#[test]
fn split_table_output() {
    let dir = workspace();

    viasplit(dir.path())
        .args(["split", "talk.srt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("captions"))
        .stderr(predicate::str::contains("3 captions in 1 windows"));
}

// ─── sanitize ────────────────────────────────────────────────────────────────

const DANGLING_PROJECT: &str = r#"{
  "project": {"pname": "Legacy", "created": 1700000000, "vid_list": ["1", "2"]},
  "config": {"file": {"loc_prefix": {"1": "", "2": "", "3": "", "4": ""}}, "ui": {}},
  "attribute": {
    "1": {"aname": "subtitle", "anchor_id": "FILE1_Z2_XY0", "type": 1, "desc": "", "options": {}, "default_option_id": ""}
  },
  "file": {"1": {"fid": "1", "fname": "talk.mp4", "type": 4, "loc": 2, "src": "talk.mp4"}},
  "view": {"1": {"fid_list": ["1"]}, "2": {"fid_list": ["9"]}},
  "metadata": {
    "1_keep": {"vid": "1", "flg": 0, "z": [0.0, 1.0], "xy": [], "av": {"1": "hello", "7": "stale"}},
    "1_gone": {"vid": "2", "flg": 0, "z": [1.0, 2.0], "xy": [], "av": {"1": "orphan"}}
  }
}"#;

#[test]
fn sanitize_removes_dangling_references() {
    let dir = workspace();
    fs::write(dir.path().join("legacy.json"), DANGLING_PROJECT).unwrap();

    viasplit(dir.path())
        .args(["sanitize", "legacy.json", "--output", "clean.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("1_gone"));

    let clean = read_json(dir.path().join("clean.json"));
    let metadata = clean["metadata"].as_object().unwrap();
    assert_eq!(metadata.len(), 1);
    assert_eq!(metadata["1_keep"]["av"], serde_json::json!({"1": "hello"}));

    // Input untouched
    let original = read_json(dir.path().join("legacy.json"));
    assert_eq!(original["metadata"].as_object().unwrap().len(), 2);
}

#[test]
fn sanitize_prints_to_stdout_by_default() {
    let dir = workspace();
    fs::write(dir.path().join("legacy.json"), DANGLING_PROJECT).unwrap();

    let output = viasplit(dir.path())
        .args(["sanitize", "legacy.json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let clean: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(clean["metadata"].get("1_gone").is_none());
    assert_eq!(clean["project"]["pname"], "Legacy");
}

#[test]
fn sanitize_refuses_to_overwrite_input() {
    let dir = workspace();
    fs::write(dir.path().join("legacy.json"), DANGLING_PROJECT).unwrap();

    viasplit(dir.path())
        .args(["sanitize", "legacy.json", "--output", "./legacy.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite input"));

    let original = fs::read_to_string(dir.path().join("legacy.json")).unwrap();
    assert_eq!(original, DANGLING_PROJECT);
}

#[test]
fn sanitize_rejects_invalid_schema() {
    let dir = workspace();
    let broken = DANGLING_PROJECT.replace("\"z\": [0.0, 1.0]", "\"z\": [0.0, 1.0, 2.0]");
    fs::write(dir.path().join("broken.json"), broken).unwrap();

    viasplit(dir.path())
        .args(["sanitize", "broken.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid VIA project"));
}

// ─── batch ───────────────────────────────────────────────────────────────────

#[test]
fn batch_isolates_failed_jobs() {
    let dir = workspace();
    fs::write(
        dir.path().join("jobs.toml"),
        r#"
[[jobs]]
video = "https://media.example.org/talk.mp4"
captions = "talk.vtt"
segments_per_split = 3
name = "talk"

[[jobs]]
video = "https://media.example.org/other.mp4"
captions = "other.vtt"
"#,
    )
    .unwrap();

    viasplit(dir.path())
        .args(["batch", "jobs.toml", "--output-dir", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1/2 jobs succeeded"))
        .stderr(predicate::str::contains("1 of 2 jobs failed"));

    let talk = dir.path().join("out").join("talk");
    assert!(talk.join("1.json").exists());
    assert!(talk.join("2.json").exists());
}
