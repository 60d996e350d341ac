//! Integration tests for the dijkstep CLI
//!
//! These tests run the dijkstep binary against graph files in a temp dir.

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// Get a Command for dijkstep
fn dijkstep() -> Command {
    cargo_bin_cmd!("dijkstep")
}

const TRIANGLE: &str = r#"
source = "A"
tick_ms = 1
vertices = ["A", "B", "C"]

[[edges]]
from = "A"
to = "B"
weight = 1.0

[[edges]]
from = "B"
to = "C"
weight = 2.0

[[edges]]
from = "A"
to = "C"
weight = 5.0
"#;

fn write_graph(content: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("graph.toml");
    fs::write(&path, content).unwrap();
    (dir, path)
}

// ============================================================================
// Help and version
// ============================================================================

#[test]
fn test_help_flag() {
    dijkstep()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: dijkstep"))
        .stdout(predicate::str::contains("walk"))
        .stdout(predicate::str::contains("play"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_version_flag() {
    dijkstep()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dijkstep"));
}

#[test]
fn test_no_command_prints_hint() {
    dijkstep()
        .assert()
        .success()
        .stdout(predicate::str::contains("dijkstep --help"));
}

#[test]
fn test_unknown_format_exit_code_2() {
    let (_dir, path) = write_graph(TRIANGLE);
    dijkstep()
        .args(["--format", "xml", "walk"])
        .arg(&path)
        .assert()
        .code(2);
}

// ============================================================================
// walk
// ============================================================================

#[test]
fn test_walk_triangle_human() {
    let (_dir, path) = write_graph(TRIANGLE);
    dijkstep()
        .arg("walk")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("start  A (3 vertices reset)"))
        .stdout(predicate::str::contains("  relax e0 -> B = 1"))
        .stdout(predicate::str::contains("  relax e1 -> C = 3"))
        .stdout(predicate::str::contains("step   C at 3"))
        .stdout(predicate::str::contains("end    exhausted"))
        .stdout(predicate::str::contains("  C\t3\tvia B"));
}

#[test]
fn test_walk_source_override() {
    let (_dir, path) = write_graph(TRIANGLE);
    dijkstep()
        .args(["walk", "--source", "C"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("start  C"))
        .stdout(predicate::str::contains("  A\t3\tvia B"));
}

#[test]
fn test_walk_json_lines() {
    let (_dir, path) = write_graph(TRIANGLE);
    let output = dijkstep()
        .args(["--format", "json", "walk"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines[0]["event"], "started");
    assert_eq!(lines[0]["source"], "A");
    assert!(lines
        .iter()
        .any(|l| l["event"] == "ended" && l["reason"] == "exhausted"));

    let snapshot = lines.last().unwrap();
    assert_eq!(snapshot["phase"], "terminated");
    assert_eq!(snapshot["vertices"][2]["id"], "C");
    assert_eq!(snapshot["vertices"][2]["distance"], 3.0);
}

#[test]
fn test_walk_quiet_prints_only_table() {
    let (_dir, path) = write_graph(TRIANGLE);
    dijkstep()
        .args(["walk", "--quiet"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("relax").not())
        .stdout(predicate::str::contains("distances from A"));
}

#[test]
fn test_walk_disconnected_reports_unreachable() {
    let graph = format!("{}\n", TRIANGLE.replace(r#"["A", "B", "C"]"#, r#"["A", "B", "C", "D"]"#));
    let (_dir, path) = write_graph(&graph);
    dijkstep()
        .arg("walk")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("end    unreachable"))
        .stdout(predicate::str::contains("  D\tinf\tvia -"));
}

#[test]
fn test_walk_unknown_source_exit_code_3() {
    let (_dir, path) = write_graph(TRIANGLE);
    dijkstep()
        .args(["walk", "--source", "Z"])
        .arg(&path)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("unknown vertex: Z"));
}

#[test]
fn test_walk_unknown_source_json_error() {
    let (_dir, path) = write_graph(TRIANGLE);
    dijkstep()
        .args(["--format", "json", "walk", "--source", "Z"])
        .arg(&path)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("\"type\":\"unknown_vertex\""));
}

#[test]
fn test_walk_missing_source_exit_code_3() {
    let (_dir, path) = write_graph("vertices = [\"A\"]\n");
    dijkstep()
        .arg("walk")
        .arg(&path)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("no source vertex configured"));
}

#[test]
fn test_negative_weight_exit_code_3() {
    let (_dir, path) = write_graph(&TRIANGLE.replace("weight = 2.0", "weight = -2.0"));
    dijkstep()
        .arg("walk")
        .arg(&path)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("invalid weight"));
}

#[test]
fn test_missing_file_exit_code_1() {
    let dir = tempdir().unwrap();
    dijkstep()
        .arg("walk")
        .arg(dir.path().join("missing.toml"))
        .assert()
        .code(1);
}

// ============================================================================
// play
// ============================================================================

#[test]
fn test_play_runs_to_completion() {
    let (_dir, path) = write_graph(TRIANGLE);
    dijkstep()
        .args(["play", "--tick-ms", "1"])
        .arg(&path)
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::contains("end    exhausted"))
        .stdout(predicate::str::contains("  C\t3\tvia B"));
}

#[test]
fn test_play_zero_tick_is_usage_error() {
    let (_dir, path) = write_graph(TRIANGLE);
    dijkstep()
        .args(["play", "--tick-ms", "0"])
        .arg(&path)
        .assert()
        .code(2);
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_summary() {
    let (_dir, path) = write_graph(TRIANGLE);
    dijkstep()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 vertices, 3 edges (undirected)"))
        .stdout(predicate::str::contains("source: A"));
}

#[test]
fn test_check_json() {
    let (_dir, path) = write_graph(TRIANGLE);
    let output = dijkstep()
        .args(["--format", "json", "check"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["vertices"], 3);
    assert_eq!(json["edges"], 3);
    assert_eq!(json["tick_ms"], 1);
    assert_eq!(json["mode"], "continuous");
}

#[test]
fn test_check_duplicate_vertex_exit_code_3() {
    let (_dir, path) = write_graph("vertices = [\"A\", \"A\"]\n");
    dijkstep()
        .arg("check")
        .arg(&path)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("duplicate vertex: A"));
}

#[test]
fn test_overflowing_weights_exit_code_3() {
    let graph = "vertices = [\"A\", \"B\", \"C\"]\n\
        [[edges]]\nfrom = \"A\"\nto = \"B\"\nweight = 1e308\n\
        [[edges]]\nfrom = \"B\"\nto = \"C\"\nweight = 1e308\n";
    let (_dir, path) = write_graph(graph);
    dijkstep()
        .args(["--format", "json", "check"])
        .arg(&path)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("\"type\":\"weight_overflow\""));
}

#[test]
fn test_json_usage_error_envelope() {
    dijkstep()
        .args(["--format", "json", "walk", "--bogus"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("\"type\":\"usage_error\""));
}
