//! Registry command specs: list, show, remove, cleanup, cancel.

use crate::prelude::*;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

#[test]
fn list_empty_state() {
    cli().args(&["list"]).passes().stdout_has("No tracked operations");
}

#[test]
fn list_shows_records_with_filters() {
    let project = Project::empty();
    project.seed(
        &[
            ("backup", "42", "running", 55),
            ("replication", "7", "completed", 100),
            ("restore", "3", "in_progress", 80),
        ],
        1_000,
    );

    project
        .ot()
        .args(&["list"])
        .passes()
        .stdout_has("TYPE")
        .stdout_has("backup")
        .stdout_has("replication")
        .stdout_has("restore");

    project
        .ot()
        .args(&["list", "--active"])
        .passes()
        .stdout_has("backup")
        .stdout_has("restore")
        .stdout_lacks("replication");

    project
        .ot()
        .args(&["list", "--type", "replication"])
        .passes()
        .stdout_has("completed")
        .stdout_lacks("backup");
}

#[test]
fn list_json_uses_persisted_field_names() {
    let project = Project::empty();
    project.seed(&[("backup", "42", "running", 55)], 1_000);

    let run = project.ot().args(&["list", "-o", "json"]).passes();
    let ops: serde_json::Value = serde_json::from_str(run.stdout()).unwrap();

    assert_eq!(ops[0]["type"], "backup");
    assert_eq!(ops[0]["id"], "42");
    assert_eq!(ops[0]["progress"], 55);
    assert!(ops[0]["lastUpdate"].is_u64());
}

#[test]
fn opening_drops_records_older_than_a_day() {
    let project = Project::empty();
    project.seed(&[("backup", "old", "running", 10)], DAY_MS + 60_000);

    project.ot().args(&["list"]).passes().stdout_has("No tracked operations");
    assert_eq!(project.state(), serde_json::json!({}));
}

#[test]
fn show_and_remove() {
    let project = Project::empty();
    project.seed(&[("restore", "3", "running", 80)], 1_000);

    project
        .ot()
        .args(&["show", "restore", "3"])
        .passes()
        .stdout_has("type:     restore")
        .stdout_has("progress: 80%");

    project.ot().args(&["remove", "restore", "3"]).passes().stdout_has("Removed restore 3");
    project.ot().args(&["show", "restore", "3"]).fails().stderr_has("no tracked operation restore 3");
    project.ot().args(&["remove", "restore", "3"]).fails();
}

#[test]
fn cancel_marks_active_operation() {
    let project = Project::empty();
    project.seed(&[("backup", "9", "running", 40), ("backup", "10", "completed", 100)], 1_000);

    project.ot().args(&["cancel", "backup", "9"]).passes().stdout_has("Cancelled backup 9");
    let state = project.state();
    assert_eq!(state["backup_9"]["status"], "cancelled");
    assert_eq!(state["backup_9"]["progress"], 0);
    assert_eq!(state["backup_9"]["message"], "Operation cancelled");

    project.ot().args(&["cancel", "backup", "10"]).fails().stderr_has("not active");
}

#[test]
fn cleanup_settled_respects_grace() {
    let project = Project::empty();
    project.seed(&[("backup", "1", "completed", 100), ("backup", "2", "running", 50)], 60_000);

    project
        .ot()
        .args(&["cleanup"])
        .passes()
        .stdout_has("Removed 0 expired and 0 settled operation(s)");

    project
        .ot()
        .args(&["cleanup", "--settled"])
        .passes()
        .stdout_has("0 expired and 1 settled");

    let state = project.state();
    assert!(state.get("backup_1").is_none());
    assert!(state.get("backup_2").is_some());
}

#[test]
fn corrupt_state_is_set_aside() {
    let project = Project::empty();
    project.file(STATE_FILE, "{ not json");

    project.ot().args(&["list"]).passes().stdout_has("No tracked operations");
    assert!(project.path().join("esxi_operations.bak").exists());
}
