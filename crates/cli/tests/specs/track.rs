//! Track and resume specs against a stub progress endpoint.

use crate::prelude::*;

const RUNNING: &str = r#"{"progress": 40, "status": "running", "message": "copying disk"}"#;
const COMPLETED: &str = r#"{"progress": 100, "status": "completed", "message": "done"}"#;
const FAILED: &str = r#"{"progress": 12, "status": "error", "message": "datastore full"}"#;
const CANCELLED: &str = r#"{"progress": 0, "status": "cancelled", "message": ""}"#;

#[test]
fn track_follows_job_to_completion() {
    let server = StubServer::serve(&[(200, RUNNING), (200, COMPLETED)]);
    let project = Project::empty();

    project
        .ot()
        .args(&["track", "replication", "42", "--url", &server.url(), "--field", "vm=db-01"])
        .passes()
        .stdout_has("Tracking replication 42")
        .stdout_has(" 40%  running  copying disk")
        .stdout_has("replication 42 completed");

    let state = project.state();
    assert_eq!(state["replication_42"]["status"], "completed");
    assert_eq!(state["replication_42"]["progress"], 100);
    assert_eq!(state["replication_42"]["vm"], "db-01");
    assert!(server.requests()[0].starts_with("GET /api/progress/42/ HTTP/1.1"));
}

#[test]
fn transient_errors_are_retried() {
    let server = StubServer::serve(&[(500, "oops"), (502, ""), (200, COMPLETED)]);
    let project = Project::empty();

    project
        .ot()
        .args(&["track", "restore", "5", "--url", &server.url()])
        .passes()
        .stdout_has("restore 5 completed");
    assert!(server.requests().len() >= 3);
}

#[test]
fn failed_job_exits_1() {
    let server = StubServer::serve(&[(200, FAILED)]);
    let project = Project::empty();

    project
        .ot()
        .args(&["track", "restore", "8", "--url", &server.url()])
        .fails()
        .stdout_has("restore 8 failed  datastore full")
        .stderr_has("1 operation(s) failed");
    assert_eq!(project.state()["restore_8"]["status"], "error");
}

#[test]
fn cancelled_job_exits_2() {
    let server = StubServer::serve(&[(200, CANCELLED)]);
    cli().args(&["track", "backup", "1", "--url", &server.url()]).exits(2);
}

#[test]
fn token_is_sent() {
    let server = StubServer::serve(&[(200, COMPLETED)]);
    cli()
        .env("OT_API_TOKEN", "s3cret")
        .args(&["track", "replication", "1", "--url", &server.url()])
        .passes();
    assert!(server.requests()[0].contains("Authorization: Token s3cret"));
}

#[test]
fn json_output_streams_events() {
    let server = StubServer::serve(&[(200, COMPLETED)]);
    let run = cli().args(&["track", "replication", "3", "--url", &server.url(), "-o", "json"]).passes();

    let events: Vec<serde_json::Value> =
        run.stdout().lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["event"], "progress");
    assert_eq!(events[1]["event"], "completed");
    assert_eq!(events[1]["id"], "3");
}

#[test]
fn unknown_type_without_url_is_an_error() {
    cli()
        .args(&["track", "snapshot", "1"])
        .fails()
        .stderr_has("no progress endpoint known for operation type 'snapshot'")
        .stderr_has("known types: replication, restore");
}

#[test]
fn configured_endpoint_is_used() {
    let server = StubServer::serve(&[(200, COMPLETED)]);
    let project = Project::empty();
    project.file(
        "config.toml",
        &format!("[progress]\nexport = \"{}\"\n", server.url()),
    );

    project.ot().args(&["track", "export", "11"]).passes().stdout_has("export 11 completed");
}

#[test]
fn resume_picks_up_active_records() {
    let server = StubServer::serve(&[(200, COMPLETED)]);
    let project = Project::empty();
    project.seed(
        &[
            ("restore", "1", "running", 30),
            ("restore", "2", "starting", 0),
            ("restore", "3", "completed", 100),
            ("backup", "4", "running", 10),
        ],
        1_000,
    );

    project
        .ot()
        .args(&["resume", "restore", "--url", &server.url()])
        .passes()
        .stdout_has("Resumed 2 restore operation(s)")
        .stdout_has("restore 1 completed")
        .stdout_has("restore 2 completed");

    assert_eq!(server.requests().len(), 2);
    assert_eq!(project.state()["backup_4"]["status"], "running");
}

#[test]
fn resume_with_nothing_active() {
    let server = StubServer::serve(&[(200, COMPLETED)]);
    cli()
        .args(&["resume", "replication", "--url", &server.url()])
        .passes()
        .stdout_has("No active replication operations");
    assert!(server.requests().is_empty());
}
