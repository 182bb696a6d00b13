//! Help and argument handling specs.

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("list")
        .stdout_has("track")
        .stdout_has("resume")
        .stdout_has("cleanup");
}

#[test]
fn version_shows_package_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}

#[test]
fn track_requires_an_id() {
    cli().args(&["track", "replication"]).exits(2).stderr_has("Usage:");
}

#[test]
fn malformed_field_is_rejected() {
    cli().args(&["track", "restore", "1", "--field", "novalue"]).exits(2).stderr_has("KEY=VALUE");
}

#[test]
fn reserved_field_is_rejected_before_anything_is_stored() {
    let project = Project::empty();
    project
        .ot()
        .args(&["track", "backup", "1", "--field", "id=x"])
        .exits(2)
        .stderr_has("'id' is a reserved field");
    assert!(!project.state_path().exists());
}

#[test]
fn bad_config_file_is_reported() {
    let project = Project::empty();
    project.file("config.toml", "poll_interval_ms = \"fast\"");
    project.ot().args(&["list"]).fails().stderr_has("invalid config");
}
