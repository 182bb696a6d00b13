// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn storage_key_joins_type_and_id() {
    let key = OperationKey::new("replication", "17");
    assert_eq!(key.storage_key(), "replication_17");
    assert_eq!(key.to_string(), "replication 17");
}

#[test]
fn seed_defaults_to_starting() {
    let key = OperationKey::new("backup", "42");
    let op = Operation::from_seed(&key, OperationSeed::new(), 5_000);
    assert_eq!(op.kind, "backup");
    assert_eq!(op.id, "42");
    assert_eq!(op.progress, 0);
    assert_eq!(op.status, OperationStatus::Starting);
    assert_eq!(op.message, "");
    assert_eq!(op.last_update_ms, 5_000);
    assert!(op.is_active());
}

#[test]
fn seed_overrides_and_extra_fields() {
    let key = OperationKey::new("export", "9");
    let seed = OperationSeed::new()
        .message("Starting...")
        .progress(5)
        .field("vm_name", "db-01")
        .field("format", json!("ova"));
    let op = Operation::from_seed(&key, seed, 1);
    assert_eq!(op.message, "Starting...");
    assert_eq!(op.progress, 5);
    assert_eq!(op.extra.get("vm_name"), Some(&json!("db-01")));
    assert_eq!(op.extra.get("format"), Some(&json!("ova")));
}

#[test]
fn apply_progress_never_moves_timestamp_backwards() {
    let mut op = Operation::builder().last_update_ms(10_000).build();
    op.apply_progress(55, OperationStatus::Running, "copying disk".into(), 9_000);
    assert_eq!(op.progress, 55);
    assert_eq!(op.status, OperationStatus::Running);
    assert_eq!(op.message, "copying disk");
    assert_eq!(op.last_update_ms, 10_000);

    op.apply_progress(60, OperationStatus::Running, String::new(), 12_000);
    assert_eq!(op.last_update_ms, 12_000);
}

#[test]
fn persisted_layout_uses_original_field_names() {
    let mut op = Operation::builder()
        .kind("restore")
        .id("r-1")
        .progress(10)
        .status(OperationStatus::InProgress)
        .message("deploying")
        .last_update_ms(123)
        .build();
    op.extra.insert("vm".into(), json!("web-02"));

    let value = serde_json::to_value(&op).unwrap();
    assert_eq!(
        value,
        json!({
            "type": "restore",
            "id": "r-1",
            "progress": 10,
            "status": "in_progress",
            "message": "deploying",
            "lastUpdate": 123,
            "vm": "web-02",
        })
    );

    let back: Operation = serde_json::from_value(value).unwrap();
    assert_eq!(back, op);
}

#[test]
fn decodes_sparse_record() {
    let op: Operation =
        serde_json::from_value(json!({ "type": "backup", "id": "1", "progress": 99.9 })).unwrap();
    assert_eq!(op.progress, 99);
    assert_eq!(op.status, OperationStatus::Starting);
    assert_eq!(op.last_update_ms, 0);
}

#[test]
fn seed_routes_reserved_names_to_typed_fields() {
    let key = OperationKey::new("backup", "1");
    let seed = OperationSeed::new()
        .field("id", "x")
        .field("type", "restore")
        .field("lastUpdate", 0)
        .field("progress", "35")
        .field("status", "running")
        .field("message", "queued by operator")
        .field("vm", "db-01");
    let op = Operation::from_seed(&key, seed, 7_000);

    assert_eq!(op.id, "1");
    assert_eq!(op.kind, "backup");
    assert_eq!(op.last_update_ms, 7_000);
    assert_eq!(op.progress, 35);
    assert_eq!(op.status, OperationStatus::Running);
    assert_eq!(op.message, "queued by operator");
    assert_eq!(op.extra.len(), 1);
    assert_eq!(op.extra.get("vm"), Some(&json!("db-01")));
}

#[test]
fn reserved_extra_keys_never_reach_the_persisted_record() {
    let key = OperationKey::new("backup", "1");
    let mut seed = OperationSeed::new().field("vm", "db-01");
    for name in RESERVED_FIELDS {
        seed.extra.insert(name.to_string(), json!("clash"));
    }
    let op = Operation::from_seed(&key, seed, 1);

    let mut table = std::collections::HashMap::new();
    table.insert(key.storage_key(), op.clone());
    let json = serde_json::to_string(&table).unwrap();

    let back: std::collections::HashMap<String, Operation> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.get("backup_1"), Some(&op));
    assert_eq!(back["backup_1"].id, "1");
}

#[yare::parameterized(
    kind        = { "type", true },
    id          = { "id", true },
    last_update = { "lastUpdate", true },
    message     = { "message", true },
    vm          = { "vm", false },
    snake_case  = { "last_update", false },
)]
fn reserved_field_names(name: &str, reserved: bool) {
    assert_eq!(is_reserved_field(name), reserved);
}
