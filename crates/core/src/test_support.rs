// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{Operation, OperationStatus, ProgressReport};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for the operation model.
pub mod strategies {
    use crate::{Operation, OperationStatus};
    use proptest::prelude::*;

    pub fn arb_status() -> impl Strategy<Value = OperationStatus> {
        prop_oneof![
            Just(OperationStatus::Starting),
            Just(OperationStatus::Running),
            Just(OperationStatus::InProgress),
            Just(OperationStatus::Completed),
            Just(OperationStatus::Error),
            Just(OperationStatus::Cancelled),
            "[a-z_]{1,12}".prop_map(|s| OperationStatus::parse(&s)),
        ]
    }

    pub fn arb_kind() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("backup".to_string()),
            Just("export".to_string()),
            Just("replication".to_string()),
            Just("restore".to_string()),
        ]
    }

    pub fn arb_operation() -> impl Strategy<Value = Operation> {
        (arb_kind(), "[a-z0-9-]{1,10}", 0u8..=100, arb_status(), ".{0,20}", 0u64..10_000_000)
            .prop_map(|(kind, id, progress, status, message, last_update_ms)| Operation {
                kind,
                id,
                progress,
                status,
                message,
                last_update_ms,
                extra: serde_json::Map::new(),
            })
    }
}

// ── Report factory functions ────────────────────────────────────────────

pub fn running(progress: u8, message: &str) -> ProgressReport {
    ProgressReport::new(progress, OperationStatus::Running).with_message(message)
}

pub fn completed() -> ProgressReport {
    ProgressReport::new(100, OperationStatus::Completed).with_message("done")
}

pub fn failed(message: &str) -> ProgressReport {
    ProgressReport::new(0, OperationStatus::Error).with_message(message)
}

pub fn cancelled() -> ProgressReport {
    ProgressReport::new(0, OperationStatus::Cancelled)
}

/// Operation record with the given key and status, everything else defaulted.
pub fn operation(kind: &str, id: &str, status: OperationStatus) -> Operation {
    Operation::builder().kind(kind).id(id).status(status).build()
}
