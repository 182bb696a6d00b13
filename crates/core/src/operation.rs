// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracked operation records.
//!
//! An [`Operation`] is one asynchronous backend job (backup, export,
//! replication, restore) identified by its type and the backend's job id.
//! The persisted field names (`type`, `lastUpdate`) match the registry's
//! on-disk layout.

use crate::progress::{clamp_progress, deserialize_progress};
use crate::status::OperationStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field names the record owns. Extra fields with these names would collide
/// with the typed fields in the persisted JSON.
pub const RESERVED_FIELDS: [&str; 6] = ["type", "id", "progress", "status", "message", "lastUpdate"];

pub fn is_reserved_field(name: &str) -> bool {
    RESERVED_FIELDS.contains(&name)
}

/// Identity of an operation: (type, id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationKey {
    pub kind: String,
    pub id: String,
}

impl OperationKey {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self { kind: kind.into(), id: id.into() }
    }

    /// Registry key: `{type}_{id}`.
    pub fn storage_key(&self) -> String {
        format!("{}_{}", self.kind, self.id)
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// A tracked operation as stored in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_progress")]
    pub progress: u8,
    #[serde(default)]
    pub status: OperationStatus,
    #[serde(default)]
    pub message: String,
    /// Epoch milliseconds of the last mutation
    #[serde(rename = "lastUpdate", default)]
    pub last_update_ms: u64,
    /// Caller-supplied fields merged in at creation
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Operation {
    /// Build a fresh record from a seed, stamped at `now_ms`.
    ///
    /// Extra fields named like a typed field are dropped.
    pub fn from_seed(key: &OperationKey, seed: OperationSeed, now_ms: u64) -> Self {
        let mut extra = seed.extra;
        extra.retain(|name, _| !is_reserved_field(name));
        Self {
            kind: key.kind.clone(),
            id: key.id.clone(),
            progress: seed.progress.min(100),
            status: seed.status,
            message: seed.message,
            last_update_ms: now_ms,
            extra,
        }
    }

    pub fn key(&self) -> OperationKey {
        OperationKey::new(&self.kind, &self.id)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a progress update, keeping `last_update_ms` non-decreasing.
    pub fn apply_progress(
        &mut self,
        progress: u8,
        status: OperationStatus,
        message: String,
        now_ms: u64,
    ) {
        self.progress = progress.min(100);
        self.status = status;
        self.message = message;
        self.last_update_ms = self.last_update_ms.max(now_ms);
    }
}

/// Initial data for a new record.
///
/// Defaults to `progress: 0`, `status: starting`, empty message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationSeed {
    pub progress: u8,
    pub status: OperationStatus,
    pub message: String,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl OperationSeed {
    pub fn new() -> Self {
        Self::default()
    }

    crate::setters! {
        into { message: String }
        set { progress: u8, status: OperationStatus }
    }

    /// Attach an extra field to the record (e.g. the VM name).
    ///
    /// `progress`, `status` and `message` set the typed field instead. `type`,
    /// `id` and `lastUpdate` come from the key and the clock and are ignored.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match name.as_str() {
            "progress" => self.progress = clamp_progress(&value),
            "status" => {
                if let Some(status) = value.as_str() {
                    self.status = OperationStatus::parse(status);
                }
            }
            "message" => {
                self.message = match value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
            }
            "type" | "id" | "lastUpdate" => {}
            _ => {
                self.extra.insert(name, value);
            }
        }
        self
    }
}

crate::builder! {
    pub struct OperationBuilder => Operation {
        into {
            kind: String = "backup",
            id: String = "42",
            message: String = "",
        }
        set {
            progress: u8 = 0,
            status: OperationStatus = OperationStatus::Starting,
            last_update_ms: u64 = 1_000_000,
        }
        default { extra }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
