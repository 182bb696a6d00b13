// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress reports returned by a progress source.

use crate::status::OperationStatus;
use serde::{Deserialize, Deserializer, Serialize};

/// One successful poll result.
///
/// `status` is required; a body without it is a malformed response.
/// Fields other than `progress`, `status` and `message` are kept in `extra`
/// and handed to event subscribers untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    #[serde(default, deserialize_with = "deserialize_progress")]
    pub progress: u8,
    pub status: OperationStatus,
    #[serde(default, deserialize_with = "deserialize_message")]
    pub message: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProgressReport {
    pub fn new(progress: u8, status: OperationStatus) -> Self {
        Self {
            progress: progress.min(100),
            status,
            message: String::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Clamp a JSON number, or a string holding one, into a 0..=100 percentage.
///
/// Fractions are truncated; negatives, NaN and anything else become 0.
pub fn clamp_progress(value: &serde_json::Value) -> u8 {
    let number = match value {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    };
    match number {
        Some(n) if n.is_finite() && n > 0.0 => n.min(100.0) as u8,
        _ => 0,
    }
}

pub(crate) fn deserialize_progress<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(clamp_progress(&value))
}

fn deserialize_message<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
