// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation status.
//!
//! The status set reported by the backend is open-ended. The six known values
//! map to dedicated variants; anything else is carried verbatim in
//! [`OperationStatus::Other`] and is neither active nor terminal.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Status of a tracked operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum OperationStatus {
    /// Registered locally, no progress seen yet
    #[default]
    Starting,
    /// Backend reports the job as running
    Running,
    /// Alias of `Running` used by some backend endpoints
    InProgress,
    Completed,
    Error,
    Cancelled,
    /// Any status string the tracker does not know about
    Other(String),
}

impl OperationStatus {
    /// Parse a status string. Unknown strings become [`OperationStatus::Other`].
    pub fn parse(s: &str) -> Self {
        match s {
            "starting" => Self::Starting,
            "running" => Self::Running,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "error" => Self::Error,
            "cancelled" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
            Self::Other(s) => s,
        }
    }

    /// `starting`, `running` or `in_progress`.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Starting | Self::Running | Self::InProgress)
    }

    /// `completed`, `error` or `cancelled`. Ends a poll loop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::Cancelled)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for OperationStatus {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for OperationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OperationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
