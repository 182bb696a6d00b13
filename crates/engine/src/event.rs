// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle events published by a tracker.

use ot_core::{OperationStatus, ProgressReport};

/// Outcome of one applied poll result.
///
/// Every applied result produces a `Progress` event. A terminal result is
/// followed by exactly one of `Completed`, `Failed` or `Cancelled`.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    Progress { id: String, report: ProgressReport },
    Completed { id: String, report: ProgressReport },
    Failed { id: String, report: ProgressReport },
    Cancelled { id: String, report: ProgressReport },
}

impl TrackerEvent {
    /// Terminal event for a settled report, or `None` while it is still live.
    pub fn settled(id: &str, report: &ProgressReport) -> Option<Self> {
        let id = id.to_string();
        let report = report.clone();
        match report.status {
            OperationStatus::Completed => Some(Self::Completed { id, report }),
            OperationStatus::Error => Some(Self::Failed { id, report }),
            OperationStatus::Cancelled => Some(Self::Cancelled { id, report }),
            _ => None,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Progress { id, .. }
            | Self::Completed { id, .. }
            | Self::Failed { id, .. }
            | Self::Cancelled { id, .. } => id,
        }
    }

    pub fn report(&self) -> &ProgressReport {
        match self {
            Self::Progress { report, .. }
            | Self::Completed { report, .. }
            | Self::Failed { report, .. }
            | Self::Cancelled { report, .. } => report,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Progress { .. } => "progress",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
