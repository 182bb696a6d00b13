// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Delay between the end of one poll and the start of the next.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How long a settled record stays visible before it is removed.
pub const DEFAULT_REMOVAL_GRACE: Duration = Duration::from_secs(10);

const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Per-type tracker settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub operation_type: String,
    pub poll_interval: Duration,
    pub removal_grace: Duration,
    /// Buffered events per subscriber before the slowest one starts lagging.
    pub event_capacity: usize,
}

impl TrackerConfig {
    pub fn new(operation_type: impl Into<String>) -> Self {
        Self {
            operation_type: operation_type.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            removal_grace: DEFAULT_REMOVAL_GRACE,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    ot_core::setters! {
        set {
            poll_interval: Duration,
            removal_grace: Duration,
            event_capacity: usize,
        }
    }
}
