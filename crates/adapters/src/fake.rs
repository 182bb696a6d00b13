// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted progress source for tests.

use crate::progress::{ProgressError, ProgressSource};
use async_trait::async_trait;
use ot_core::ProgressReport;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// One scripted response.
#[derive(Debug, Clone)]
pub enum FakeStep {
    Report(ProgressReport),
    Fail(String),
    /// Wait before answering. Pair with a paused tokio clock.
    Delay(Duration, ProgressReport),
    /// Never answer.
    Pending,
}

#[derive(Default)]
struct FakeSourceState {
    scripts: HashMap<String, VecDeque<FakeStep>>,
    calls: HashMap<String, usize>,
}

/// Progress source that replays a per-id script.
///
/// Steps are consumed in order; the last step repeats forever. An id with no
/// script fails every fetch with a transport error.
#[derive(Clone, Default)]
pub struct FakeProgressSource {
    inner: Arc<Mutex<FakeSourceState>>,
}

impl FakeProgressSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append steps to the script for `id`.
    pub fn script(&self, id: &str, steps: impl IntoIterator<Item = FakeStep>) -> &Self {
        self.inner.lock().scripts.entry(id.to_string()).or_default().extend(steps);
        self
    }

    /// Append a single report to the script for `id`.
    pub fn push(&self, id: &str, report: ProgressReport) -> &Self {
        self.script(id, [FakeStep::Report(report)])
    }

    /// Number of fetches made for `id`.
    pub fn calls(&self, id: &str) -> usize {
        self.inner.lock().calls.get(id).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.inner.lock().calls.values().sum()
    }

    fn next_step(&self, id: &str) -> Option<FakeStep> {
        let mut state = self.inner.lock();
        *state.calls.entry(id.to_string()).or_default() += 1;
        let script = state.scripts.get_mut(id)?;
        if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        }
    }
}

#[async_trait]
impl ProgressSource for FakeProgressSource {
    async fn fetch_progress(&self, id: &str) -> Result<ProgressReport, ProgressError> {
        match self.next_step(id) {
            Some(FakeStep::Report(report)) => Ok(report),
            Some(FakeStep::Fail(reason)) => Err(ProgressError::Transport(reason)),
            Some(FakeStep::Delay(delay, report)) => {
                tokio::time::sleep(delay).await;
                Ok(report)
            }
            Some(FakeStep::Pending) => std::future::pending().await,
            None => Err(ProgressError::Transport(format!("no script for {id}"))),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
