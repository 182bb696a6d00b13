// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation tracker.
//!
//! A tracker watches every operation of one type. Each tracked id gets its
//! own poll loop: a task that sleeps the poll interval, fetches once, applies
//! the result and repeats. Ticks never overlap, so results are applied in the
//! order they were requested.
//!
//! Loops are owned by the `loops` table. Stopping a loop removes its entry
//! and cancels its token, which drops any in-flight fetch. A result is only
//! applied while the loop's generation is still the live entry for its id,
//! checked under the same lock that stops loops.
//!
//! Only one tracker instance at a time may poll a given operation. The claim
//! is held in the registry for the lifetime of the loop.
//!
//! A record found cancelled when a result arrives was cancelled by another
//! registry sharing the store (e.g. `ot cancel`). The result is dropped and
//! the loop ends with a `Cancelled` event.

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::event::TrackerEvent;
use crate::removal::DeferredRemovals;
use ot_adapters::ProgressSource;
use ot_core::{
    Clock, Operation, OperationKey, OperationSeed, OperationStatus, ProgressReport, SystemClock,
};
use ot_storage::{OperationStore, ProgressUpdate, Registry};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Message written when a tracker starts an operation without one.
pub const STARTING_MESSAGE: &str = "Starting...";

/// Message written when the user cancels an operation.
pub const CANCELLED_MESSAGE: &str = "Operation cancelled";

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

struct PollLoop {
    generation: u64,
    cancel: CancellationToken,
}

/// What a poll loop does after applying a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

struct Inner<P, S, C> {
    config: TrackerConfig,
    source: P,
    registry: Arc<Registry<S, C>>,
    owner: u64,
    loops: Mutex<HashMap<String, PollLoop>>,
    current: Mutex<Option<String>>,
    next_generation: AtomicU64,
    removals: DeferredRemovals,
    events: broadcast::Sender<TrackerEvent>,
}

/// Long-poll progress tracker for one operation type.
///
/// Methods that start polling spawn tasks and must be called from within a
/// tokio runtime. Dropping the tracker stops its loops; records stay in the
/// registry and can be resumed by another tracker.
pub struct Tracker<P, S, C = SystemClock>
where
    P: ProgressSource,
    S: OperationStore,
    C: Clock,
{
    inner: Arc<Inner<P, S, C>>,
}

impl<P, S, C> Tracker<P, S, C>
where
    P: ProgressSource,
    S: OperationStore,
    C: Clock,
{
    pub fn new(config: TrackerConfig, source: P, registry: Arc<Registry<S, C>>) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                config,
                source,
                registry,
                owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
                loops: Mutex::new(HashMap::new()),
                current: Mutex::new(None),
                next_generation: AtomicU64::new(0),
                removals: DeferredRemovals::new(),
                events,
            }),
        }
    }

    pub fn operation_type(&self) -> &str {
        &self.inner.config.operation_type
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &Arc<Registry<S, C>> {
        &self.inner.registry
    }

    /// Receive lifecycle events for every operation this tracker polls.
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.inner.events.subscribe()
    }

    /// Register `id` as starting and begin polling it.
    ///
    /// The seed's fields override the starting defaults. Fails without
    /// touching the registry if another tracker polls this operation.
    pub fn start_tracking(&self, id: &str, seed: OperationSeed) -> Result<Operation, TrackerError> {
        let key = self.inner.key(id);
        self.inner.claim(&key)?;

        let seed = if seed.message.is_empty() { seed.message(STARTING_MESSAGE) } else { seed };
        let op = self.inner.registry.set_operation(&key, seed);
        *self.inner.current.lock() = Some(id.to_string());
        self.inner.spawn_loop(id);
        tracing::info!(operation_type = %key.kind, id, "tracking started");
        Ok(op)
    }

    /// Poll `id`, replacing any loop this tracker already runs for it.
    pub fn start_polling(&self, id: &str) -> Result<(), TrackerError> {
        let key = self.inner.key(id);
        self.inner.claim(&key)?;
        self.inner.spawn_loop(id);
        Ok(())
    }

    /// Stop every loop of this tracker. Idempotent.
    pub fn stop_polling(&self) {
        self.inner.stop_all();
    }

    /// Stop the loop for `id`. Returns whether one was running.
    pub fn stop_polling_for(&self, id: &str) -> bool {
        self.inner.stop_loop(id)
    }

    /// Resume polling every active record of this tracker's type.
    ///
    /// Returns how many loops were started. The last resumed id becomes the
    /// current operation.
    pub fn resume_tracking(&self) -> usize {
        let mut active: Vec<Operation> = self
            .inner
            .registry
            .operations_by_type(&self.inner.config.operation_type)
            .into_iter()
            .filter(Operation::is_active)
            .collect();
        active.sort_by(|a, b| a.id.cmp(&b.id));

        let mut resumed = 0;
        for op in active {
            match self.start_polling(&op.id) {
                Ok(()) => {
                    tracing::info!(operation_type = %op.kind, id = %op.id, "resuming tracking");
                    *self.inner.current.lock() = Some(op.id);
                    resumed += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping resume");
                }
            }
        }
        resumed
    }

    /// Cancel the current operation, if any.
    ///
    /// Stops its loop and marks it cancelled with progress 0. Emits no events
    /// and schedules no removal.
    pub fn cancel_current(&self) -> Option<String> {
        let id = self.inner.current.lock().take()?;
        self.cancel(&id);
        Some(id)
    }

    /// Cancel `id`: stop its loop and mark it cancelled with progress 0.
    ///
    /// Returns whether a record existed. Emits no events.
    pub fn cancel(&self, id: &str) -> bool {
        self.inner.stop_loop(id);
        let key = self.inner.key(id);
        self.inner.removals.cancel(&key);
        self.inner.clear_current(id);
        let updated = self.inner.registry.update_progress(
            &key,
            0,
            OperationStatus::Cancelled,
            CANCELLED_MESSAGE,
        );
        if updated {
            tracing::info!(operation_type = %key.kind, id, "operation cancelled");
        }
        updated
    }

    pub fn is_polling(&self, id: &str) -> bool {
        self.inner.loops.lock().contains_key(id)
    }

    pub fn polling_count(&self) -> usize {
        self.inner.loops.lock().len()
    }

    pub fn current_operation_id(&self) -> Option<String> {
        self.inner.current.lock().clone()
    }

    pub fn has_active_operation(&self, id: &str) -> bool {
        self.inner.registry.has_active_operation(&self.inner.key(id))
    }

    pub fn get_operation(&self, id: &str) -> Option<Operation> {
        self.inner.registry.get_operation(&self.inner.key(id))
    }

    /// Bind the tracker to a running session: resume whatever is active.
    pub fn activate(&self) -> usize {
        self.resume_tracking()
    }

    /// Unbind the tracker. Loops stop; registry state is left as is.
    pub fn deactivate(&self) {
        self.stop_polling();
    }
}

impl<P, S, C> Drop for Tracker<P, S, C>
where
    P: ProgressSource,
    S: OperationStore,
    C: Clock,
{
    fn drop(&mut self) {
        self.inner.stop_all();
    }
}

impl<P, S, C> Inner<P, S, C>
where
    P: ProgressSource,
    S: OperationStore,
    C: Clock,
{
    fn key(&self, id: &str) -> OperationKey {
        OperationKey::new(&self.config.operation_type, id)
    }

    fn claim(&self, key: &OperationKey) -> Result<(), TrackerError> {
        if self.registry.claim(key, self.owner) {
            Ok(())
        } else {
            Err(TrackerError::AlreadyTracked {
                operation_type: key.kind.clone(),
                id: key.id.clone(),
            })
        }
    }

    fn clear_current(&self, id: &str) {
        let mut current = self.current.lock();
        if current.as_deref() == Some(id) {
            *current = None;
        }
    }

    fn emit(&self, event: TrackerEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Start a fresh loop for `id`, superseding any existing one.
    fn spawn_loop(self: &Arc<Self>, id: &str) {
        self.removals.cancel(&self.key(id));

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let cancel = CancellationToken::new();
        {
            let mut loops = self.loops.lock();
            let entry = PollLoop { generation, cancel: cancel.clone() };
            if let Some(previous) = loops.insert(id.to_string(), entry) {
                previous.cancel.cancel();
                tracing::debug!(
                    operation_type = %self.config.operation_type,
                    id,
                    superseded = previous.generation,
                    "poll loop superseded"
                );
            }
        }

        tracing::debug!(operation_type = %self.config.operation_type, id, generation, "poll loop started");
        tokio::spawn(Arc::clone(self).run_loop(id.to_string(), generation, cancel));
    }

    async fn run_loop(self: Arc<Self>, id: String, generation: u64, cancel: CancellationToken) {
        let interval = self.config.poll_interval;
        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = async {
                    tokio::time::sleep(interval).await;
                    self.source.fetch_progress(&id).await
                } => result,
            };

            match result {
                Ok(report) => {
                    if self.apply_report(&id, generation, report) == Flow::Stop {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        operation_type = %self.config.operation_type,
                        id = %id,
                        error = %e,
                        "progress poll failed, retrying"
                    );
                }
            }
        }
        tracing::debug!(operation_type = %self.config.operation_type, id = %id, generation, "poll loop ended");
    }

    /// Apply one poll result from loop `generation` of `id`.
    fn apply_report(&self, id: &str, generation: u64, report: ProgressReport) -> Flow {
        let mut loops = self.loops.lock();
        if loops.get(id).map(|l| l.generation) != Some(generation) {
            tracing::debug!(operation_type = %self.config.operation_type, id, generation, "discarding stale poll result");
            return Flow::Stop;
        }

        let key = self.key(id);
        let outcome = self.registry.update_progress_unless(
            &key,
            report.progress,
            report.status.clone(),
            report.message.clone(),
            |stored| stored.status == OperationStatus::Cancelled,
        );
        if let ProgressUpdate::Refused(stored) = outcome {
            if let Some(poll) = loops.remove(id) {
                poll.cancel.cancel();
            }
            self.registry.release(&key, self.owner);
            self.clear_current(id);
            tracing::info!(operation_type = %key.kind, id, "operation cancelled elsewhere, polling stopped");
            let report =
                ProgressReport::new(stored.progress, stored.status).with_message(stored.message);
            self.emit(TrackerEvent::Cancelled { id: id.to_string(), report });
            return Flow::Stop;
        }
        tracing::debug!(
            operation_type = %key.kind,
            id,
            progress = report.progress,
            status = %report.status,
            "progress applied"
        );

        let settled = TrackerEvent::settled(id, &report);
        self.emit(TrackerEvent::Progress { id: id.to_string(), report });

        let Some(settled) = settled else {
            return Flow::Continue;
        };

        if let Some(poll) = loops.remove(id) {
            poll.cancel.cancel();
        }
        self.registry.release(&key, self.owner);
        self.clear_current(id);
        tracing::info!(operation_type = %key.kind, id, outcome = settled.name(), "operation settled");
        self.emit(settled);
        self.removals.schedule(Arc::clone(&self.registry), key, self.config.removal_grace);
        Flow::Stop
    }

    fn stop_loop(&self, id: &str) -> bool {
        let mut loops = self.loops.lock();
        let Some(poll) = loops.remove(id) else {
            return false;
        };
        poll.cancel.cancel();
        self.registry.release(&self.key(id), self.owner);
        tracing::debug!(operation_type = %self.config.operation_type, id, "polling stopped");
        true
    }

    fn stop_all(&self) {
        let mut loops = self.loops.lock();
        for (id, poll) in loops.drain() {
            poll.cancel.cancel();
            self.registry.release(&self.key(&id), self.owner);
        }
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
