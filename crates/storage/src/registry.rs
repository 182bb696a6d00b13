// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation registry.
//!
//! Single owner of the operation table within a process. Several registries
//! may share one store (one per `ot` process), so every mutation is applied
//! to the store's latest table through [`OperationStore::update`] and the
//! result becomes this registry's copy. Reads are served from that copy.
//!
//! Persistence failures are logged and swallowed. While the store refuses
//! writes the local copy stays authoritative and mutations apply to it alone.
//!
//! The registry also holds poll claims. A claim marks the one tracker
//! instance allowed to run a poll loop for a key; see
//! [`Registry::claim`].

use crate::store::{OperationStore, OperationTable};
use ot_core::{Clock, Operation, OperationKey, OperationSeed, OperationStatus, SystemClock};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// Records untouched for longer than this are dropped when the registry opens.
pub const MAX_OPERATION_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Result of [`Registry::update_progress_unless`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressUpdate {
    Applied,
    /// No record for the key; nothing was written.
    Missing,
    /// The guard rejected the stored record, returned as found.
    Refused(Operation),
}

struct Cache {
    table: OperationTable,
    /// Set after a write the store rejected.
    unsynced: bool,
}

pub struct Registry<S, C = SystemClock> {
    store: S,
    clock: C,
    cache: Mutex<Cache>,
    claims: Mutex<HashMap<String, u64>>,
}

impl<S: OperationStore, C: Clock> Registry<S, C> {
    /// Load the table from `store` and drop records older than 24h.
    pub fn open(store: S, clock: C) -> Self {
        let table = match store.load() {
            Ok(Some(table)) => {
                tracing::info!(count = table.len(), "loaded tracked operations");
                table
            }
            Ok(None) => OperationTable::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load tracked operations, starting empty");
                OperationTable::new()
            }
        };

        let registry = Self {
            store,
            clock,
            cache: Mutex::new(Cache { table, unsynced: false }),
            claims: Mutex::new(HashMap::new()),
        };
        let expired = registry.cleanup_old_operations();
        if expired > 0 {
            tracing::info!(expired, "dropped stale operations");
        }
        registry
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run `apply` against the store's latest table and adopt the result.
    ///
    /// `apply` returns its value and whether it changed the table. It runs a
    /// second time, on the local copy, when the store fails or when the
    /// local copy holds writes the store never accepted.
    fn mutate<R>(&self, mut apply: impl FnMut(&mut OperationTable) -> (R, bool)) -> R {
        let mut cache = self.cache.lock();
        let mut outcome = None;
        let shared = self.store.update(&mut |table| {
            let (value, changed) = apply(table);
            outcome = Some((value, changed));
            changed
        });

        match (shared, outcome) {
            (Ok(table), Some((value, changed))) if changed || !cache.unsynced => {
                cache.table = table;
                cache.unsynced = false;
                value
            }
            (shared, _) => {
                if let Err(e) = shared {
                    tracing::warn!(error = %e, "failed to persist tracked operations");
                    cache.unsynced = true;
                }
                apply(&mut cache.table).0
            }
        }
    }

    /// Insert or fully replace the record for `key`.
    pub fn set_operation(&self, key: &OperationKey, seed: OperationSeed) -> Operation {
        let now = self.clock.epoch_ms();
        let storage_key = key.storage_key();
        let op = self.mutate(|table| {
            let stamp = table.get(&storage_key).map_or(now, |prev| now.max(prev.last_update_ms));
            let op = Operation::from_seed(key, seed.clone(), stamp);
            table.insert(storage_key.clone(), op.clone());
            (op, true)
        });
        tracing::debug!(operation_type = %key.kind, id = %key.id, "operation registered");
        op
    }

    /// Merge progress/status/message into an existing record.
    ///
    /// Returns `false` (and persists nothing) if the key is absent; updates
    /// never create records.
    pub fn update_progress(
        &self,
        key: &OperationKey,
        progress: u8,
        status: OperationStatus,
        message: impl Into<String>,
    ) -> bool {
        let outcome = self.update_progress_unless(key, progress, status, message, |_| false);
        outcome == ProgressUpdate::Applied
    }

    /// Like [`Registry::update_progress`], but leave the record untouched when
    /// `refuse` accepts the latest stored version of it.
    pub fn update_progress_unless(
        &self,
        key: &OperationKey,
        progress: u8,
        status: OperationStatus,
        message: impl Into<String>,
        refuse: impl Fn(&Operation) -> bool,
    ) -> ProgressUpdate {
        let message = message.into();
        let storage_key = key.storage_key();
        let now = self.clock.epoch_ms();
        self.mutate(|table| {
            let Some(op) = table.get_mut(&storage_key) else {
                return (ProgressUpdate::Missing, false);
            };
            if refuse(op) {
                return (ProgressUpdate::Refused(op.clone()), false);
            }
            op.apply_progress(progress, status.clone(), message.clone(), now);
            (ProgressUpdate::Applied, true)
        })
    }

    /// Delete the record for `key`. Persists even when nothing was removed.
    pub fn remove_operation(&self, key: &OperationKey) -> Option<Operation> {
        let storage_key = key.storage_key();
        self.mutate(|table| (table.remove(&storage_key), true))
    }

    /// Delete the record for `key` only if `should_remove` accepts it.
    pub fn remove_if(
        &self,
        key: &OperationKey,
        should_remove: impl Fn(&Operation) -> bool,
    ) -> Option<Operation> {
        let storage_key = key.storage_key();
        self.mutate(|table| {
            if table.get(&storage_key).is_some_and(&should_remove) {
                (table.remove(&storage_key), true)
            } else {
                (None, false)
            }
        })
    }

    pub fn get_operation(&self, key: &OperationKey) -> Option<Operation> {
        self.cache.lock().table.get(&key.storage_key()).cloned()
    }

    pub fn operations_by_type(&self, kind: &str) -> Vec<Operation> {
        self.cache.lock().table.values().filter(|op| op.kind == kind).cloned().collect()
    }

    /// Every record, ordered by type then id.
    pub fn operations(&self) -> Vec<Operation> {
        let mut ops: Vec<Operation> = self.cache.lock().table.values().cloned().collect();
        ops.sort_by(|a, b| (&a.kind, &a.id).cmp(&(&b.kind, &b.id)));
        ops
    }

    /// Records whose status is `starting`, `running` or `in_progress`.
    pub fn active_operations(&self) -> Vec<Operation> {
        self.cache.lock().table.values().filter(|op| op.is_active()).cloned().collect()
    }

    pub fn active_count(&self) -> usize {
        self.cache.lock().table.values().filter(|op| op.is_active()).count()
    }

    pub fn has_active_operation(&self, key: &OperationKey) -> bool {
        self.cache.lock().table.get(&key.storage_key()).is_some_and(Operation::is_active)
    }

    /// Remove records whose last update is strictly older than 24h.
    pub fn cleanup_old_operations(&self) -> usize {
        let now = self.clock.epoch_ms();
        let max_age = MAX_OPERATION_AGE.as_millis() as u64;
        self.mutate(|table| {
            let before = table.len();
            table.retain(|_, op| now.saturating_sub(op.last_update_ms) <= max_age);
            (before - table.len(), true)
        })
    }

    /// Remove terminal records whose last update is older than `grace`.
    pub fn cleanup_settled_operations(&self, grace: Duration) -> usize {
        let now = self.clock.epoch_ms();
        let grace = grace.as_millis() as u64;
        self.mutate(|table| {
            let before = table.len();
            table.retain(|_, op| {
                !(op.is_terminal() && now.saturating_sub(op.last_update_ms) >= grace)
            });
            let removed = before - table.len();
            (removed, removed > 0)
        })
    }

    /// Claim the poll loop for `key` on behalf of `owner`.
    ///
    /// Succeeds if the key is unclaimed or already held by `owner`.
    pub fn claim(&self, key: &OperationKey, owner: u64) -> bool {
        let mut claims = self.claims.lock();
        match claims.get(&key.storage_key()) {
            Some(holder) if *holder != owner => false,
            _ => {
                claims.insert(key.storage_key(), owner);
                true
            }
        }
    }

    /// Release a claim. Only the holder can release it.
    pub fn release(&self, key: &OperationKey, owner: u64) -> bool {
        let mut claims = self.claims.lock();
        let storage_key = key.storage_key();
        if claims.get(&storage_key) == Some(&owner) {
            claims.remove(&storage_key);
            true
        } else {
            false
        }
    }

    pub fn claimed_by(&self, key: &OperationKey) -> Option<u64> {
        self.claims.lock().get(&key.storage_key()).copied()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
