// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deferred removal of settled operations.
//!
//! A settled record stays in the registry for a grace period so front ends
//! can show its final status. At most one removal is pending per key;
//! scheduling again replaces it and restarting a key cancels it. When the
//! timer fires the record is removed only if it is still terminal.

use ot_core::{Clock, Operation, OperationKey};
use ot_storage::{OperationStore, Registry};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

struct Pending {
    seq: u64,
    cancel: CancellationToken,
}

#[derive(Default)]
struct PendingTable {
    next_seq: u64,
    by_key: HashMap<String, Pending>,
}

#[derive(Clone, Default)]
pub(crate) struct DeferredRemovals {
    inner: Arc<Mutex<PendingTable>>,
}

impl DeferredRemovals {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Remove `key` from `registry` after `grace`, if it is still terminal then.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn schedule<S: OperationStore, C: Clock>(
        &self,
        registry: Arc<Registry<S, C>>,
        key: OperationKey,
        grace: Duration,
    ) {
        let cancel = CancellationToken::new();
        let seq = {
            let mut table = self.inner.lock();
            table.next_seq += 1;
            let seq = table.next_seq;
            let pending = Pending { seq, cancel: cancel.clone() };
            if let Some(previous) = table.by_key.insert(key.storage_key(), pending) {
                previous.cancel.cancel();
            }
            seq
        };

        let pending = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(grace) => {}
            }
            {
                let mut table = pending.lock();
                if table.by_key.get(&key.storage_key()).is_some_and(|p| p.seq == seq) {
                    table.by_key.remove(&key.storage_key());
                }
            }
            match registry.remove_if(&key, Operation::is_terminal) {
                Some(op) => {
                    tracing::info!(
                        operation_type = %key.kind,
                        id = %key.id,
                        status = %op.status,
                        "removed settled operation"
                    );
                }
                None => {
                    tracing::debug!(operation_type = %key.kind, id = %key.id, "settled operation kept");
                }
            }
        });
    }

    /// Cancel the pending removal for `key`. Returns whether one was pending.
    pub(crate) fn cancel(&self, key: &OperationKey) -> bool {
        match self.inner.lock().by_key.remove(&key.storage_key()) {
            Some(pending) => {
                pending.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub(crate) fn is_pending(&self, key: &OperationKey) -> bool {
        self.inner.lock().by_key.contains_key(&key.storage_key())
    }
}

#[cfg(test)]
#[path = "removal_tests.rs"]
mod tests;
