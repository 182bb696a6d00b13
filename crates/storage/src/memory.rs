// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store for tests.

use crate::store::{OperationStore, OperationTable, StoreError};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct MemoryState {
    table: Option<OperationTable>,
    saves: usize,
    fail_load: bool,
    fail_save: bool,
}

/// Fake store keeping the last saved table in memory.
///
/// Clones share state, so a test can hand one clone to a registry and inspect
/// what was persisted through the other.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with a table, as if saved by an earlier process.
    pub fn with_table(table: OperationTable) -> Self {
        let store = Self::new();
        store.inner.lock().table = Some(table);
        store
    }

    /// Last persisted table, if any.
    pub fn table(&self) -> Option<OperationTable> {
        self.inner.lock().table.clone()
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.inner.lock().saves
    }

    pub fn fail_load(&self, fail: bool) {
        self.inner.lock().fail_load = fail;
    }

    pub fn fail_save(&self, fail: bool) {
        self.inner.lock().fail_save = fail;
    }
}

impl OperationStore for MemoryStore {
    fn load(&self) -> Result<Option<OperationTable>, StoreError> {
        let state = self.inner.lock();
        if state.fail_load {
            return Err(StoreError::Unavailable("load disabled".into()));
        }
        Ok(state.table.clone())
    }

    fn save(&self, table: &OperationTable) -> Result<(), StoreError> {
        let mut state = self.inner.lock();
        if state.fail_save {
            return Err(StoreError::Unavailable("save disabled".into()));
        }
        state.table = Some(table.clone());
        state.saves += 1;
        Ok(())
    }

    fn update(
        &self,
        mutate: &mut dyn FnMut(&mut OperationTable) -> bool,
    ) -> Result<OperationTable, StoreError> {
        let mut state = self.inner.lock();
        if state.fail_load {
            return Err(StoreError::Unavailable("load disabled".into()));
        }
        let mut table = state.table.clone().unwrap_or_default();
        if mutate(&mut table) {
            if state.fail_save {
                return Err(StoreError::Unavailable("save disabled".into()));
            }
            state.table = Some(table.clone());
            state.saves += 1;
        }
        Ok(table)
    }
}
