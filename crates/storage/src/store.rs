// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence adapter seam for the registry.

use ot_core::Operation;
use std::collections::HashMap;
use thiserror::Error;

/// Name of the persistent slot holding the operation table.
pub const STORAGE_KEY: &str = "esxi_operations";

/// The persisted table: registry key (`{type}_{id}`) → record.
pub type OperationTable = HashMap<String, Operation>;

/// Errors that can occur while loading or saving the table
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable slot holding the operation table.
///
/// Implementations store the whole table as one blob. Several registries,
/// possibly in different processes, may share one slot, so the registry
/// mutates it through [`OperationStore::update`]. The registry treats every
/// error as non-fatal.
pub trait OperationStore: Send + Sync + 'static {
    /// Load the table. `Ok(None)` means nothing has been saved yet.
    fn load(&self) -> Result<Option<OperationTable>, StoreError>;

    /// Replace the stored table.
    fn save(&self, table: &OperationTable) -> Result<(), StoreError>;

    /// Read the latest table, apply `mutate` and save the result if `mutate`
    /// returns `true`. Returns the table as it now stands in the store.
    ///
    /// Implementations shared between processes hold an exclusive lock from
    /// the read to the save.
    fn update(
        &self,
        mutate: &mut dyn FnMut(&mut OperationTable) -> bool,
    ) -> Result<OperationTable, StoreError> {
        let mut table = self.load()?.unwrap_or_default();
        if mutate(&mut table) {
            self.save(&table)?;
        }
        Ok(table)
    }
}
