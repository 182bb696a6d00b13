// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ot-storage: persisted registry of tracked operations

mod file_store;
#[cfg(any(test, feature = "test-support"))]
mod memory;
mod registry;
mod store;

pub use file_store::FileStore;
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;
pub use registry::{ProgressUpdate, Registry, MAX_OPERATION_AGE};
pub use store::{OperationStore, OperationTable, StoreError, STORAGE_KEY};
