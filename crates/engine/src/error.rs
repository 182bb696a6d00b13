// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors returned by tracker operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    /// Another tracker instance owns the poll loop for this operation.
    #[error("{operation_type} {id} is already tracked by another tracker")]
    AlreadyTracked { operation_type: String, id: String },
}
