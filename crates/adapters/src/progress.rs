// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use ot_core::ProgressReport;
use thiserror::Error;

/// Errors from a progress fetch.
///
/// All of these are transient from the tracker's point of view: the poll loop
/// logs them and tries again on the next tick.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("invalid progress url: {0}")]
    InvalidUrl(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("progress request timed out")]
    Timeout,
    #[error("backend returned HTTP {code}")]
    Status { code: u16, body: String },
    #[error("malformed progress body: {0}")]
    Decode(String),
    #[error("progress body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
}

/// Where a tracker learns the backend's view of an operation.
#[async_trait]
pub trait ProgressSource: Clone + Send + Sync + 'static {
    /// Fetch the current progress of operation `id`.
    async fn fetch_progress(&self, id: &str) -> Result<ProgressReport, ProgressError>;
}
