// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ot-engine: long-poll tracking of backend operations

mod config;
mod error;
mod event;
mod removal;
mod tracker;

pub use config::{TrackerConfig, DEFAULT_POLL_INTERVAL, DEFAULT_REMOVAL_GRACE};
pub use error::TrackerError;
pub use event::TrackerEvent;
pub use tracker::{Tracker, CANCELLED_MESSAGE, STARTING_MESSAGE};
