// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ot-core: data model for tracked backend operations

pub mod macros;

pub mod clock;
pub mod operation;
pub mod progress;
pub mod status;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
#[cfg(any(test, feature = "test-support"))]
pub use operation::OperationBuilder;
pub use operation::{is_reserved_field, Operation, OperationKey, OperationSeed, RESERVED_FIELDS};
pub use progress::{clamp_progress, ProgressReport};
pub use status::OperationStatus;
pub use time_fmt::{format_elapsed, format_elapsed_ms};
