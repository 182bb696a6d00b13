// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ot-adapters: progress sources and outcome notifiers

pub mod http;
pub mod notify;
pub mod progress;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use http::{HttpProgressSource, ID_PLACEHOLDER};
pub use notify::{outcome_notification, DesktopNotifyAdapter, NotifyAdapter, NotifyError};
pub use progress::{ProgressError, ProgressSource};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProgressSource, FakeStep};
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
