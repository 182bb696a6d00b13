// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to flush logs before terminating.

use std::fmt;

/// A tracked operation ended in `error`.
pub const EXIT_FAILED: i32 = 1;
/// A tracked operation ended `cancelled`.
pub const EXIT_CANCELLED: i32 = 2;
/// Watching was interrupted with Ctrl-C.
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// Exit code summarizing how a batch of watched operations settled.
    ///
    /// Failures outrank cancellations. `None` when everything completed.
    pub fn from_outcomes(failed: usize, cancelled: usize) -> Option<Self> {
        if failed > 0 {
            Some(Self::new(EXIT_FAILED, format!("{failed} operation(s) failed")))
        } else if cancelled > 0 {
            Some(Self::new(EXIT_CANCELLED, format!("{cancelled} operation(s) cancelled")))
        } else {
            None
        }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
