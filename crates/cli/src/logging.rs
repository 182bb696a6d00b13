// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::env;

const DEFAULT_FILTER: &str = "info";

/// Log file name inside `<state_dir>/logs`
pub const LOG_FILE: &str = "ot.log";

/// Install the global subscriber.
///
/// Logs go to `<state_dir>/logs/ot.log`, or to stderr when `verbose`. The
/// returned guard flushes the file writer on drop and must outlive the
/// command.
pub fn init(state_dir: &Path, verbose: bool) -> Option<WorkerGuard> {
    let filter = env::log_filter()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    if verbose {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
        return None;
    }

    let log_dir = state_dir.join("logs");
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("warning: cannot create log directory {}: {e}", log_dir.display());
        return None;
    }
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(&log_dir, LOG_FILE));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}
