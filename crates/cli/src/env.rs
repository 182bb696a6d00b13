// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigError;

/// Resolve state directory: OT_STATE_DIR > XDG_STATE_HOME/ot > ~/.local/state/ot
pub fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = non_empty("OT_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("ot"));
    }
    let home = dirs::home_dir().ok_or(ConfigError::NoStateDir)?;
    Ok(home.join(".local/state/ot"))
}

/// Backend API base URL, e.g. `http://backup-host:8000/api`
pub fn api_url() -> Option<String> {
    non_empty("OT_API_URL")
}

/// Token sent as `Authorization: Token <token>`
pub fn api_token() -> Option<String> {
    non_empty("OT_API_TOKEN")
}

pub fn poll_interval() -> Option<Duration> {
    duration_ms("OT_POLL_INTERVAL_MS")
}

/// How long settled records stay before removal
pub fn removal_grace() -> Option<Duration> {
    duration_ms("OT_REMOVAL_GRACE_MS")
}

pub fn fetch_timeout() -> Option<Duration> {
    duration_ms("OT_FETCH_TIMEOUT_MS")
}

/// Log filter directives: OT_LOG > RUST_LOG
pub fn log_filter() -> Option<String> {
    non_empty("OT_LOG").or_else(|| non_empty("RUST_LOG"))
}

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.is_empty())
}

fn duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}
