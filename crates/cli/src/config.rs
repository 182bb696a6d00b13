// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Settings resolution.
//!
//! Each setting comes from the environment first, then `config.toml` in the
//! state directory, then a built-in default.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ot_adapters::ID_PLACEHOLDER;
use ot_engine::{DEFAULT_POLL_INTERVAL, DEFAULT_REMOVAL_GRACE};
use serde::Deserialize;
use thiserror::Error;

use crate::env;

pub const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Progress endpoints the backend exposes, relative to the API base.
pub const DEFAULT_PROGRESS_PATHS: &[(&str, &str)] = &[
    ("replication", "/vm-replications/replication-progress/{id}/"),
    ("restore", "/esxi-servers/restore-progress/{id}/"),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine state directory (set OT_STATE_DIR or HOME)")]
    NoStateDir,
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid config {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error(
        "no progress endpoint known for operation type '{0}' \
         (pass --url or add it under [progress] in config.toml)"
    )]
    UnknownType(String),
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub removal_grace_ms: Option<u64>,
    pub fetch_timeout_ms: Option<u64>,
    /// Operation type to path (or full URL) template containing `{id}`
    pub progress: HashMap<String, String>,
}

impl FileConfig {
    /// Read `path`. A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Read { path: path.to_path_buf(), source }),
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub state_dir: PathBuf,
    pub api_url: String,
    pub token: Option<String>,
    pub poll_interval: Duration,
    pub removal_grace: Duration,
    pub fetch_timeout: Duration,
    progress: HashMap<String, String>,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = env::state_dir()?;
        let file = FileConfig::load(&state_dir.join(CONFIG_FILE))?;
        Ok(Self::resolve(state_dir, file))
    }

    /// Layer environment overrides over `file` and the defaults.
    pub fn resolve(state_dir: PathBuf, file: FileConfig) -> Self {
        let ms = |v: Option<u64>| v.map(Duration::from_millis);

        let mut progress: HashMap<String, String> = DEFAULT_PROGRESS_PATHS
            .iter()
            .map(|(kind, path)| (kind.to_string(), path.to_string()))
            .collect();
        progress.extend(file.progress);

        Self {
            state_dir,
            api_url: env::api_url().or(file.api_url).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token: env::api_token().or(file.token),
            poll_interval: env::poll_interval()
                .or(ms(file.poll_interval_ms))
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            removal_grace: env::removal_grace()
                .or(ms(file.removal_grace_ms))
                .unwrap_or(DEFAULT_REMOVAL_GRACE),
            fetch_timeout: env::fetch_timeout()
                .or(ms(file.fetch_timeout_ms))
                .unwrap_or(DEFAULT_FETCH_TIMEOUT),
            progress,
        }
    }

    /// Progress URL template for `kind`.
    ///
    /// An explicit override wins. Configured templates that are not full
    /// URLs are appended to the API base.
    pub fn progress_url(&self, kind: &str, url_override: Option<&str>) -> Result<String, ConfigError> {
        if let Some(url) = url_override {
            return Ok(url.to_string());
        }
        let template =
            self.progress.get(kind).ok_or_else(|| ConfigError::UnknownType(kind.to_string()))?;
        if template.starts_with("http://") || template.starts_with("https://") {
            return Ok(template.clone());
        }
        let base = self.api_url.trim_end_matches('/');
        let path = template.trim_start_matches('/');
        Ok(format!("{base}/{path}"))
    }

    /// Operation types with a known progress endpoint, sorted.
    pub fn known_types(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self
            .progress
            .iter()
            .filter(|(_, template)| template.contains(ID_PLACEHOLDER))
            .map(|(kind, _)| kind.as_str())
            .collect();
        kinds.sort_unstable();
        kinds
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
