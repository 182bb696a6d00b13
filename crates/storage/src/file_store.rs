// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON file persistence.
//!
//! The table is written to `<dir>/esxi_operations.json` via a per-process
//! temp file and rename, so readers never observe a half-written table.
//! Writers serialize on an advisory lock on `esxi_operations.lock`; an
//! update re-reads the file under that lock, so concurrent `ot` processes
//! merge their changes instead of overwriting each other. A file that fails
//! to parse is moved aside to a rotating `.bak` so the next save does not
//! destroy it.

use crate::store::{OperationStore, OperationTable, StoreError, STORAGE_KEY};
use fs2::FileExt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const MAX_BAK_FILES: u32 = 3;

/// Operation table stored as a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store at an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/esxi_operations.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{STORAGE_KEY}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileStore {
    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// Open the lock file and block until this handle holds it exclusively.
    /// The lock is released when the returned file is dropped.
    fn lock(&self) -> Result<fs::File, StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())?;
        file.lock_exclusive()?;
        Ok(file)
    }

    fn read_table(&self) -> Result<Option<OperationTable>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice::<OperationTable>(&bytes) {
            Ok(table) => Ok(Some(table)),
            Err(e) => {
                let bak = rotate_bak_path(&self.path);
                if let Err(rename_err) = fs::rename(&self.path, &bak) {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %rename_err,
                        "failed to move unreadable operation table aside"
                    );
                } else {
                    tracing::warn!(
                        path = %self.path.display(),
                        backup = %bak.display(),
                        "unreadable operation table moved aside"
                    );
                }
                Err(e.into())
            }
        }
    }

    fn write_table(&self, table: &OperationTable) -> Result<(), StoreError> {
        let tmp = self.path.with_extension(format!("json.tmp.{}", std::process::id()));
        let json = serde_json::to_vec(table)?;
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

impl OperationStore for FileStore {
    fn load(&self) -> Result<Option<OperationTable>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let _lock = self.lock()?;
        self.read_table()
    }

    fn save(&self, table: &OperationTable) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        self.write_table(table)
    }

    fn update(
        &self,
        mutate: &mut dyn FnMut(&mut OperationTable) -> bool,
    ) -> Result<OperationTable, StoreError> {
        let _lock = self.lock()?;
        let mut table = match self.read_table() {
            Ok(table) => table.unwrap_or_default(),
            // read_table moved the unreadable file aside
            Err(StoreError::Json(_)) => OperationTable::new(),
            Err(e) => return Err(e),
        };
        if mutate(&mut table) {
            self.write_table(&table)?;
        }
        Ok(table)
    }
}

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "file_store_tests.rs"]
mod tests;
