// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Blob storage backends.
//!
//! Storage is a plain string-to-string key-value store, one blob per key,
//! always read and written whole. Backends never look inside a blob.

use crate::error::{StorageError, StorageResult};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Whole-blob key-value storage.
///
/// `compare_and_swap` is the only write the ledger uses after the first
/// load; implementations must make it atomic with respect to every other
/// call on the same instance.
pub trait Storage: Send + Sync {
    /// Returns `Ok(None)` if nothing is stored under `key`.
    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    /// Unconditionally replaces the blob under `key`.
    fn write(&self, key: &str, blob: &str) -> StorageResult<()>;

    /// Replaces the blob under `key` with `new` only if the stored blob is
    /// exactly `current` (`None` meaning "nothing stored").
    ///
    /// Returns `false`, writing nothing, when the stored blob differs.
    fn compare_and_swap(&self, key: &str, current: Option<&str>, new: &str)
    -> StorageResult<bool>;
}

/// In-memory storage for tests, benchmarks and embedding.
///
/// Uses the [`DashMap`] entry API so compare-and-swap holds the shard lock
/// for the whole check-and-insert.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.blobs.get(key).map(|blob| blob.value().clone()))
    }

    fn write(&self, key: &str, blob: &str) -> StorageResult<()> {
        self.blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn compare_and_swap(
        &self,
        key: &str,
        current: Option<&str>,
        new: &str,
    ) -> StorageResult<bool> {
        match (self.blobs.entry(key.to_string()), current) {
            (Entry::Occupied(mut entry), Some(expected)) if entry.get() == expected => {
                entry.insert(new.to_string());
                Ok(true)
            }
            (Entry::Vacant(entry), None) => {
                entry.insert(new.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// One JSON file per key inside a directory.
///
/// Writes land in a temp file in the same directory which is then renamed
/// over the target, so readers see either the old or the new blob. The
/// compare-and-swap is serialized within this process only; two processes
/// racing on the same directory can still interleave between the compare
/// and the rename.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Opens `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }

    fn read_path(path: &Path) -> StorageResult<Option<String>> {
        match fs::read_to_string(path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn replace(&self, key: &str, blob: &str) -> StorageResult<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(blob.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(key))
            .map_err(|e| StorageError::Persist {
                key: key.to_string(),
                source: e.error,
            })?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Self::read_path(&self.path_for(key))
    }

    fn write(&self, key: &str, blob: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock();
        self.replace(key, blob)
    }

    fn compare_and_swap(
        &self,
        key: &str,
        current: Option<&str>,
        new: &str,
    ) -> StorageResult<bool> {
        let _guard = self.write_lock.lock();
        let stored = Self::read_path(&self.path_for(key))?;
        if stored.as_deref() != current {
            return Ok(false);
        }
        self.replace(key, new)?;
        Ok(true)
    }
}
