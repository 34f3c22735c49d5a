// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-Memory Filesystem
//!
//! Thread-safe HashMap-backed [`FileSystem`] for tests and dry runs. Faults
//! can be injected per operation (and per path for writes) to drive the
//! failure branches of the save protocols. Renames are recorded so callers
//! can assert on the temp-then-rename sequence.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::filesystem::{FileSystem, FileSystemError, ReadOpts};

#[derive(Debug, Default)]
struct Inner {
    files: HashMap<PathBuf, Vec<u8>>,
    modes: HashMap<PathBuf, u32>,
    renames: Vec<(PathBuf, PathBuf)>,
    read_error: Option<String>,
    write_error: Option<String>,
    write_errors: HashMap<PathBuf, String>,
    rename_error: Option<String>,
    remove_error: Option<String>,
    chmod_error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryFileSystem {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents of `path`, bypassing injected faults
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.inner.lock().files.get(path.as_ref()).cloned()
    }

    /// Mode last applied to `path` through `chmod`
    pub fn mode(&self, path: impl AsRef<Path>) -> Option<u32> {
        self.inner.lock().modes.get(path.as_ref()).copied()
    }

    /// Every (old, new) pair passed to a successful `rename`, in order
    pub fn renames(&self) -> Vec<(PathBuf, PathBuf)> {
        self.inner.lock().renames.clone()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.inner.lock().files.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Fail every read
    pub fn fail_reads(&self, message: impl Into<String>) {
        self.inner.lock().read_error = Some(message.into());
    }

    /// Fail every write
    pub fn fail_writes(&self, message: impl Into<String>) {
        self.inner.lock().write_error = Some(message.into());
    }

    /// Fail writes to `path` only
    pub fn fail_write_to(&self, path: impl Into<PathBuf>, message: impl Into<String>) {
        self.inner.lock().write_errors.insert(path.into(), message.into());
    }

    pub fn fail_renames(&self, message: impl Into<String>) {
        self.inner.lock().rename_error = Some(message.into());
    }

    pub fn fail_removes(&self, message: impl Into<String>) {
        self.inner.lock().remove_error = Some(message.into());
    }

    pub fn fail_chmods(&self, message: impl Into<String>) {
        self.inner.lock().chmod_error = Some(message.into());
    }

    /// Drop all injected faults
    pub fn clear_faults(&self) {
        let mut inner = self.inner.lock();
        inner.read_error = None;
        inner.write_error = None;
        inner.write_errors.clear();
        inner.rename_error = None;
        inner.remove_error = None;
        inner.chmod_error = None;
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError> {
        let mut inner = self.inner.lock();
        if let Some(message) = inner.write_errors.get(path) {
            return Err(FileSystemError::Other(message.clone()));
        }
        if let Some(message) = &inner.write_error {
            return Err(FileSystemError::Other(message.clone()));
        }
        inner.files.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
}

impl FileSystem for InMemoryFileSystem {
    fn read_file_with_opts(&self, path: &Path, _opts: ReadOpts) -> Result<Vec<u8>, FileSystemError> {
        let inner = self.inner.lock();
        if let Some(message) = &inner.read_error {
            return Err(FileSystemError::Other(message.clone()));
        }
        inner
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| FileSystemError::NotFound(path.to_path_buf()))
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError> {
        self.write(path, contents)
    }

    fn write_file_quietly(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError> {
        self.write(path, contents)
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.inner.lock().files.contains_key(path)
    }

    fn remove_all(&self, path: &Path) -> Result<(), FileSystemError> {
        let mut inner = self.inner.lock();
        if let Some(message) = &inner.remove_error {
            return Err(FileSystemError::Other(message.clone()));
        }
        inner.files.retain(|file, _| !file.starts_with(path));
        inner.modes.retain(|file, _| !file.starts_with(path));
        Ok(())
    }

    fn rename(&self, old_path: &Path, new_path: &Path) -> Result<(), FileSystemError> {
        let mut inner = self.inner.lock();
        if let Some(message) = &inner.rename_error {
            return Err(FileSystemError::Other(message.clone()));
        }
        let contents = inner
            .files
            .remove(old_path)
            .ok_or_else(|| FileSystemError::NotFound(old_path.to_path_buf()))?;
        inner.files.insert(new_path.to_path_buf(), contents);
        if let Some(mode) = inner.modes.remove(old_path) {
            inner.modes.insert(new_path.to_path_buf(), mode);
        }
        inner.renames.push((old_path.to_path_buf(), new_path.to_path_buf()));
        Ok(())
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<(), FileSystemError> {
        let mut inner = self.inner.lock();
        if let Some(message) = &inner.chmod_error {
            return Err(FileSystemError::Other(message.clone()));
        }
        if !inner.files.contains_key(path) {
            return Err(FileSystemError::NotFound(path.to_path_buf()));
        }
        inner.modes.insert(path.to_path_buf(), mode);
        Ok(())
    }
}
