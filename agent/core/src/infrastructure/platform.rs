// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Platform permission policies for published state files

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::filesystem::{FileSystem, FileSystemError};
use crate::domain::platform::PermissionSetter;

/// Applies a fixed mode through the filesystem capability
pub struct ModePermissionSetter {
    fs: Arc<dyn FileSystem>,
    mode: u32,
}

impl ModePermissionSetter {
    pub fn new(fs: Arc<dyn FileSystem>, mode: u32) -> Self {
        Self { fs, mode }
    }
}

impl PermissionSetter for ModePermissionSetter {
    fn set_permissions(&self, path: &Path) -> Result<(), FileSystemError> {
        self.fs.chmod(path, self.mode)
    }
}

/// Records the paths it was asked about; optionally fails
#[derive(Debug, Clone, Default)]
pub struct RecordingPermissionSetter {
    paths: Arc<Mutex<Vec<PathBuf>>>,
    error: Arc<Mutex<Option<String>>>,
}

impl RecordingPermissionSetter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.lock().clone()
    }

    pub fn fail_with(&self, message: impl Into<String>) {
        *self.error.lock() = Some(message.into());
    }
}

impl PermissionSetter for RecordingPermissionSetter {
    fn set_permissions(&self, path: &Path) -> Result<(), FileSystemError> {
        self.paths.lock().push(path.to_path_buf());
        match self.error.lock().as_ref() {
            Some(message) => Err(FileSystemError::Other(message.clone())),
            None => Ok(()),
        }
    }
}
