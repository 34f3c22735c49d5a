// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Filesystem Capability - Anti-Corruption Layer for local disk access
//!
//! Every file the agent persists (cached settings, the persistent disk
//! registry, DNS record snapshots) goes through this trait so the
//! durability logic can be exercised against an in-memory double with
//! injected faults.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Options for [`FileSystem::read_file_with_opts`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOpts {
    /// Suppress logging when the read fails. Used where a missing file is an
    /// expected fallback path rather than a fault.
    pub quiet: bool,
}

impl ReadOpts {
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

/// Local filesystem operations consumed by the state store and the settings
/// service.
///
/// Implementations must make `rename` atomic with respect to readers of the
/// destination path: a reader sees either the old content or the new one.
pub trait FileSystem: Send + Sync {
    /// Read the whole file at `path`
    fn read_file_with_opts(&self, path: &Path, opts: ReadOpts) -> Result<Vec<u8>, FileSystemError>;

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, FileSystemError> {
        self.read_file_with_opts(path, ReadOpts::default())
    }

    /// Create or truncate `path` and write `contents` to it
    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError>;

    /// Same as [`FileSystem::write_file`] without logging the write
    fn write_file_quietly(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError>;

    fn file_exists(&self, path: &Path) -> bool;

    /// Remove a file or directory tree. Removing a missing path succeeds.
    fn remove_all(&self, path: &Path) -> Result<(), FileSystemError>;

    /// Atomically replace `new_path` with `old_path`
    fn rename(&self, old_path: &Path, new_path: &Path) -> Result<(), FileSystemError>;

    /// Set the POSIX permission bits of `path`
    fn chmod(&self, path: &Path, mode: u32) -> Result<(), FileSystemError>;
}

/// Filesystem errors
#[derive(Debug, Error)]
pub enum FileSystemError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl FileSystemError {
    pub fn io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return FileSystemError::NotFound(path.to_path_buf());
        }
        FileSystemError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FileSystemError::NotFound(_))
    }
}
