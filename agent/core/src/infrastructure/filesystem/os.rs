// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Local Filesystem Implementation
//!
//! Thin `std::fs` adapter. Parent directories are created on write so the
//! agent can persist state on a fresh host without a separate setup step.

use std::path::Path;
use tracing::debug;

use crate::domain::filesystem::{FileSystem, FileSystemError, ReadOpts};

#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl OsFileSystem {
    pub fn new() -> Self {
        Self
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| FileSystemError::io("creating directory", parent, e))?;
        }
        std::fs::write(path, contents).map_err(|e| FileSystemError::io("writing", path, e))
    }
}

impl FileSystem for OsFileSystem {
    fn read_file_with_opts(&self, path: &Path, opts: ReadOpts) -> Result<Vec<u8>, FileSystemError> {
        if !opts.quiet {
            debug!("Reading file {}", path.display());
        }
        std::fs::read(path).map_err(|e| {
            let err = FileSystemError::io("reading", path, e);
            if !opts.quiet {
                debug!("Failed reading file {}: {}", path.display(), err);
            }
            err
        })
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError> {
        debug!("Writing file {} ({} bytes)", path.display(), contents.len());
        self.write(path, contents)
    }

    fn write_file_quietly(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError> {
        self.write(path, contents)
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_all(&self, path: &Path) -> Result<(), FileSystemError> {
        let metadata = match std::fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(FileSystemError::io("inspecting", path, e)),
        };

        let result = if metadata.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FileSystemError::io("removing", path, e)),
        }
    }

    fn rename(&self, old_path: &Path, new_path: &Path) -> Result<(), FileSystemError> {
        debug!("Renaming {} to {}", old_path.display(), new_path.display());
        std::fs::rename(old_path, new_path).map_err(|e| FileSystemError::io("renaming", old_path, e))
    }

    #[cfg(unix)]
    fn chmod(&self, path: &Path, mode: u32) -> Result<(), FileSystemError> {
        use std::os::unix::fs::PermissionsExt;

        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .map_err(|e| FileSystemError::io("setting permissions on", path, e))
    }

    #[cfg(not(unix))]
    fn chmod(&self, path: &Path, _mode: u32) -> Result<(), FileSystemError> {
        if path.exists() {
            Ok(())
        } else {
            Err(FileSystemError::NotFound(path.to_path_buf()))
        }
    }
}
