// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Platform Capabilities
//
// Small host-provided services the core depends on but does not own:
// - unique names for temporary files
// - the platform's permission policy for published state files
// - sleeping between retry attempts

use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::domain::filesystem::FileSystemError;

/// Produces opaque identifiers that do not collide across concurrent callers.
/// Only used to name temporary files.
pub trait UuidGenerator: Send + Sync {
    fn generate(&self) -> Result<String, UuidError>;
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct UuidError(pub String);

/// Applies the platform-defined permission mode to a state file before it is
/// published.
pub trait PermissionSetter: Send + Sync {
    fn set_permissions(&self, path: &Path) -> Result<(), FileSystemError>;
}

/// Blocking time source
pub trait Clock: Send + Sync {
    fn sleep(&self, duration: Duration);
}
