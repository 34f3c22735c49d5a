// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Versioned state documents
//!
//! A versioned state document is persisted wholesale as JSON and carries a
//! version stamp assigned by the authoritative source. The stamp is only ever
//! compared, never incremented locally.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::domain::filesystem::FileSystemError;
use crate::domain::platform::UuidError;

/// A JSON document with an externally assigned version
pub trait VersionedState: Serialize + DeserializeOwned {
    /// Human readable name used in error messages (e.g. "blobstore DNS state")
    const KIND: &'static str;

    fn version(&self) -> u64;

    /// Structural checks run after decoding. Returns a description of the
    /// first violation.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Errors raised while loading or saving a versioned state document.
///
/// Only a successful rename publishes new content, so none of the save
/// variants imply that the previously persisted file changed.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("reading state file: {0}")]
    Read(#[source] FileSystemError),

    #[error("unmarshalling state file: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid state file: {0}")]
    Invalid(String),

    #[error("generating uuid for temp file: {0}")]
    UuidGeneration(#[source] UuidError),

    #[error("marshalling the {kind}: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("writing the {kind}: {source}")]
    Write {
        kind: &'static str,
        #[source]
        source: FileSystemError,
    },

    #[error("setting permissions of {kind}: {source}")]
    Permission {
        kind: &'static str,
        #[source]
        source: FileSystemError,
    },

    #[error("renaming: {0}")]
    Rename(#[source] FileSystemError),
}
