// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Local DNS record snapshot
//!
//! Built fresh from the authoritative source on every sync cycle and
//! persisted wholesale through the atomic state store. Record order is kept
//! as received so downstream rendering (hosts files) is reproducible.

use serde::{Deserialize, Serialize};

use crate::domain::state::VersionedState;

/// Versioned snapshot of name-resolution records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDnsState {
    /// Version assigned by the authoritative source
    #[serde(default)]
    pub version: u64,

    /// (record name, IP address) pairs
    #[serde(default)]
    pub records: Vec<[String; 2]>,

    /// Column names for each row of `record_infos`
    /// (e.g. id, instance_group, az, network, deployment, ip)
    #[serde(default)]
    pub record_keys: Vec<String>,

    /// Rows positionally aligned with `record_keys`
    #[serde(default)]
    pub record_infos: Vec<Vec<String>>,
}

impl LocalDnsState {
    /// Look up the column index of `key` in `record_keys`
    pub fn key_index(&self, key: &str) -> Option<usize> {
        self.record_keys.iter().position(|k| k == key)
    }

    /// Values of the `key` column, one per `record_infos` row. `None` when
    /// `key` is not a column. Short rows yield an empty string.
    pub fn column(&self, key: &str) -> Option<Vec<&str>> {
        let index = self.key_index(key)?;
        Some(
            self.record_infos
                .iter()
                .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }
}

impl VersionedState for LocalDnsState {
    const KIND: &'static str = "blobstore DNS state";

    fn version(&self) -> u64 {
        self.version
    }

    fn validate(&self) -> Result<(), String> {
        let width = self.record_keys.len();
        for (row, info) in self.record_infos.iter().enumerate() {
            if info.len() != width {
                return Err(format!(
                    "record_infos row {} has {} columns, record_keys has {}",
                    row,
                    info.len(),
                    width
                ));
            }
        }
        Ok(())
    }
}
