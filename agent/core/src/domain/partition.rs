// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Disk partition model
//!
//! A [`Partition`] describes a desired end state for one partition. The tool
//! that applies it (sfdisk, parted, ...) sits behind [`Partitioner`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionType {
    Swap,
    Linux,
    Empty,
    Unknown,
}

impl fmt::Display for PartitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PartitionType::Swap => "swap",
            PartitionType::Linux => "linux",
            PartitionType::Empty => "empty",
            PartitionType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Explicit sector placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSectorInfo {
    pub start: u64,
    pub size_in_sectors: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub size_in_bytes: u64,

    #[serde(rename = "type")]
    pub partition_type: PartitionType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_info: Option<PartitionSectorInfo>,
}

impl Partition {
    pub fn new(size_in_bytes: u64, partition_type: PartitionType) -> Self {
        Self {
            size_in_bytes,
            partition_type,
            sector_info: None,
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Type: {}, SizeInBytes: {}]",
            self.partition_type, self.size_in_bytes
        )
    }
}

/// Applies a partition layout to a block device
pub trait Partitioner: Send + Sync {
    fn partition(&self, device_path: &str, partitions: &[Partition]) -> Result<(), PartitionError>;

    fn get_device_size_in_bytes(&self, device_path: &str) -> Result<u64, PartitionError>;
}

#[derive(Debug, Error)]
pub enum PartitionError {
    #[error("Partitioning disk '{device}': {reason}")]
    Failed { device: String, reason: String },

    #[error("Getting size of device '{device}': {reason}")]
    DeviceSize { device: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let partition = Partition::new(1024, PartitionType::Swap);
        assert_eq!(partition.to_string(), "[Type: swap, SizeInBytes: 1024]");
    }

    #[test]
    fn test_sector_info_is_optional_on_the_wire() {
        let partition: Partition =
            serde_json::from_str(r#"{"size_in_bytes": 2048, "type": "linux"}"#).unwrap();
        assert_eq!(partition, Partition::new(2048, PartitionType::Linux));

        let placed: Partition = serde_json::from_str(
            r#"{"size_in_bytes": 2048, "type": "empty", "sector_info": {"start": 2048, "size_in_sectors": 4}}"#,
        )
        .unwrap();
        assert_eq!(
            placed.sector_info,
            Some(PartitionSectorInfo {
                start: 2048,
                size_in_sectors: 4
            })
        );
    }
}
