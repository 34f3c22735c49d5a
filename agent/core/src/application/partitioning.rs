// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Retrying partitioner
//!
//! Partitioning tools fail transiently while the kernel is still settling a
//! freshly attached device, so each request is wrapped in the retry executor.

use std::sync::Arc;
use tracing::{debug, info};

use crate::application::retry_strategy::AttemptRetryStrategy;
use crate::domain::partition::{Partition, PartitionError, Partitioner};
use crate::domain::platform::Clock;
use crate::domain::retry::{AttemptOutcome, RetryPolicy, RetryStrategy, Retryable};

/// One partitioning request as a [`Retryable`]. Every failure is retried.
pub struct PartitionAttempt<'a> {
    partitioner: &'a dyn Partitioner,
    device_path: &'a str,
    partitions: &'a [Partition],
}

impl<'a> PartitionAttempt<'a> {
    pub fn new(
        partitioner: &'a dyn Partitioner,
        device_path: &'a str,
        partitions: &'a [Partition],
    ) -> Self {
        Self {
            partitioner,
            device_path,
            partitions,
        }
    }
}

impl Retryable for PartitionAttempt<'_> {
    type Error = PartitionError;

    fn attempt(&mut self) -> AttemptOutcome<PartitionError> {
        match self.partitioner.partition(self.device_path, self.partitions) {
            Ok(()) => AttemptOutcome::done(Ok(())),
            Err(e) => {
                debug!("Partitioning {} failed: {}", self.device_path, e);
                AttemptOutcome::retry(e)
            }
        }
    }
}

/// Partition `device_path`, retrying per `policy`. Returns the last
/// attempt's error once the budget is spent.
pub fn partition_with_retries(
    partitioner: &dyn Partitioner,
    device_path: &str,
    partitions: &[Partition],
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
) -> Result<(), PartitionError> {
    let layout: Vec<String> = partitions.iter().map(ToString::to_string).collect();
    info!("Partitioning {} with {}", device_path, layout.join(", "));

    let attempt = PartitionAttempt::new(partitioner, device_path, partitions);
    AttemptRetryStrategy::new(attempt, policy, clock).try_run()
}
