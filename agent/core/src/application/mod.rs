// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application services: settings reconciliation, versioned state
//! persistence and retrying execution.

pub mod partitioning;
pub mod retry_strategy;
pub mod settings_service;
pub mod state_store;

pub use partitioning::{partition_with_retries, PartitionAttempt};
pub use retry_strategy::AttemptRetryStrategy;
pub use settings_service::{SettingsError, SettingsService, StandardSettingsService};
pub use state_store::{AtomicStateStore, SyncDnsState};
