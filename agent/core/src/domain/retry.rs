// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Retry contracts
//!
//! A [`Retryable`] performs one attempt of an operation and reports whether
//! another attempt is worthwhile. A [`RetryStrategy`] decides how many
//! attempts to make and how long to wait between them.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of a single attempt
#[derive(Debug)]
pub struct AttemptOutcome<E> {
    /// `false` ends the retry loop and surfaces `result` to the caller
    pub should_retry: bool,
    pub result: Result<(), E>,
}

impl<E> AttemptOutcome<E> {
    /// The attempt is final; report `result` as is
    pub fn done(result: Result<(), E>) -> Self {
        Self {
            should_retry: false,
            result,
        }
    }

    /// The attempt failed in a way that may clear up on its own
    pub fn retry(error: E) -> Self {
        Self {
            should_retry: true,
            result: Err(error),
        }
    }
}

/// One attempt of an idempotent or safe-to-repeat operation
pub trait Retryable {
    type Error;

    fn attempt(&mut self) -> AttemptOutcome<Self::Error>;
}

impl<F, E> Retryable for F
where
    F: FnMut() -> AttemptOutcome<E>,
{
    type Error = E;

    fn attempt(&mut self) -> AttemptOutcome<E> {
        self()
    }
}

/// Drives a [`Retryable`] until it reports completion or the strategy gives up
pub trait RetryStrategy {
    type Error;

    /// Run the wrapped operation. Returns the error of the last attempt made.
    fn try_run(&mut self) -> Result<(), Self::Error>;
}

/// Attempt ceiling and constant inter-attempt delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts in seconds
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: u64,
}

impl RetryPolicy {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_seconds)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_seconds: default_delay_seconds(),
        }
    }
}

fn default_max_attempts() -> u32 {
    20
}

fn default_delay_seconds() -> u64 {
    3
}
