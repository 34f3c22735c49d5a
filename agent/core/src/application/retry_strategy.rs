// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Bounded, constant-delay retry executor
//!
//! Calls a [`Retryable`] until it reports completion or the attempt ceiling
//! is reached, sleeping a fixed delay between attempts. No backoff, no
//! jitter. Runs on the caller's thread and cannot interrupt a hung attempt.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::platform::Clock;
use crate::domain::retry::{RetryPolicy, RetryStrategy, Retryable};

pub struct AttemptRetryStrategy<R> {
    retryable: R,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl<R: Retryable> AttemptRetryStrategy<R> {
    pub fn new(retryable: R, policy: RetryPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            retryable,
            policy,
            clock,
        }
    }

    pub fn into_inner(self) -> R {
        self.retryable
    }
}

impl<R: Retryable> RetryStrategy for AttemptRetryStrategy<R> {
    type Error = R::Error;

    fn try_run(&mut self) -> Result<(), R::Error> {
        // A zero ceiling still makes one attempt; there is no error to return otherwise.
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!("Making attempt #{}", attempt);
            let outcome = self.retryable.attempt();

            if !outcome.should_retry {
                return outcome.result;
            }
            if attempt >= max_attempts {
                warn!("Giving up after {} attempts", attempt);
                return outcome.result;
            }

            self.clock.sleep(self.policy.delay());
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::retry::AttemptOutcome;
    use crate::infrastructure::clock::RecordingClock;
    use std::time::Duration;

    struct CountingRetryable {
        attempts: u32,
        stop_at: Option<u32>,
    }

    impl CountingRetryable {
        fn always_retry() -> Self {
            Self {
                attempts: 0,
                stop_at: None,
            }
        }

        fn stop_at(attempt: u32) -> Self {
            Self {
                attempts: 0,
                stop_at: Some(attempt),
            }
        }
    }

    impl Retryable for CountingRetryable {
        type Error = String;

        fn attempt(&mut self) -> AttemptOutcome<String> {
            self.attempts += 1;
            if self.stop_at == Some(self.attempts) {
                return AttemptOutcome::done(Ok(()));
            }
            AttemptOutcome::retry(format!("error-{}", self.attempts))
        }
    }

    #[test]
    fn test_exhausts_budget_and_returns_last_error() {
        let clock = RecordingClock::new();
        let mut strategy = AttemptRetryStrategy::new(
            CountingRetryable::always_retry(),
            RetryPolicy::default(),
            Arc::new(clock.clone()),
        );

        let err = strategy.try_run().unwrap_err();

        assert_eq!(err, "error-20");
        assert_eq!(strategy.into_inner().attempts, 20);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(3); 19]);
    }

    #[test]
    fn test_stops_on_first_non_retry_outcome() {
        for k in [1, 5, 20] {
            let clock = RecordingClock::new();
            let mut strategy = AttemptRetryStrategy::new(
                CountingRetryable::stop_at(k),
                RetryPolicy::default(),
                Arc::new(clock.clone()),
            );

            strategy.try_run().unwrap();

            assert_eq!(strategy.into_inner().attempts, k);
            assert_eq!(clock.sleeps().len(), (k - 1) as usize);
        }
    }

    #[test]
    fn test_non_retry_error_is_returned_immediately() {
        let clock = RecordingClock::new();
        let mut calls = 0;
        let mut strategy = AttemptRetryStrategy::new(
            || {
                calls += 1;
                AttemptOutcome::done(Err("fatal"))
            },
            RetryPolicy::default(),
            Arc::new(clock.clone()),
        );

        assert_eq!(strategy.try_run().unwrap_err(), "fatal");
        drop(strategy);
        assert_eq!(calls, 1);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn test_custom_policy() {
        let clock = RecordingClock::new();
        let policy = RetryPolicy {
            max_attempts: 3,
            delay_seconds: 1,
        };
        let mut strategy = AttemptRetryStrategy::new(
            CountingRetryable::always_retry(),
            policy,
            Arc::new(clock.clone()),
        );

        assert_eq!(strategy.try_run().unwrap_err(), "error-3");
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1); 2]);
    }

    #[test]
    fn test_zero_ceiling_makes_one_attempt() {
        let clock = RecordingClock::new();
        let policy = RetryPolicy {
            max_attempts: 0,
            delay_seconds: 3,
        };
        let mut strategy = AttemptRetryStrategy::new(
            CountingRetryable::always_retry(),
            policy,
            Arc::new(clock.clone()),
        );

        assert_eq!(strategy.try_run().unwrap_err(), "error-1");
        assert!(clock.sleeps().is_empty());
    }
}
