// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Unique name generators for temporary files

use parking_lot::Mutex;
use std::sync::Arc;

use crate::domain::platform::{UuidError, UuidGenerator};

/// Random (v4) UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUuidGenerator;

impl UuidGenerator for RandomUuidGenerator {
    fn generate(&self) -> Result<String, UuidError> {
        Ok(uuid::Uuid::new_v4().to_string())
    }
}

/// Always returns the same value, or a configured error
#[derive(Debug, Clone)]
pub struct FixedUuidGenerator {
    value: Arc<Mutex<Result<String, String>>>,
}

impl FixedUuidGenerator {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Arc::new(Mutex::new(Ok(value.into()))),
        }
    }

    pub fn fail_with(&self, message: impl Into<String>) {
        *self.value.lock() = Err(message.into());
    }
}

impl UuidGenerator for FixedUuidGenerator {
    fn generate(&self) -> Result<String, UuidError> {
        self.value.lock().clone().map_err(UuidError)
    }
}
