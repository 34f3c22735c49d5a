// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod clock;
pub mod filesystem;
pub mod network_resolver;
pub mod platform;
pub mod settings_source;
pub mod uuid_generator;

pub use clock::{RecordingClock, SystemClock};
pub use filesystem::{InMemoryFileSystem, OsFileSystem};
pub use platform::{ModePermissionSetter, RecordingPermissionSetter};
pub use uuid_generator::{FixedUuidGenerator, RandomUuidGenerator};
