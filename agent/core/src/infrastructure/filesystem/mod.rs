// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Filesystem Implementations
//!
//! - **OsFileSystem** - `std::fs` backed, used by the agent process
//! - **InMemoryFileSystem** - HashMap backed with fault injection, used by
//!   tests that need a write, rename or chmod to fail at a precise step

pub mod memory;
pub mod os;

pub use memory::InMemoryFileSystem;
pub use os::OsFileSystem;
