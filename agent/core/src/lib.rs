// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # steward-core
//!
//! Persistent local state for the steward VM agent.
//!
//! # Architecture
//!
//! - **Domain:** settings, DNS state and partition types plus the collaborator
//!   traits (filesystem, settings source, network resolver, clock).
//! - **Application:** the settings reconciliation service, the atomic versioned
//!   state store and the bounded retry strategy.
//! - **Infrastructure:** OS and in-memory implementations of the collaborators.

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
