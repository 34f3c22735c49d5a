// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain types and collaborator contracts.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Settings model, versioned state model, partition model and
//!   the traits the application layer consumes

pub mod agent_config;
pub mod dns_state;
pub mod filesystem;
pub mod partition;
pub mod platform;
pub mod retry;
pub mod settings;
pub mod source;
pub mod state;
