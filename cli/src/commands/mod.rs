// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the steward CLI

pub mod config;
pub mod disks;
pub mod dns;
pub mod settings;

pub use self::config::ConfigCommand;
pub use self::disks::DisksCommand;
pub use self::dns::DnsCommand;
pub use self::settings::SettingsCommand;
