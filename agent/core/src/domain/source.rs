// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Settings Source and Default Network Resolver contracts
//!
//! The transport used to reach the authoritative source (metadata service,
//! config drive, CD-ROM) lives behind [`SettingsSource`]. Dynamic network
//! addressing is resolved through [`DefaultNetworkResolver`].

use thiserror::Error;

use crate::domain::filesystem::FileSystemError;
use crate::domain::settings::{Network, Settings};

/// Authoritative origin of agent settings
pub trait SettingsSource: Send + Sync {
    /// Fetch the current settings
    fn settings(&self) -> Result<Settings, SourceError>;

    /// Public SSH key registered for `username`
    fn public_ssh_key_for_username(&self, username: &str) -> Result<String, SourceError>;
}

/// Resolves the addressing of the host's default network.
///
/// Resolution is keyed to the single default network; there is no lookup
/// by MAC address. If the default network does not belong to the interface
/// being configured, interface configuration fails later on.
pub trait DefaultNetworkResolver: Send + Sync {
    fn get_default_network(&self) -> Result<Network, ResolutionError>;
}

/// Errors raised by a settings source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Reading settings source: {0}")]
    Read(#[from] FileSystemError),

    #[error("Parsing settings source: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No public key for user '{0}'")]
    UnknownUser(String),

    #[error("Settings source unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while resolving the default network
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Reading route table: {0}")]
    RouteTable(#[source] std::io::Error),

    #[error("No default route found")]
    NoDefaultRoute,

    #[error("Running '{command}': {reason}")]
    Command { command: String, reason: String },

    #[error("Parsing interface address: {0}")]
    Parse(String),

    #[error("Default network unavailable: {0}")]
    Unavailable(String),
}
