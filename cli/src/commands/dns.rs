// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! DNS records snapshot commands
//!
//! Commands: show, needs-update, sync

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use steward_core::domain::dns_state::LocalDnsState;

use crate::services::Services;

#[derive(Subcommand)]
pub enum DnsCommand {
    /// Print the persisted DNS records snapshot
    Show {
        /// Print only this record_infos column, one value per line
        #[arg(long, value_name = "KEY")]
        column: Option<String>,
    },

    /// Report whether the snapshot is older than VERSION
    NeedsUpdate {
        #[arg(value_name = "VERSION")]
        version: u64,
    },

    /// Persist the snapshot in FILE if the current one is older
    Sync {
        #[arg(long, value_name = "FILE")]
        from: PathBuf,
    },
}

pub fn handle_command(command: DnsCommand, config_path: Option<PathBuf>) -> Result<()> {
    let services = Services::load(config_path)?;
    let store = services.dns_state();

    match command {
        DnsCommand::Show { column } => {
            let state = store
                .load_state()
                .with_context(|| format!("Failed to load {}", store.path().display()))?;
            match column {
                Some(key) => {
                    let Some(values) = state.column(&key) else {
                        anyhow::bail!(
                            "Unknown record column '{}' (known: {})",
                            key,
                            state.record_keys.join(", ")
                        );
                    };
                    for value in values {
                        println!("{}", value);
                    }
                }
                None => println!("{}", serde_json::to_string_pretty(&state)?),
            }
        }
        DnsCommand::NeedsUpdate { version } => {
            if store.needs_update(version) {
                println!("{}", format!("stale: update to version {} needed", version).yellow());
            } else {
                println!("{}", format!("current: version {} or newer present", version).green());
            }
        }
        DnsCommand::Sync { from } => {
            let contents = std::fs::read(&from)
                .with_context(|| format!("Failed to read {}", from.display()))?;
            let state: LocalDnsState = serde_json::from_slice(&contents)
                .with_context(|| format!("Failed to parse {}", from.display()))?;
            let version = state.version;

            let refreshed = store.refresh_if_stale(version, || Ok(state))?;
            if refreshed {
                println!(
                    "{}",
                    format!("✓ Saved DNS records version {} to {}", version, store.path().display())
                        .green()
                );
            } else {
                println!("{}", format!("DNS records already at version {} or newer", version).dimmed());
            }
        }
    }

    Ok(())
}
