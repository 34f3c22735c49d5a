// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Settings snapshot commands
//!
//! Commands: load, show, public-key, invalidate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use steward_core::application::SettingsService;

use crate::services::Services;

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Fetch settings from the source (or the cache) and refresh the cache
    Load,

    /// Load settings and print the resolved snapshot as JSON
    Show,

    /// Print the public SSH key registered for a user
    PublicKey {
        #[arg(value_name = "USERNAME")]
        username: String,
    },

    /// Delete the cached settings file
    Invalidate,
}

pub fn handle_command(command: SettingsCommand, config_path: Option<PathBuf>) -> Result<()> {
    let services = Services::load(config_path)?;
    let service = services.settings_service();

    match command {
        SettingsCommand::Load => {
            service.load_settings().context("Failed to load settings")?;
            println!(
                "{}",
                format!(
                    "✓ Settings loaded (cache: {})",
                    service.settings_path().display()
                )
                .green()
            );
        }
        SettingsCommand::Show => {
            service.load_settings().context("Failed to load settings")?;
            let settings = service.get_settings();
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsCommand::PublicKey { username } => {
            let key = service
                .public_ssh_key_for_username(&username)
                .with_context(|| format!("Failed to look up public key for '{}'", username))?;
            println!("{}", key);
        }
        SettingsCommand::Invalidate => {
            service
                .invalidate_settings()
                .context("Failed to invalidate settings")?;
            println!(
                "{}",
                format!(
                    "✓ Removed cached settings {}",
                    service.settings_path().display()
                )
                .green()
            );
        }
    }

    Ok(())
}
