// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Persistent disk registry commands
//!
//! Commands: list, get, save, remove

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;
use tracing::warn;

use steward_core::application::{SettingsService, StandardSettingsService};
use steward_core::domain::settings::DiskSettings;

use crate::services::Services;

#[derive(Subcommand)]
pub enum DisksCommand {
    /// List inline and registered persistent disks
    List,

    /// Show the settings of one persistent disk
    Get {
        #[arg(value_name = "DISK_CID")]
        cid: String,
    },

    /// Register (or replace) a persistent disk
    Save {
        /// Disk CID
        #[arg(long)]
        id: String,

        #[arg(long)]
        path: Option<String>,

        #[arg(long)]
        volume_id: Option<String>,

        #[arg(long)]
        device_id: Option<String>,

        #[arg(long)]
        lun: Option<String>,
    },

    /// Remove a persistent disk from the registry
    Remove {
        #[arg(value_name = "DISK_CID")]
        cid: String,
    },
}

pub fn handle_command(command: DisksCommand, config_path: Option<PathBuf>) -> Result<()> {
    let services = Services::load(config_path)?;
    let service = services.settings_service();

    match command {
        DisksCommand::List => {
            load_inline_disks(&service);
            let disks = service
                .get_all_persistent_disk_settings()
                .context("Failed to read persistent disk settings")?;

            if disks.is_empty() {
                println!("{}", "No persistent disks".dimmed());
                return Ok(());
            }

            let mut cids: Vec<&String> = disks.keys().collect();
            cids.sort();
            println!(
                "{}",
                format!("{:<40} {:<20} {}", "CID", "PATH", "VOLUME").bold()
            );
            for cid in cids {
                let disk = &disks[cid];
                println!(
                    "{:<40} {:<20} {}",
                    cid,
                    disk.path.as_deref().unwrap_or("-"),
                    disk.volume_id.as_deref().unwrap_or("-")
                );
            }
        }
        DisksCommand::Get { cid } => {
            load_inline_disks(&service);
            let disk = service.get_persistent_disk_settings(&cid)?;
            println!("{}", serde_json::to_string_pretty(&disk)?);
        }
        DisksCommand::Save {
            id,
            path,
            volume_id,
            device_id,
            lun,
        } => {
            let disk = DiskSettings {
                id: id.clone(),
                path,
                volume_id,
                device_id,
                lun,
                ..Default::default()
            };
            service
                .save_persistent_disk_settings(disk)
                .with_context(|| format!("Failed to save persistent disk '{}'", id))?;
            println!("{}", format!("✓ Saved persistent disk {}", id).green());
        }
        DisksCommand::Remove { cid } => {
            service
                .remove_persistent_disk_settings(&cid)
                .with_context(|| format!("Failed to remove persistent disk '{}'", cid))?;
            println!("{}", format!("✓ Removed persistent disk {}", cid).green());
        }
    }

    Ok(())
}

/// Inline disk references live in the settings snapshot. Without settings
/// only the registry is listed.
fn load_inline_disks(service: &StandardSettingsService) {
    if let Err(e) = service.load_settings() {
        warn!("Settings unavailable, showing registered disks only: {}", e);
    }
}
