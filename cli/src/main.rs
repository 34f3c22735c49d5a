// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # steward CLI
//!
//! Operator tool for the state a steward agent keeps on a VM: the cached
//! settings snapshot, the persistent disk registry and the DNS records
//! snapshot.
//!
//! ## Commands
//!
//! - `steward settings load|show|public-key|invalidate` - Settings snapshot
//! - `steward disks list|get|save|remove` - Persistent disk registry
//! - `steward dns show|needs-update|sync` - DNS records snapshot
//! - `steward config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod services;

use commands::{ConfigCommand, DisksCommand, DnsCommand, SettingsCommand};

/// steward - inspect and maintain agent state
#[derive(Parser)]
#[command(name = "steward")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "STEWARD_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "STEWARD_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Settings snapshot operations
    #[command(name = "settings")]
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Persistent disk registry operations
    #[command(name = "disks")]
    Disks {
        #[command(subcommand)]
        command: DisksCommand,
    },

    /// DNS records snapshot operations
    #[command(name = "dns")]
    Dns {
        #[command(subcommand)]
        command: DnsCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Settings { command } => commands::settings::handle_command(command, cli.config),
        Commands::Disks { command } => commands::disks::handle_command(command, cli.config),
        Commands::Dns { command } => commands::dns::handle_command(command, cli.config),
        Commands::Config { command } => commands::config::handle_command(command, cli.config),
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
