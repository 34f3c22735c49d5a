// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use steward_core::domain::agent_config::AgentConfig;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Write the default configuration
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./steward-config.yaml")]
        output: PathBuf,
    },
}

pub fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Generate { output } => generate(output),
    }
}

fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = AgentConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        match &config_override {
            Some(path) => println!("  --config: {}", path.display()),
            None => println!("  --config: {}", "(not set)".dimmed()),
        }
        for (rank, candidate) in AgentConfig::config_candidates().iter().enumerate() {
            let marker = if candidate.is_file() { "found" } else { "missing" };
            println!("  {}. {} ({})", rank + 1, candidate.display(), marker.dimmed());
        }
        println!();
    }

    println!("{}", "Paths:".bold());
    println!("  Settings cache: {}", config.paths.settings_path.display());
    println!(
        "  Persistent disk registry: {}",
        config.paths.persistent_disk_settings_path.display()
    );
    println!("  DNS records: {}", config.paths.dns_records_path.display());
    println!(
        "  Settings source: {}",
        config.paths.settings_source_path.display()
    );
    println!();

    println!("{}", "Retry:".bold());
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!("  Delay: {}s", config.retry.delay_seconds);
    println!();

    println!("{}", "Platform:".bold());
    println!("  DNS records mode: {:o}", config.platform.records_json_mode);

    Ok(())
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config =
        AgentConfig::load_or_default(config_path).context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

fn generate(output: PathBuf) -> Result<()> {
    AgentConfig::default()
        .to_yaml_file(&output)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
