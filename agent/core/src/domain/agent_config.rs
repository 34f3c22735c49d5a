// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Agent Configuration Types
//
// Where the agent keeps its durable state and how it retries flaky
// low-level operations:
// - settings cache, persistent disk registry and DNS record paths
// - retry ceiling and delay for disk partitioning
// - permission mode for published state files

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::retry::RetryPolicy;

/// Environment variable naming a configuration file
pub const CONFIG_PATH_ENV: &str = "STEWARD_CONFIG_PATH";

/// Top-level agent configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    /// Attempt budget for the retrying disk partitioner. The agent that
    /// embeds this crate passes it to `partition_with_retries`; the CLI only
    /// reports it.
    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub platform: PlatformConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Last-known-good copy of the fetched settings
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,

    /// Registry of persistent disk attachments keyed by disk CID
    #[serde(default = "default_persistent_disk_settings_path")]
    pub persistent_disk_settings_path: PathBuf,

    /// Persisted DNS record snapshot
    #[serde(default = "default_dns_records_path")]
    pub dns_records_path: PathBuf,

    /// Settings document read by the file-backed settings source
    #[serde(default = "default_settings_source_path")]
    pub settings_source_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
            persistent_disk_settings_path: default_persistent_disk_settings_path(),
            dns_records_path: default_dns_records_path(),
            settings_source_path: default_settings_source_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Mode applied to the DNS records file before it is published
    #[serde(default = "default_records_json_mode")]
    pub records_json_mode: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            records_json_mode: default_records_json_mode(),
        }
    }
}

// Default value functions
fn default_settings_path() -> PathBuf {
    PathBuf::from("/var/vcap/bosh/settings.json")
}

fn default_persistent_disk_settings_path() -> PathBuf {
    PathBuf::from("/var/vcap/bosh/persistent_disk_hints.json")
}

fn default_dns_records_path() -> PathBuf {
    PathBuf::from("/var/vcap/instance/dns/records.json")
}

fn default_settings_source_path() -> PathBuf {
    PathBuf::from("/var/vcap/bosh/agent-settings-source.json")
}

fn default_records_json_mode() -> u32 {
    0o644
}

fn candidate_paths(from_env: Option<PathBuf>, home: Option<PathBuf>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = from_env
        .into_iter()
        .filter(|path| !path.as_os_str().is_empty())
        .collect();
    candidates.push(PathBuf::from("./steward-config.yaml"));
    candidates.extend(home.map(|home| home.join(".steward").join("config.yaml")));
    candidates.push(PathBuf::from("/etc/steward/config.yaml"));
    candidates
}

impl AgentConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Files checked for configuration, highest precedence first.
    /// An explicit `--config` path bypasses this list.
    pub fn config_candidates() -> Vec<PathBuf> {
        candidate_paths(
            std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
            dirs::home_dir(),
        )
    }

    /// First candidate that is a regular file
    pub fn discover_config() -> Option<PathBuf> {
        Self::config_candidates()
            .into_iter()
            .find(|candidate| candidate.is_file())
    }

    /// Read `explicit` if given, else the discovered file, else defaults.
    /// Environment overrides are applied last in every case.
    pub fn load_or_default(explicit: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = match explicit.or_else(Self::discover_config) {
            Some(path) => {
                tracing::info!(path = %path.display(), "Reading agent configuration");
                Self::from_yaml_file(&path)
                    .with_context(|| format!("Failed to load config at {}", path.display()))?
            }
            None => {
                tracing::warn!("No agent configuration file found, using built-in defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("STEWARD_SETTINGS_PATH") {
            if val.is_empty() {
                tracing::warn!("Ignoring empty STEWARD_SETTINGS_PATH");
            } else {
                tracing::info!("Environment override: STEWARD_SETTINGS_PATH={}", val);
                self.paths.settings_path = PathBuf::from(val);
            }
        }

        if let Ok(val) = std::env::var("STEWARD_DNS_RECORDS_PATH") {
            if val.is_empty() {
                tracing::warn!("Ignoring empty STEWARD_DNS_RECORDS_PATH");
            } else {
                tracing::info!("Environment override: STEWARD_DNS_RECORDS_PATH={}", val);
                self.paths.dns_records_path = PathBuf::from(val);
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let paths = [
            ("paths.settings_path", &self.paths.settings_path),
            (
                "paths.persistent_disk_settings_path",
                &self.paths.persistent_disk_settings_path,
            ),
            ("paths.dns_records_path", &self.paths.dns_records_path),
            ("paths.settings_source_path", &self.paths.settings_source_path),
        ];
        for (name, path) in paths {
            if path.as_os_str().is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }
        }

        if self.paths.settings_path == self.paths.persistent_disk_settings_path {
            anyhow::bail!(
                "paths.settings_path and paths.persistent_disk_settings_path must differ (both {:?})",
                self.paths.settings_path
            );
        }

        if self.retry.max_attempts == 0 {
            anyhow::bail!("retry.max_attempts must be at least 1");
        }

        if self.platform.records_json_mode > 0o7777 {
            anyhow::bail!(
                "platform.records_json_mode {:o} is not a permission mode",
                self.platform.records_json_mode
            );
        }

        Ok(())
    }
}
