// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Wires the core services to real collaborators from the loaded config

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use steward_core::application::{StandardSettingsService, SyncDnsState};
use steward_core::domain::agent_config::AgentConfig;
use steward_core::domain::filesystem::FileSystem;
use steward_core::infrastructure::network_resolver::RouteTableNetworkResolver;
use steward_core::infrastructure::settings_source::FileSettingsSource;
use steward_core::infrastructure::{ModePermissionSetter, OsFileSystem, RandomUuidGenerator};

pub struct Services {
    pub config: AgentConfig,
    fs: Arc<dyn FileSystem>,
}

impl Services {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config =
            AgentConfig::load_or_default(config_path).context("Failed to load configuration")?;
        config
            .validate()
            .context("Configuration validation failed")?;

        Ok(Self {
            config,
            fs: Arc::new(OsFileSystem::new()),
        })
    }

    pub fn settings_service(&self) -> StandardSettingsService {
        let paths = &self.config.paths;
        StandardSettingsService::new(
            self.fs.clone(),
            &paths.settings_path,
            &paths.persistent_disk_settings_path,
            Arc::new(FileSettingsSource::new(
                self.fs.clone(),
                &paths.settings_source_path,
            )),
            Arc::new(RouteTableNetworkResolver::default()),
        )
    }

    pub fn dns_state(&self) -> SyncDnsState {
        SyncDnsState::new(
            self.fs.clone(),
            Arc::new(ModePermissionSetter::new(
                self.fs.clone(),
                self.config.platform.records_json_mode,
            )),
            Arc::new(RandomUuidGenerator),
            &self.config.paths.dns_records_path,
        )
    }
}
