// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Settings Reconciliation Service
//!
//! Owns the agent's in-memory settings snapshot and the on-disk registry of
//! persistent disk attachments.
//!
//! # Architecture
//!
//! - **Layer:** Application
//! - **Collaborators:**
//!   - Domain: [`SettingsSource`], [`DefaultNetworkResolver`], [`FileSystem`]
//!   - Infrastructure: any adapter implementing those traits
//!
//! # Flow
//!
//! 1. `load_settings` fetches from the source outside any lock, swaps the
//!    snapshot in, then caches it on disk. If the fetch fails the last cached
//!    copy is adopted instead.
//! 2. `get_settings` copies the snapshot out and resolves DHCP networks on
//!    the copy. The stored snapshot is never resolved in place.
//! 3. Disk registry calls read-modify-write the registry file under their
//!    own lock so they never wait on a settings fetch.
//!
//! Lock order is registry lock, then snapshot lock. The snapshot lock is
//! never held across source, resolver or filesystem calls.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::domain::filesystem::{FileSystem, FileSystemError, ReadOpts};
use crate::domain::settings::{merge_persistent_disks, DiskSettings, Settings};
use crate::domain::source::{DefaultNetworkResolver, SettingsSource, SourceError};

#[derive(Debug, Error)]
pub enum SettingsError {
    /// The source failed and no usable cached copy exists. Carries the
    /// source's error, not the cache's.
    #[error("Invoking settings fetcher: {0}")]
    Fetch(#[source] SourceError),

    #[error("Marshalling settings json: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Writing setting json: {0}")]
    Write(#[source] FileSystemError),

    #[error("Removing settings file: {0}")]
    Invalidate(#[source] FileSystemError),

    #[error("Persistent disk with volume id '{0}' could not be found")]
    DiskNotFound(String),

    #[error("Reading persistent disk settings from file: {0}")]
    RegistryRead(#[source] FileSystemError),

    #[error("Unmarshalling persistent disk settings from file: {0}")]
    RegistryDecode(#[source] serde_json::Error),

    #[error("Marshalling persistent disk settings json: {0}")]
    RegistryEncode(#[source] serde_json::Error),

    #[error("Writing persistent disk settings json: {0}")]
    RegistryWrite(#[source] FileSystemError),
}

/// Settings Reconciliation Service
pub trait SettingsService: Send + Sync {
    /// Refresh the snapshot from the source, falling back to the cached copy.
    ///
    /// # Errors
    ///
    /// - Fetch: source failed and the cache is missing or corrupt
    /// - Encode/Write: the fresh snapshot is live in memory but could not
    ///   be cached
    fn load_settings(&self) -> Result<(), SettingsError>;

    /// Copy of the current snapshot with DHCP networks resolved where
    /// possible. Never fails.
    fn get_settings(&self) -> Settings;

    fn get_persistent_disk_settings(&self, disk_cid: &str) -> Result<DiskSettings, SettingsError>;

    /// Inline disk references merged with the registry; registry wins
    fn get_all_persistent_disk_settings(
        &self,
    ) -> Result<HashMap<String, DiskSettings>, SettingsError>;

    /// Insert or replace the registry entry for `disk.id`
    fn save_persistent_disk_settings(&self, disk: DiskSettings) -> Result<(), SettingsError>;

    /// Drop the registry entry for `disk_cid`. Removing an absent entry
    /// rewrites the registry unchanged.
    fn remove_persistent_disk_settings(&self, disk_cid: &str) -> Result<(), SettingsError>;

    fn public_ssh_key_for_username(&self, username: &str) -> Result<String, SourceError>;

    /// Delete the cached copy so the next failed fetch cannot fall back to it
    fn invalidate_settings(&self) -> Result<(), SettingsError>;
}

pub struct StandardSettingsService {
    fs: Arc<dyn FileSystem>,
    settings_path: PathBuf,
    settings: Mutex<Settings>,
    persistent_disk_settings_path: PathBuf,
    disk_registry_lock: Mutex<()>,
    source: Arc<dyn SettingsSource>,
    resolver: Arc<dyn DefaultNetworkResolver>,
}

impl StandardSettingsService {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        settings_path: impl Into<PathBuf>,
        persistent_disk_settings_path: impl Into<PathBuf>,
        source: Arc<dyn SettingsSource>,
        resolver: Arc<dyn DefaultNetworkResolver>,
    ) -> Self {
        Self {
            fs,
            settings_path: settings_path.into(),
            settings: Mutex::new(Settings::default()),
            persistent_disk_settings_path: persistent_disk_settings_path.into(),
            disk_registry_lock: Mutex::new(()),
            source,
            resolver,
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn persistent_disk_settings_path(&self) -> &Path {
        &self.persistent_disk_settings_path
    }

    fn snapshot(&self) -> Settings {
        self.settings.lock().clone()
    }

    fn read_cached_settings(&self) -> Option<Settings> {
        let contents = match self
            .fs
            .read_file_with_opts(&self.settings_path, ReadOpts::quiet())
        {
            Ok(contents) => contents,
            Err(e) => {
                error!("Failed reading settings from file {}", e);
                return None;
            }
        };
        debug!("Successfully read settings from file");

        match serde_json::from_slice(&contents) {
            Ok(settings) => Some(settings),
            Err(e) => {
                error!("Failed unmarshalling settings from file {}", e);
                None
            }
        }
    }

    fn resolve_networks(&self, settings: &mut Settings) {
        if settings.networks.has_interface_alias() {
            return;
        }

        for name in settings.networks.unresolved_dhcp() {
            let resolved = match self.resolver.get_default_network() {
                Ok(resolved) => resolved,
                Err(e) => {
                    error!("Failed retrieving default network {}", e);
                    break;
                }
            };
            if let Some(network) = settings.networks.get_mut(&name) {
                network.apply_resolution(&resolved);
                debug!("Resolved network '{}' to {}", name, network.ip);
            }
        }
    }

    // Callers must hold `disk_registry_lock`.
    fn read_registry(&self) -> Result<HashMap<String, DiskSettings>, SettingsError> {
        if !self.fs.file_exists(&self.persistent_disk_settings_path) {
            return Ok(HashMap::new());
        }

        let contents = self
            .fs
            .read_file_with_opts(&self.persistent_disk_settings_path, ReadOpts::quiet())
            .map_err(SettingsError::RegistryRead)?;
        serde_json::from_slice(&contents).map_err(SettingsError::RegistryDecode)
    }

    // Callers must hold `disk_registry_lock`.
    fn write_registry(&self, registry: &HashMap<String, DiskSettings>) -> Result<(), SettingsError> {
        let ordered: BTreeMap<&String, &DiskSettings> = registry.iter().collect();
        let contents = serde_json::to_vec(&ordered).map_err(SettingsError::RegistryEncode)?;
        self.fs
            .write_file(&self.persistent_disk_settings_path, &contents)
            .map_err(SettingsError::RegistryWrite)
    }
}

impl SettingsService for StandardSettingsService {
    fn load_settings(&self) -> Result<(), SettingsError> {
        debug!("Loading settings from fetcher");

        let fresh = match self.source.settings() {
            Ok(settings) => settings,
            Err(fetch_err) => {
                error!("Failed loading settings via fetcher: {}", fetch_err);
                let cached = self
                    .read_cached_settings()
                    .ok_or(SettingsError::Fetch(fetch_err))?;
                *self.settings.lock() = cached;
                info!("Using cached settings from {}", self.settings_path.display());
                return Ok(());
            }
        };

        debug!("Successfully received settings from fetcher");
        let encoded = serde_json::to_vec(&fresh);
        *self.settings.lock() = fresh;

        let contents = encoded.map_err(SettingsError::Encode)?;
        self.fs
            .write_file_quietly(&self.settings_path, &contents)
            .map_err(SettingsError::Write)
    }

    fn get_settings(&self) -> Settings {
        let mut settings = self.snapshot();
        self.resolve_networks(&mut settings);
        settings
    }

    fn get_persistent_disk_settings(&self, disk_cid: &str) -> Result<DiskSettings, SettingsError> {
        let mut all = self.get_all_persistent_disk_settings()?;
        all.remove(disk_cid)
            .ok_or_else(|| SettingsError::DiskNotFound(disk_cid.to_string()))
    }

    fn get_all_persistent_disk_settings(
        &self,
    ) -> Result<HashMap<String, DiskSettings>, SettingsError> {
        let _registry = self.disk_registry_lock.lock();

        let inline = self.snapshot().inline_persistent_disk_settings();
        let registry = self.read_registry()?;
        Ok(merge_persistent_disks(inline, registry))
    }

    fn save_persistent_disk_settings(&self, disk: DiskSettings) -> Result<(), SettingsError> {
        let _registry = self.disk_registry_lock.lock();

        let mut registry = self.read_registry()?;
        debug!("Saving persistent disk settings for '{}'", disk.id);
        registry.insert(disk.id.clone(), disk);
        self.write_registry(&registry)
    }

    fn remove_persistent_disk_settings(&self, disk_cid: &str) -> Result<(), SettingsError> {
        let _registry = self.disk_registry_lock.lock();

        let mut registry = self.read_registry()?;
        if registry.remove(disk_cid).is_none() {
            debug!("No persistent disk settings registered for '{}'", disk_cid);
        }
        self.write_registry(&registry)
    }

    fn public_ssh_key_for_username(&self, username: &str) -> Result<String, SourceError> {
        self.source.public_ssh_key_for_username(username)
    }

    fn invalidate_settings(&self) -> Result<(), SettingsError> {
        self.fs
            .remove_all(&self.settings_path)
            .map_err(SettingsError::Invalidate)
    }
}
