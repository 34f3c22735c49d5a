// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! File-backed Settings Source
//!
//! Reads the settings document from a local path, typically a config drive
//! or metadata file mounted by the infrastructure. Every call re-reads the
//! file so a refreshed drive is picked up without restarting the agent.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::domain::filesystem::FileSystem;
use crate::domain::settings::Settings;
use crate::domain::source::{SettingsSource, SourceError};

pub struct FileSettingsSource {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl FileSettingsSource {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }
}

impl SettingsSource for FileSettingsSource {
    fn settings(&self) -> Result<Settings, SourceError> {
        debug!("Reading settings from {}", self.path.display());
        let contents = self.fs.read_file(&self.path)?;
        let settings = serde_json::from_slice(&contents)?;
        Ok(settings)
    }

    fn public_ssh_key_for_username(&self, username: &str) -> Result<String, SourceError> {
        let settings = self.settings()?;
        settings
            .env
            .public_keys
            .get(username)
            .cloned()
            .ok_or_else(|| SourceError::UnknownUser(username.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::filesystem::InMemoryFileSystem;
    use std::path::Path;

    fn source_with(contents: &str) -> FileSettingsSource {
        let fs = InMemoryFileSystem::new();
        fs.write_file(Path::new("/mnt/config/settings.json"), contents.as_bytes())
            .unwrap();
        FileSettingsSource::new(Arc::new(fs), "/mnt/config/settings.json")
    }

    #[test]
    fn test_reads_settings_document() {
        let source = source_with(r#"{"agent_id": "agent-1", "networks": {"default": {"type": "dynamic"}}}"#);

        let settings = source.settings().unwrap();

        assert_eq!(settings.agent_id, "agent-1");
        assert!(settings.networks["default"].is_dynamic());
    }

    #[test]
    fn test_missing_document_is_read_error() {
        let source = FileSettingsSource::new(Arc::new(InMemoryFileSystem::new()), "/missing.json");
        assert!(matches!(source.settings(), Err(SourceError::Read(_))));
    }

    #[test]
    fn test_malformed_document_is_decode_error() {
        let source = source_with("not json");
        assert!(matches!(source.settings(), Err(SourceError::Decode(_))));
    }

    #[test]
    fn test_public_key_lookup() {
        let source = source_with(r#"{"env": {"public_keys": {"vcap": "ssh-ed25519 AAAA"}}}"#);

        assert_eq!(source.public_ssh_key_for_username("vcap").unwrap(), "ssh-ed25519 AAAA");
        assert!(matches!(
            source.public_ssh_key_for_username("root"),
            Err(SourceError::UnknownUser(user)) if user == "root"
        ));
    }
}
