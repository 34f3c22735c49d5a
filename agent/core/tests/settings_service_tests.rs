// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Settings reconciliation against the real filesystem with a file-backed
//! settings source.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use steward_core::application::{SettingsError, SettingsService, StandardSettingsService};
use steward_core::domain::filesystem::FileSystem;
use steward_core::domain::settings::{DiskSettings, Network};
use steward_core::domain::source::{DefaultNetworkResolver, ResolutionError};
use steward_core::infrastructure::settings_source::FileSettingsSource;
use steward_core::infrastructure::OsFileSystem;

struct StaticResolver;

impl DefaultNetworkResolver for StaticResolver {
    fn get_default_network(&self) -> Result<Network, ResolutionError> {
        Ok(Network {
            ip: "192.168.50.10".to_string(),
            netmask: "255.255.255.0".to_string(),
            gateway: "192.168.50.1".to_string(),
            ..Default::default()
        })
    }
}

struct Paths {
    _temp_dir: TempDir,
    source: PathBuf,
    cache: PathBuf,
    registry: PathBuf,
}

fn paths() -> Paths {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    Paths {
        _temp_dir: temp_dir,
        source: root.join("config-drive").join("settings.json"),
        cache: root.join("bosh").join("settings.json"),
        registry: root.join("bosh").join("persistent_disk_hints.json"),
    }
}

fn service(paths: &Paths) -> StandardSettingsService {
    let fs: Arc<dyn FileSystem> = Arc::new(OsFileSystem::new());
    StandardSettingsService::new(
        fs.clone(),
        &paths.cache,
        &paths.registry,
        Arc::new(FileSettingsSource::new(fs, &paths.source)),
        Arc::new(StaticResolver),
    )
}

fn write_source(path: &Path, document: serde_json::Value) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_vec(&document).unwrap()).unwrap();
}

fn source_document() -> serde_json::Value {
    serde_json::json!({
        "agent_id": "agent-7",
        "blobstore": {"provider": "local", "options": {"blobstore_path": "/var/vcap/micro_bosh/data/cache"}},
        "networks": {
            "default": {"type": "dynamic", "default": ["dns", "gateway"], "dns": ["10.0.0.2"]},
            "static": {"type": "manual", "ip": "10.10.0.5", "netmask": "255.255.255.0", "gateway": "10.10.0.1"}
        },
        "disks": {
            "system": "/dev/sda",
            "persistent": {"disk-inline": "/dev/sdb", "disk-shared": {"path": "/dev/sdc", "volume_id": "vol-inline"}}
        },
        "env": {
            "persistent_disk_fs": "ext4",
            "public_keys": {"vcap": "ssh-ed25519 AAAAC3Nza"}
        }
    })
}

#[test]
fn test_fetch_caches_and_resolves() {
    let paths = paths();
    write_source(&paths.source, source_document());
    let svc = service(&paths);

    svc.load_settings().unwrap();
    let settings = svc.get_settings();

    assert_eq!(settings.agent_id, "agent-7");
    let default = &settings.networks["default"];
    assert!(default.resolved);
    assert_eq!(default.ip, "192.168.50.10");
    assert_eq!(default.dns, vec!["10.0.0.2".to_string()]);
    assert_eq!(settings.networks["static"].ip, "10.10.0.5");
    assert!(!settings.networks["static"].resolved);

    let cached: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&paths.cache).unwrap()).unwrap();
    assert_eq!(cached["blobstore"], source_document()["blobstore"]);
    assert_eq!(cached["networks"]["default"]["resolved"], false);
}

#[test]
fn test_restart_without_source_uses_cache() {
    let paths = paths();
    write_source(&paths.source, source_document());
    service(&paths).load_settings().unwrap();
    std::fs::remove_file(&paths.source).unwrap();

    let restarted = service(&paths);
    restarted.load_settings().unwrap();

    assert_eq!(restarted.get_settings().agent_id, "agent-7");
}

#[test]
fn test_invalidated_cache_is_not_used() {
    let paths = paths();
    write_source(&paths.source, source_document());
    let svc = service(&paths);
    svc.load_settings().unwrap();
    std::fs::remove_file(&paths.source).unwrap();

    svc.invalidate_settings().unwrap();
    svc.invalidate_settings().unwrap();

    let err = service(&paths).load_settings().unwrap_err();
    assert!(matches!(err, SettingsError::Fetch(_)));
}

#[test]
fn test_disk_registry_lifecycle() {
    let paths = paths();
    write_source(&paths.source, source_document());
    let svc = service(&paths);
    svc.load_settings().unwrap();

    let inline = svc.get_persistent_disk_settings("disk-inline").unwrap();
    assert_eq!(inline.path.as_deref(), Some("/dev/sdb"));
    assert_eq!(inline.volume_id.as_deref(), Some("/dev/sdb"));
    assert_eq!(inline.file_system_type.as_deref(), Some("ext4"));

    let registered = DiskSettings {
        id: "disk-shared".to_string(),
        volume_id: Some("vol-registry".to_string()),
        path: Some("/dev/sdd".to_string()),
        ..Default::default()
    };
    svc.save_persistent_disk_settings(registered.clone()).unwrap();
    assert_eq!(
        svc.get_persistent_disk_settings("disk-shared").unwrap(),
        registered
    );

    svc.remove_persistent_disk_settings("disk-shared").unwrap();
    let shared = svc.get_persistent_disk_settings("disk-shared").unwrap();
    assert_eq!(shared.volume_id.as_deref(), Some("vol-inline"));

    assert!(matches!(
        svc.get_persistent_disk_settings("disk-unknown"),
        Err(SettingsError::DiskNotFound(cid)) if cid == "disk-unknown"
    ));
}

#[test]
fn test_public_key_from_source() {
    let paths = paths();
    write_source(&paths.source, source_document());
    let svc = service(&paths);

    assert_eq!(
        svc.public_ssh_key_for_username("vcap").unwrap(),
        "ssh-ed25519 AAAAC3Nza"
    );
    assert!(svc.public_ssh_key_for_username("root").is_err());
}
