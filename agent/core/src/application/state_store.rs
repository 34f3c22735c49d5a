// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Atomic Versioned State Store
//!
//! Persists a [`VersionedState`] document so that a failed or interrupted
//! save never corrupts or loses the previously committed file.
//!
//! # Save protocol
//!
//! 1. generate a unique suffix
//! 2. serialize the document
//! 3. write it to `<path><suffix>`
//! 4. apply the platform permission mode to the temporary file
//! 5. rename the temporary file onto `<path>`
//!
//! Only step 5 makes new content visible. Each step fails with its own
//! [`StateError`] variant.
//!
//! # Concurrency
//!
//! The store takes no locks. Concurrent writers to the same path each
//! publish a complete document; the last rename wins.

use std::ffi::OsString;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::dns_state::LocalDnsState;
use crate::domain::filesystem::{FileSystem, ReadOpts};
use crate::domain::platform::{PermissionSetter, UuidGenerator};
use crate::domain::state::{StateError, VersionedState};

/// Store for the DNS record snapshot
pub type SyncDnsState = AtomicStateStore<LocalDnsState>;

pub struct AtomicStateStore<S> {
    fs: Arc<dyn FileSystem>,
    permissions: Arc<dyn PermissionSetter>,
    uuid_generator: Arc<dyn UuidGenerator>,
    path: PathBuf,
    _state: PhantomData<fn() -> S>,
}

impl<S: VersionedState> AtomicStateStore<S> {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        permissions: Arc<dyn PermissionSetter>,
        uuid_generator: Arc<dyn UuidGenerator>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fs,
            permissions,
            uuid_generator,
            path: path.into(),
            _state: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the persisted document
    pub fn load_state(&self) -> Result<S, StateError> {
        let contents = self
            .fs
            .read_file_with_opts(&self.path, ReadOpts::quiet())
            .map_err(StateError::Read)?;

        let state: S = serde_json::from_slice(&contents).map_err(StateError::Decode)?;
        state.validate().map_err(StateError::Invalid)?;
        Ok(state)
    }

    /// Persist `state` with the temp-write, chmod, rename protocol
    pub fn save_state(&self, state: &S) -> Result<(), StateError> {
        let suffix = self
            .uuid_generator
            .generate()
            .map_err(StateError::UuidGeneration)?;

        let contents = serde_json::to_vec(state).map_err(|source| StateError::Encode {
            kind: S::KIND,
            source,
        })?;

        let temp_path = temp_path_for(&self.path, &suffix);

        self.fs
            .write_file(&temp_path, &contents)
            .map_err(|source| StateError::Write {
                kind: S::KIND,
                source,
            })?;

        if let Err(source) = self.permissions.set_permissions(&temp_path) {
            self.discard(&temp_path);
            return Err(StateError::Permission {
                kind: S::KIND,
                source,
            });
        }

        if let Err(source) = self.fs.rename(&temp_path, &self.path) {
            self.discard(&temp_path);
            return Err(StateError::Rename(source));
        }

        debug!(
            "Saved {} version {} to {}",
            S::KIND,
            state.version(),
            self.path.display()
        );
        Ok(())
    }

    /// Whether the persisted document is older than `required_version`.
    ///
    /// A missing, unreadable or malformed document counts as stale. Equal or
    /// newer versions are current.
    pub fn needs_update(&self, required_version: u64) -> bool {
        match self.load_state() {
            Ok(state) => state.version() < required_version,
            Err(e) => {
                debug!("Treating {} as stale: {}", S::KIND, e);
                true
            }
        }
    }

    /// Fetch and persist a fresh document when the persisted one is stale.
    /// Returns whether a refresh happened.
    pub fn refresh_if_stale<F>(&self, required_version: u64, fetch: F) -> anyhow::Result<bool>
    where
        F: FnOnce() -> anyhow::Result<S>,
    {
        if !self.needs_update(required_version) {
            return Ok(false);
        }

        let state = fetch()?;
        if state.version() < required_version {
            warn!(
                "Fetched {} version {} is older than required version {}",
                S::KIND,
                state.version(),
                required_version
            );
        }
        self.save_state(&state)?;
        Ok(true)
    }

    fn discard(&self, temp_path: &Path) {
        if let Err(e) = self.fs.remove_all(temp_path) {
            warn!("Failed to remove temporary file {}: {}", temp_path.display(), e);
        }
    }
}

/// `<path><suffix>`, next to the real file so the rename stays on one
/// filesystem
fn temp_path_for(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::filesystem::InMemoryFileSystem;
    use crate::infrastructure::platform::{ModePermissionSetter, RecordingPermissionSetter};
    use crate::infrastructure::uuid_generator::FixedUuidGenerator;

    const PATH: &str = "/blobstore-dns-records.json";

    struct Fixture {
        fs: InMemoryFileSystem,
        permissions: RecordingPermissionSetter,
        uuids: FixedUuidGenerator,
        store: SyncDnsState,
    }

    fn fixture() -> Fixture {
        let fs = InMemoryFileSystem::new();
        let permissions = RecordingPermissionSetter::new();
        let uuids = FixedUuidGenerator::new("fake-generated-uuid");
        let store = SyncDnsState::new(
            Arc::new(fs.clone()),
            Arc::new(permissions.clone()),
            Arc::new(uuids.clone()),
            PATH,
        );
        Fixture {
            fs,
            permissions,
            uuids,
            store,
        }
    }

    fn dns_state() -> LocalDnsState {
        LocalDnsState {
            version: 1234,
            records: vec![["rec".to_string(), "ip".to_string()]],
            record_keys: ["id", "instance_group", "az", "network", "deployment", "ip"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            record_infos: vec![["id-1", "instance-group-1", "az1", "network1", "deployment1", "ip1"]
                .iter()
                .map(|s| s.to_string())
                .collect()],
        }
    }

    fn write(fs: &InMemoryFileSystem, contents: &str) {
        fs.write_file(Path::new(PATH), contents.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let f = fixture();
        let err = f.store.load_state().unwrap_err();
        assert!(matches!(err, StateError::Read(_)));
        assert!(err.to_string().contains("reading state file"));
    }

    #[test]
    fn test_load_invalid_json_is_decode_error() {
        let f = fixture();
        write(&f.fs, "fake-state-file");

        let err = f.store.load_state().unwrap_err();
        assert!(matches!(err, StateError::Decode(_)));
        assert!(err.to_string().contains("unmarshalling state file"));
    }

    #[test]
    fn test_load_misaligned_rows_is_invalid() {
        let f = fixture();
        write(
            &f.fs,
            r#"{"version": 1, "record_keys": ["id", "ip"], "record_infos": [["id-1"]]}"#,
        );

        assert!(matches!(f.store.load_state(), Err(StateError::Invalid(_))));
    }

    #[test]
    fn test_load_version() {
        let f = fixture();
        write(&f.fs, r#"{"version": 1234}"#);

        assert_eq!(f.store.load_state().unwrap().version, 1234);
    }

    #[test]
    fn test_save_writes_temp_then_renames() {
        let f = fixture();

        f.store.save_state(&dns_state()).unwrap();

        assert_eq!(
            f.fs.renames(),
            vec![(
                PathBuf::from("/blobstore-dns-records.jsonfake-generated-uuid"),
                PathBuf::from(PATH)
            )]
        );
        let saved: serde_json::Value =
            serde_json::from_slice(&f.fs.contents(PATH).unwrap()).unwrap();
        assert_eq!(
            saved,
            serde_json::json!({
                "version": 1234,
                "records": [["rec", "ip"]],
                "record_keys": ["id", "instance_group", "az", "network", "deployment", "ip"],
                "record_infos": [["id-1", "instance-group-1", "az1", "network1", "deployment1", "ip1"]]
            })
        );
    }

    #[test]
    fn test_save_sets_permissions_on_temp_file() {
        let f = fixture();

        f.store.save_state(&dns_state()).unwrap();

        assert_eq!(
            f.permissions.paths(),
            vec![PathBuf::from("/blobstore-dns-records.jsonfake-generated-uuid")]
        );
    }

    #[test]
    fn test_save_round_trip() {
        let f = fixture();
        f.store.save_state(&dns_state()).unwrap();
        assert_eq!(f.store.load_state().unwrap(), dns_state());
    }

    #[test]
    fn test_write_failure() {
        let f = fixture();
        f.fs.fail_writes("fake fail saving error");

        let err = f.store.save_state(&dns_state()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "writing the blobstore DNS state: fake fail saving error"
        );
    }

    #[test]
    fn test_temp_write_failure_keeps_existing_file() {
        let f = fixture();
        write(&f.fs, "{}");
        f.fs.fail_write_to(
            "/blobstore-dns-records.jsonfake-generated-uuid",
            "failed to write tmp file",
        );

        let err = f.store.save_state(&dns_state()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "writing the blobstore DNS state: failed to write tmp file"
        );
        assert_eq!(f.fs.contents(PATH).unwrap(), b"{}");
    }

    #[test]
    fn test_uuid_failure() {
        let f = fixture();
        f.uuids.fail_with("failed to generate a uuid");

        let err = f.store.save_state(&dns_state()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "generating uuid for temp file: failed to generate a uuid"
        );
        assert!(f.fs.paths().is_empty());
    }

    #[test]
    fn test_rename_failure_removes_temp_file() {
        let f = fixture();
        write(&f.fs, r#"{"version": 1}"#);
        f.fs.fail_renames("failed to rename");

        let err = f.store.save_state(&dns_state()).unwrap_err();

        assert_eq!(err.to_string(), "renaming: failed to rename");
        assert_eq!(f.fs.paths(), vec![PathBuf::from(PATH)]);
        assert_eq!(f.fs.contents(PATH).unwrap(), br#"{"version": 1}"#);
    }

    #[test]
    fn test_permission_failure() {
        let f = fixture();
        write(&f.fs, r#"{"version": 1}"#);
        f.permissions.fail_with("failed to set permissions");

        let err = f.store.save_state(&dns_state()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "setting permissions of blobstore DNS state: failed to set permissions"
        );
        assert!(f.fs.renames().is_empty());
        assert_eq!(f.fs.contents(PATH).unwrap(), br#"{"version": 1}"#);
    }

    fn mode_store(fs: &InMemoryFileSystem) -> SyncDnsState {
        let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());
        SyncDnsState::new(
            shared.clone(),
            Arc::new(ModePermissionSetter::new(shared, 0o644)),
            Arc::new(FixedUuidGenerator::new("fake-generated-uuid")),
            PATH,
        )
    }

    #[test]
    fn test_published_file_carries_configured_mode() {
        let fs = InMemoryFileSystem::new();

        mode_store(&fs).save_state(&dns_state()).unwrap();

        assert_eq!(fs.mode(PATH), Some(0o644));
        assert_eq!(fs.paths(), vec![PathBuf::from(PATH)]);
    }

    #[test]
    fn test_chmod_failure_discards_temp_file() {
        let fs = InMemoryFileSystem::new();
        write(&fs, r#"{"version": 1}"#);
        fs.fail_chmods("chmod failed");

        let err = mode_store(&fs).save_state(&dns_state()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "setting permissions of blobstore DNS state: chmod failed"
        );
        assert!(fs.renames().is_empty());
        assert_eq!(fs.paths(), vec![PathBuf::from(PATH)]);
        assert_eq!(fs.contents(PATH).unwrap(), br#"{"version": 1}"#);
    }

    #[test]
    fn test_needs_update_when_file_missing() {
        let f = fixture();
        assert!(f.store.needs_update(0));
    }

    #[test]
    fn test_needs_update_compares_versions() {
        let f = fixture();
        write(&f.fs, r#"{"version":1}"#);

        assert!(f.store.needs_update(2));
        assert!(!f.store.needs_update(1));
        assert!(!f.store.needs_update(0));
    }

    #[test]
    fn test_needs_update_when_unreadable_or_corrupt() {
        let f = fixture();
        write(&f.fs, r#"{"version":1}"#);
        f.fs.fail_reads("fake fail reading error");
        assert!(f.store.needs_update(0));

        f.fs.clear_faults();
        write(&f.fs, "garbage");
        assert!(f.store.needs_update(0));
    }

    #[test]
    fn test_refresh_if_stale() {
        let f = fixture();
        write(&f.fs, r#"{"version": 1234}"#);

        let refreshed = f
            .store
            .refresh_if_stale(1234, || panic!("current state must not be fetched"))
            .unwrap();
        assert!(!refreshed);

        let mut newer = dns_state();
        newer.version = 1300;
        let refreshed = f.store.refresh_if_stale(1300, || Ok(newer.clone())).unwrap();
        assert!(refreshed);
        assert_eq!(f.store.load_state().unwrap().version, 1300);
    }

    #[test]
    fn test_refresh_propagates_fetch_error() {
        let f = fixture();
        let result = f
            .store
            .refresh_if_stale(1, || Err(anyhow::anyhow!("blobstore unreachable")));
        assert!(result.is_err());
        assert!(f.fs.paths().is_empty());
    }
}
