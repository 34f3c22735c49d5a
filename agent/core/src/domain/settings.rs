// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Agent Settings Types
//
// The merged configuration view the agent receives from its authoritative
// source:
// - network definitions, some of which are resolved lazily (DHCP)
// - persistent disk references embedded inline in the settings document
// - environment hints describing how persistent disks are formatted/mounted
//
// Top-level fields this crate does not interpret are kept verbatim so the
// cached copy on disk round-trips the source's schema.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ops::{Deref, DerefMut};

/// The agent's merged configuration view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub agent_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm: Option<VmSettings>,

    #[serde(default)]
    pub networks: Networks,

    #[serde(default)]
    pub disks: Disks,

    #[serde(default)]
    pub env: Env,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ntp: Vec<String>,

    /// Source fields not modelled here (blobstores, mbus, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmSettings {
    #[serde(default)]
    pub name: String,
}

impl Settings {
    /// Expand an inline persistent disk reference into full disk settings,
    /// filling in the environment's persistent disk metadata.
    pub fn populate_persistent_disk_settings(
        &self,
        disk_cid: &str,
        reference: &PersistentDiskReference,
    ) -> DiskSettings {
        let mut disk = DiskSettings {
            id: disk_cid.to_string(),
            ..Default::default()
        };

        match reference {
            PersistentDiskReference::Path(path) => {
                disk.path = Some(path.clone());
                disk.volume_id = Some(path.clone());
            }
            PersistentDiskReference::Hints(hints) => {
                disk.path = hints.path.clone();
                disk.volume_id = hints.volume_id.clone();
                disk.device_id = hints.device_id.clone();
                disk.lun = hints.lun.clone();
                disk.host_device_id = hints.host_device_id.clone();
            }
        }

        disk.file_system_type = self.env.persistent_disk_fs.clone();
        disk.mount_options = self.env.persistent_disk_mount_options.clone();
        disk.partitioner = self.env.persistent_disk_partitioner.clone();
        disk
    }

    /// All inline persistent disk references, populated and keyed by disk CID
    pub fn inline_persistent_disk_settings(&self) -> HashMap<String, DiskSettings> {
        self.disks
            .persistent
            .iter()
            .map(|(cid, reference)| {
                (cid.clone(), self.populate_persistent_disk_settings(cid, reference))
            })
            .collect()
    }
}

/// Merge the two sources of persistent disk settings.
///
/// Override order: `inline` first, then `registry`. A disk CID present in
/// both maps takes the registry's value.
pub fn merge_persistent_disks(
    inline: HashMap<String, DiskSettings>,
    registry: HashMap<String, DiskSettings>,
) -> HashMap<String, DiskSettings> {
    let mut merged = inline;
    merged.extend(registry);
    merged
}

/// Network definitions keyed by network name.
///
/// Ordered by name so that lazy resolution visits networks deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Networks(pub BTreeMap<String, Network>);

impl Networks {
    /// Alias-based interface addressing supersedes DHCP resolution for the
    /// whole set.
    pub fn has_interface_alias(&self) -> bool {
        self.0
            .values()
            .any(|network| network.alias.as_deref().map_or(false, |alias| !alias.is_empty()))
    }

    /// Names of networks that still need their address resolved
    pub fn unresolved_dhcp(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|(_, network)| network.needs_resolution())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl Deref for Networks {
    type Target = BTreeMap<String, Network>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Networks {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<(String, Network)> for Networks {
    fn from_iter<I: IntoIterator<Item = (String, Network)>>(iter: I) -> Self {
        Networks(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Dynamic,
    Manual,
    Vip,
    /// A type this agent does not know; configured like a manual network
    Unknown,
}

/// Sources write `"type": ""` for manual networks, and newer sources may
/// add types. Neither may make the whole settings document unreadable.
fn deserialize_network_type<'de, D>(deserializer: D) -> Result<Option<NetworkType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref() {
        None | Some("") => None,
        Some("dynamic") => Some(NetworkType::Dynamic),
        Some("manual") => Some(NetworkType::Manual),
        Some("vip") => Some(NetworkType::Vip),
        Some(_) => Some(NetworkType::Unknown),
    })
}

/// One network the VM is attached to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "deserialize_network_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub network_type: Option<NetworkType>,

    #[serde(default)]
    pub ip: String,

    #[serde(default)]
    pub netmask: String,

    #[serde(default)]
    pub gateway: String,

    /// Set once IP/netmask/gateway were filled in from the default network
    #[serde(default)]
    pub resolved: bool,

    #[serde(default)]
    pub use_dhcp: bool,

    /// Which defaults ("dns", "gateway") this network provides
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns: Vec<String>,

    #[serde(default)]
    pub mac: String,

    #[serde(default)]
    pub preconfigured: bool,

    /// Interface alias (e.g. "eth0:1")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl Network {
    pub fn is_vip(&self) -> bool {
        self.network_type == Some(NetworkType::Vip)
    }

    pub fn is_dynamic(&self) -> bool {
        self.network_type == Some(NetworkType::Dynamic)
    }

    /// Whether this network is addressed dynamically.
    ///
    /// A manual network without both IP and netmask cannot be configured
    /// statically. A network that was resolved earlier stays DHCP so it is
    /// not mistaken for a static one on later checks.
    pub fn is_dhcp(&self) -> bool {
        if self.is_vip() {
            return false;
        }
        if self.is_dynamic() || self.use_dhcp {
            return true;
        }
        let is_static = !self.ip.is_empty() && !self.netmask.is_empty();
        self.resolved || !is_static
    }

    pub fn needs_resolution(&self) -> bool {
        self.is_dhcp() && !self.resolved
    }

    /// Copy the addressing of `resolved` onto this network. DNS servers and
    /// every other field stay as originally fetched.
    pub fn apply_resolution(&mut self, resolved: &Network) {
        self.ip = resolved.ip.clone();
        self.netmask = resolved.netmask.clone();
        self.gateway = resolved.gateway.clone();
        self.resolved = true;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Disks {
    /// Device path of the system disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Ephemeral disk hint; its shape varies by infrastructure
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub ephemeral: serde_json::Value,

    /// Inline persistent disk references keyed by disk CID
    #[serde(default)]
    pub persistent: HashMap<String, PersistentDiskReference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub raw_ephemeral: Vec<DiskSettings>,
}

/// Inline (legacy) persistent disk reference.
///
/// Either a bare string, used as both device path and volume id, or an
/// object of device hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersistentDiskReference {
    Path(String),
    Hints(PersistentDiskHints),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentDiskHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_id: Option<String>,

    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lun: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_device_id: Option<String>,
}

/// One persistent disk attachment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskSettings {
    /// Disk CID
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lun: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_device_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_system_type: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mount_options: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitioner: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Env {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_disk_fs: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub persistent_disk_mount_options: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_disk_partitioner: Option<String>,

    /// Public SSH keys keyed by username
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub public_keys: BTreeMap<String, String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
