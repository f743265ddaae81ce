//! Shoot worker pools

use serde::{Deserialize, Serialize};

use crate::types::WorkerConfig;

/// Disk type of non-persistent, host-local SSDs.
pub const VOLUME_TYPE_SCRATCH: &str = "SCRATCH";

/// A worker pool of a shoot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    /// Name of the pool
    pub name: String,

    /// Zones machines of the pool are spread over
    #[serde(default)]
    pub zones: Vec<String>,

    /// Root volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Volume>,

    /// Additional data volumes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_volumes: Vec<DataVolume>,

    /// Provider-specific settings of the pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config: Option<WorkerConfig>,
}

/// Root volume of a worker pool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Volume name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Disk type, e.g. `pd-balanced`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,

    /// Disk size, e.g. `50Gi`
    #[serde(default, rename = "size")]
    pub volume_size: String,

    /// Whether the disk is encrypted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,
}

/// Data volume of a worker pool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DataVolume {
    /// Volume name, referenced by provider-side overrides
    #[serde(default)]
    pub name: String,

    /// Disk type, e.g. `pd-ssd` or `SCRATCH`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,

    /// Disk size, e.g. `100Gi`
    #[serde(default, rename = "size")]
    pub volume_size: String,

    /// Whether the disk is encrypted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,
}

impl DataVolume {
    /// Whether this is a local SSD (SCRATCH) volume.
    #[must_use]
    pub fn is_scratch(&self) -> bool {
        self.volume_type.as_deref() == Some(VOLUME_TYPE_SCRATCH)
    }
}
