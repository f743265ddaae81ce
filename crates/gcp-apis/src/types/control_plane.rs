//! `ControlPlaneConfig`

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ProviderConfigKind;

/// `ControlPlaneConfig` contains configuration settings for the control plane
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneConfig {
    /// Zone the control plane volumes are placed in
    #[serde(default)]
    pub zone: String,

    /// Cloud controller manager settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_controller_manager: Option<CloudControllerManagerConfig>,

    /// Storage settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<Storage>,
}

impl ProviderConfigKind for ControlPlaneConfig {
    const KIND: &'static str = "ControlPlaneConfig";
}

/// `CloudControllerManagerConfig` contains configuration settings for the cloud-controller-manager
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CloudControllerManagerConfig {
    /// Feature gates passed to the cloud-controller-manager
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub feature_gates: BTreeMap<String, bool>,
}

/// Storage contains configuration for the storage in the cluster
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Storage {
    /// Whether the default storage class is managed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_default_storage_class: Option<bool>,

    /// Whether the default volume snapshot class is managed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_default_volume_snapshot_class: Option<bool>,
}
