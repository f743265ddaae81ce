//! `WorkerConfig`
//!
//! Per-pool provider settings: GPUs, root and data volume tuning, service
//! account and node template hints.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ProviderConfigKind;

/// `WorkerConfig` contains configuration settings for the worker nodes
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkerConfig {
    /// GPU attached to every machine of the pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu: Option<Gpu>,

    /// Root volume settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Volume>,

    /// Per data volume overrides, matched by name
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_volumes: Vec<DataVolume>,

    /// Minimum CPU platform, e.g. `Intel Cascade Lake`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cpu_platform: Option<String>,

    /// Service account attached to the machines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<ServiceAccount>,

    /// Resource capacity hints for scale-from-zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_template: Option<NodeTemplate>,
}

impl ProviderConfigKind for WorkerConfig {
    const KIND: &'static str = "WorkerConfig";
}

/// Gpu is the GPU configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Gpu {
    /// Accelerator type, e.g. `nvidia-tesla-t4`
    #[serde(default)]
    pub accelerator_type: String,

    /// Number of GPUs per machine
    #[serde(default)]
    pub count: i32,
}

/// Volume contains settings for the root volume
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Interface of local SSD (SCRATCH) volumes: NVME or SCSI
    #[serde(default, rename = "localSSDInterface", skip_serializing_if = "Option::is_none")]
    pub local_ssd_interface: Option<String>,

    /// Customer-managed disk encryption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<DiskEncryption>,

    /// Provisioned IOPS of the root disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_iops: Option<i64>,

    /// Provisioned throughput (MiB/s) of the root disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_throughput: Option<i64>,
}

/// `DiskEncryption` references a KMS key used to encrypt disks
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiskEncryption {
    /// Fully qualified KMS key name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_name: Option<String>,

    /// Service account allowed to use the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_service_account: Option<String>,
}

/// `DataVolume` contains overrides for a named data volume of the pool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DataVolume {
    /// Name of the data volume in the worker pool
    #[serde(default)]
    pub name: String,

    /// Image the disk is created from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_image: Option<String>,

    /// Provisioned IOPS of the disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_iops: Option<i64>,

    /// Provisioned throughput (MiB/s) of the disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_throughput: Option<i64>,
}

/// `ServiceAccount` is a GCP service account
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccount {
    /// Email address of the service account
    #[serde(default)]
    pub email: String,

    /// OAuth scopes granted to the service account
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// `NodeTemplate` contains resource capacity hints of a machine type
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NodeTemplate {
    /// Resource capacity, e.g. `cpu: "4"`
    #[serde(default)]
    #[schemars(with = "BTreeMap<String, String>")]
    pub capacity: BTreeMap<String, Quantity>,
}
