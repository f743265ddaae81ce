//! `WorkloadIdentityConfig`

use k8s_openapi::apimachinery::pkg::runtime::RawExtension;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ProviderConfigKind;

/// `WorkloadIdentityConfig` contains configuration settings for workload identity
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadIdentityConfig {
    /// GCP project ID the workload identity federation is configured in
    #[serde(default, rename = "projectID")]
    pub project_id: String,

    /// External account credentials document (without `credential_source`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<serde_json::Value>")]
    pub credentials_config: Option<RawExtension>,
}

impl ProviderConfigKind for WorkloadIdentityConfig {
    const KIND: &'static str = "WorkloadIdentityConfig";
}
