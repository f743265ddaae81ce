//! `InfrastructureConfig`
//!
//! Network layout of a shoot's infrastructure: VPC, Cloud NAT, internal and
//! worker subnets and VPC flow logs.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ProviderConfigKind;

/// `InfrastructureConfig` infrastructure configuration resource
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureConfig {
    /// Network configuration of the infrastructure
    pub networks: NetworkConfig,
}

impl ProviderConfigKind for InfrastructureConfig {
    const KIND: &'static str = "InfrastructureConfig";
}

/// `NetworkConfig` holds information about the Kubernetes and infrastructure networks
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Existing VPC to reuse. Gardener creates a VPC when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<Vpc>,

    /// Cloud NAT settings
    #[serde(default, rename = "cloudNAT", skip_serializing_if = "Option::is_none")]
    pub cloud_nat: Option<CloudNat>,

    /// Internal subnet CIDR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal: Option<String>,

    /// Worker subnet CIDR
    ///
    /// Deprecated: use `workers` instead.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub worker: String,

    /// Worker subnet CIDR
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub workers: String,

    /// VPC flow log settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_logs: Option<FlowLogs>,
}

impl NetworkConfig {
    /// The worker CIDR in effect. `workers` wins over the deprecated `worker`.
    #[must_use]
    pub fn effective_worker_cidr(&self) -> Option<&str> {
        if !self.workers.is_empty() {
            Some(&self.workers)
        } else if !self.worker.is_empty() {
            Some(&self.worker)
        } else {
            None
        }
    }
}

/// VPC references an existing VPC
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Vpc {
    /// Name of the VPC
    #[serde(default)]
    pub name: String,

    /// Cloud router of the VPC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_router: Option<CloudRouter>,
}

/// `CloudRouter` references an existing cloud router
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CloudRouter {
    /// Name of the cloud router
    #[serde(default)]
    pub name: String,
}

/// `CloudNat` contains configuration about the Cloud NAT resource
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CloudNat {
    /// Minimum number of ports allocated to a VM
    #[serde(default, rename = "minPortsPerVM", skip_serializing_if = "Option::is_none")]
    pub min_ports_per_vm: Option<i32>,

    /// Maximum number of ports allocated to a VM with dynamic port allocation
    #[serde(default, rename = "maxPortsPerVM", skip_serializing_if = "Option::is_none")]
    pub max_ports_per_vm: Option<i32>,

    /// Enables dynamic port allocation
    #[serde(default)]
    pub enable_dynamic_port_allocation: bool,

    /// Endpoint-independent mapping settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_independent_mapping: Option<EndpointIndependentMapping>,

    /// Names of reserved external IPs used by the NAT
    #[serde(default, rename = "natIPNames", skip_serializing_if = "Option::is_none")]
    pub nat_ip_names: Option<Vec<NatIpName>>,

    /// Timeout (in seconds) for ICMP connections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icmp_idle_timeout_sec: Option<i32>,

    /// Timeout (in seconds) for established TCP connections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_established_idle_timeout_sec: Option<i32>,

    /// Timeout (in seconds) for TCP connections in `TIME_WAIT` state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_time_wait_timeout_sec: Option<i32>,

    /// Timeout (in seconds) for transitory TCP connections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_transitory_idle_timeout_sec: Option<i32>,

    /// Timeout (in seconds) for UDP connections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udp_idle_timeout_sec: Option<i32>,
}

impl CloudNat {
    /// Idle timeout settings paired with their JSON field names.
    #[must_use]
    pub fn idle_timeouts(&self) -> [(&'static str, Option<i32>); 5] {
        [
            ("icmpIdleTimeoutSec", self.icmp_idle_timeout_sec),
            ("tcpEstablishedIdleTimeoutSec", self.tcp_established_idle_timeout_sec),
            ("tcpTimeWaitTimeoutSec", self.tcp_time_wait_timeout_sec),
            ("tcpTransitoryIdleTimeoutSec", self.tcp_transitory_idle_timeout_sec),
            ("udpIdleTimeoutSec", self.udp_idle_timeout_sec),
        ]
    }
}

/// `EndpointIndependentMapping` contains endpoint-independent mapping settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EndpointIndependentMapping {
    /// Whether endpoint-independent mapping is enabled
    #[serde(default)]
    pub enabled: bool,
}

/// `NatIpName` is the name of a reserved external IP
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NatIpName {
    /// Name of the external IP
    #[serde(default)]
    pub name: String,
}

/// `FlowLogs` contains the configuration options for VPC flow logs
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FlowLogs {
    /// Aggregation interval, e.g. `INTERVAL_5_SEC`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_interval: Option<String>,

    /// Sampling rate in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_sampling: Option<f32>,

    /// Metadata fields added to flow logs, e.g. `INCLUDE_ALL_METADATA`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}
