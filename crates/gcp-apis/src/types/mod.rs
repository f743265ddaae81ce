//! Provider configuration types
//!
//! Versioned (`v1alpha1`) configuration documents embedded as
//! `providerConfig` into Gardener resources:
//! - `InfrastructureConfig` (networks, VPC, Cloud NAT, flow logs)
//! - `ControlPlaneConfig` (zone, cloud-controller-manager feature gates)
//! - `WorkerConfig` (GPU, volumes, service account, node template)
//! - `CloudProfileConfig` (machine image mappings)
//! - `BackupBucketConfig` (retention immutability)
//! - `WorkloadIdentityConfig` (project and federation credentials)

pub mod backup_bucket;
pub mod cloud_profile;
pub mod control_plane;
pub mod duration;
pub mod infrastructure;
pub mod worker;
pub mod workload_identity;

pub use backup_bucket::*;
pub use cloud_profile::*;
pub use control_plane::*;
pub use duration::*;
pub use infrastructure::*;
pub use worker::*;
pub use workload_identity::*;

/// API group of the provider config kinds.
pub const GROUP: &str = "gcp.provider.extensions.gardener.cloud";

/// API version of the provider config kinds.
pub const VERSION: &str = "v1alpha1";

/// A top-level provider config kind.
pub trait ProviderConfigKind {
    /// Kind name, e.g. `InfrastructureConfig`.
    const KIND: &'static str;

    /// `apiVersion` of the kind.
    fn api_version() -> String {
        format!("{GROUP}/{VERSION}")
    }
}
