//! Provider config validation
//!
//! One entry point per provider config kind, each returning every violation
//! it found as an [`ErrorList`](field_validation::ErrorList):
//! - `validate_<kind>(config, <context>, path)` for create
//! - `validate_<kind>_update(old, new, path)` for update-time invariants

pub mod backup_bucket;
pub mod cloud_profile;
pub mod control_plane;
pub mod feature_gates;
pub mod infrastructure;
pub mod secret;
pub mod shoot;
pub mod worker;
pub mod workload_identity;
#[cfg(test)]
mod workload_identity_test;

pub use backup_bucket::{validate_backup_bucket_config, validate_backup_bucket_config_update};
pub use cloud_profile::{ProviderImages, validate_capabilities, validate_cloud_profile_config};
pub use control_plane::{validate_control_plane_config, validate_control_plane_config_update};
pub use feature_gates::{FeatureGateError, is_feature_gate_supported, validate_feature_gates};
pub use infrastructure::{
    ShootNetworking, validate_infrastructure_config, validate_infrastructure_config_update, validate_network_config,
};
pub use secret::validate_cloud_provider_secret;
pub use shoot::{validate_workers, validate_workers_update};
pub use worker::validate_worker_config;
pub use workload_identity::{
    WorkloadIdentityPolicy, validate_workload_identity_config, validate_workload_identity_config_update,
};
