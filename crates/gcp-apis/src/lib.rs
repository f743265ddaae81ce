//! GCP provider APIs
//!
//! Provider configuration types and admission validation for a Gardener
//! extension running Kubernetes clusters on GCP:
//! - [`types`]: the `v1alpha1` provider config kinds
//! - [`gardener`]: host objects the validators take as context
//! - [`validation`]: create and update validators returning field errors
//! - [`config`]: admission layer configuration

pub mod config;
pub mod gardener;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use config::{AdmissionConfig, ConfigError};
