//! `BackupBucketConfig`

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ProviderConfigKind;
use super::duration::Duration;

/// `BackupBucketConfig` represents the configuration for a backup bucket
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BackupBucketConfig {
    /// Object immutability settings of the bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immutability: Option<ImmutableConfig>,
}

impl ProviderConfigKind for BackupBucketConfig {
    const KIND: &'static str = "BackupBucketConfig";
}

/// `ImmutableConfig` represents the immutability configuration for a backup bucket
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImmutableConfig {
    /// Retention policy scope; only `bucket` is supported
    #[serde(default)]
    pub retention_type: String,

    /// How long objects stay immutable, e.g. `24h`
    #[serde(default)]
    #[schemars(with = "String")]
    pub retention_period: Duration,

    /// Whether the retention policy is locked. A locked policy can only be extended.
    #[serde(default)]
    pub locked: bool,
}

/// Lock state of a bucket's retention policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionLock {
    /// No immutability configured
    Unset,
    /// Immutability configured, not locked
    Unlocked,
    /// Immutability configured and locked
    Locked,
}

impl BackupBucketConfig {
    /// Lock state of `config`, treating an absent config as unset.
    #[must_use]
    pub fn lock_state(config: Option<&BackupBucketConfig>) -> RetentionLock {
        match config.and_then(|config| config.immutability.as_ref()) {
            None => RetentionLock::Unset,
            Some(immutability) if *immutability == ImmutableConfig::default() => RetentionLock::Unset,
            Some(immutability) if immutability.locked => RetentionLock::Locked,
            Some(_) => RetentionLock::Unlocked,
        }
    }
}
