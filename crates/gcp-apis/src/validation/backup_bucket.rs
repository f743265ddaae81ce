//! `BackupBucketConfig` validation
//!
//! A bucket's retention policy moves through `unset -> unlocked -> locked`.
//! Locking is one-way: a locked policy can be extended but never shortened,
//! unlocked or removed.

use field_validation::{ErrorList, FieldError, Path, rules};
use tracing::debug;

use crate::types::{BackupBucketConfig, Duration, ImmutableConfig, RetentionLock};

/// Retention types buckets support.
pub const VALID_RETENTION_TYPES: [&str; 1] = ["bucket"];

/// Shortest allowed retention period.
pub const MIN_RETENTION_PERIOD: Duration = Duration::from_hours(24);

/// Validate a `BackupBucketConfig`.
#[must_use]
pub fn validate_backup_bucket_config(config: &BackupBucketConfig, fld_path: &Path) -> ErrorList {
    let Some(immutability) = &config.immutability else {
        return ErrorList::new();
    };
    let all_errs = validate_immutable_config(immutability, &fld_path.child("immutability"));
    debug!(
        retention_period = %immutability.retention_period,
        locked = immutability.locked,
        errors = all_errs.len(),
        "Validated BackupBucketConfig"
    );
    all_errs
}

fn validate_immutable_config(immutability: &ImmutableConfig, fld_path: &Path) -> ErrorList {
    let mut all_errs = rules::supported(
        &immutability.retention_type,
        &VALID_RETENTION_TYPES,
        &fld_path.child("retentionType"),
    );
    all_errs.extend(rules::min_duration(
        immutability.retention_period.as_std(),
        &immutability.retention_period.to_string(),
        MIN_RETENTION_PERIOD.as_std(),
        &fld_path.child("retentionPeriod"),
        "must be a positive duration greater than 24h",
    ));
    all_errs
}

/// Validate a transition between two `BackupBucketConfig`s.
///
/// Absent configs count as unset. Only transitions away from a locked policy
/// are restricted.
#[must_use]
pub fn validate_backup_bucket_config_update(
    old: Option<&BackupBucketConfig>,
    new: Option<&BackupBucketConfig>,
    fld_path: &Path,
) -> ErrorList {
    let immutability_path = fld_path.child("immutability");
    if BackupBucketConfig::lock_state(old) != RetentionLock::Locked {
        return ErrorList::new();
    }
    let (Some(old_immutability), new_immutability) = (
        old.and_then(|config| config.immutability.as_ref()),
        new.and_then(|config| config.immutability.as_ref()),
    ) else {
        return ErrorList::new();
    };

    match (BackupBucketConfig::lock_state(new), new_immutability) {
        (RetentionLock::Unset, _) | (_, None) => {
            let bad_value = serde_json::to_value(new_immutability).unwrap_or_default();
            vec![FieldError::invalid(
                &immutability_path,
                bad_value,
                "immutability cannot be disabled once it is locked",
            )]
        }
        (RetentionLock::Unlocked, Some(_)) => vec![FieldError::forbidden(
            &immutability_path.child("locked"),
            "cannot unlock an immutable retention policy once it is locked",
        )],
        (RetentionLock::Locked, Some(new_immutability)) => rules::not_decreasing(
            &old_immutability.retention_period,
            &new_immutability.retention_period,
            &immutability_path.child("retentionPeriod"),
            &format!(
                "reducing the retention period from {} to {} is prohibited when the immutable retention policy is locked",
                old_immutability.retention_period, new_immutability.retention_period
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_validation::ErrorType;

    fn config(period_hours: u64, locked: bool) -> BackupBucketConfig {
        BackupBucketConfig {
            immutability: Some(ImmutableConfig {
                retention_type: "bucket".to_string(),
                retention_period: Duration::from_hours(period_hours),
                locked,
            }),
        }
    }

    #[test]
    fn test_retention_period_of_a_day_is_accepted() {
        assert!(validate_backup_bucket_config(&config(24, false), &Path::root()).is_empty());
        assert!(validate_backup_bucket_config(&BackupBucketConfig::default(), &Path::root()).is_empty());
    }

    #[test]
    fn test_retention_period_below_a_day_is_rejected() {
        let errs = validate_backup_bucket_config(&config(23, false), &Path::root());

        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].error_type, ErrorType::Invalid);
        assert_eq!(errs[0].field, "immutability.retentionPeriod");
        assert_eq!(errs[0].bad_value, "23h0m0s");
        assert!(errs[0].detail.contains("must be a positive duration greater than 24h"));
    }

    #[test]
    fn test_retention_type_must_be_bucket() {
        let mut cfg = config(48, false);
        if let Some(immutability) = cfg.immutability.as_mut() {
            immutability.retention_type = "object".to_string();
        }
        let errs = validate_backup_bucket_config(&cfg, &Path::root());

        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].error_type, ErrorType::NotSupported);
        assert_eq!(errs[0].field, "immutability.retentionType");
    }

    #[test]
    fn test_unlocked_policies_can_change_freely() {
        let path = Path::root();
        assert!(validate_backup_bucket_config_update(Some(&config(48, false)), Some(&config(24, false)), &path).is_empty());
        assert!(validate_backup_bucket_config_update(Some(&config(48, false)), None, &path).is_empty());
        assert!(validate_backup_bucket_config_update(None, Some(&config(24, true)), &path).is_empty());
    }

    #[test]
    fn test_locked_policy_can_be_extended() {
        let errs = validate_backup_bucket_config_update(Some(&config(24, true)), Some(&config(96, true)), &Path::root());
        assert!(errs.is_empty(), "unexpected errors: {errs:?}");
    }

    #[test]
    fn test_locked_policy_cannot_be_removed() {
        let old = config(24, true);
        for new in [None, Some(BackupBucketConfig::default())] {
            let errs = validate_backup_bucket_config_update(Some(&old), new.as_ref(), &Path::root());
            assert_eq!(errs.len(), 1);
            assert_eq!(errs[0].error_type, ErrorType::Invalid);
            assert_eq!(errs[0].field, "immutability");
            assert_eq!(errs[0].detail, "immutability cannot be disabled once it is locked");
        }
    }

    #[test]
    fn test_locked_policy_cannot_be_unlocked() {
        let errs = validate_backup_bucket_config_update(Some(&config(24, true)), Some(&config(24, false)), &Path::root());

        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].error_type, ErrorType::Forbidden);
        assert_eq!(errs[0].field, "immutability.locked");
        assert!(errs[0].detail.contains("cannot unlock"));
    }

    #[test]
    fn test_locked_policy_cannot_be_shortened() {
        let errs = validate_backup_bucket_config_update(Some(&config(48, true)), Some(&config(24, true)), &Path::root());

        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].error_type, ErrorType::Forbidden);
        assert_eq!(errs[0].field, "immutability.retentionPeriod");
        assert_eq!(
            errs[0].detail,
            "reducing the retention period from 48h0m0s to 24h0m0s is prohibited when the immutable retention policy is locked"
        );
    }
}
