//! `ControlPlaneConfig` validation

use std::collections::BTreeSet;

use field_validation::{ErrorList, FieldError, Path, rules};
use tracing::debug;

use super::feature_gates::validate_feature_gates;
use crate::types::ControlPlaneConfig;

/// Validate a `ControlPlaneConfig`.
///
/// The zone is checked independently for presence, membership in the
/// region's zones and membership in the worker zones; every failing check
/// is reported.
#[must_use]
pub fn validate_control_plane_config(
    config: &ControlPlaneConfig,
    allowed_zones: &BTreeSet<String>,
    worker_zones: &BTreeSet<String>,
    version: &str,
    fld_path: &Path,
) -> ErrorList {
    let mut all_errs = ErrorList::new();
    let zone_path = fld_path.child("zone");

    if config.zone.is_empty() {
        all_errs.push(FieldError::required(&zone_path, "must provide the name of a zone in this region"));
    } else if !allowed_zones.contains(&config.zone) {
        let supported: Vec<&str> = allowed_zones.iter().map(String::as_str).collect();
        all_errs.push(FieldError::not_supported(&zone_path, config.zone.as_str(), &supported));
    }

    if !worker_zones.contains(&config.zone) {
        all_errs.push(FieldError::invalid(
            &zone_path,
            config.zone.as_str(),
            "must be part of at least one worker zone",
        ));
    }

    if let Some(ccm) = &config.cloud_controller_manager {
        all_errs.extend(validate_feature_gates(
            &ccm.feature_gates,
            version,
            &fld_path.child("cloudControllerManager").child("featureGates"),
        ));
    }

    debug!(zone = %config.zone, errors = all_errs.len(), "Validated ControlPlaneConfig");
    all_errs
}

/// Validate a transition between two `ControlPlaneConfig`s. The zone is immutable.
#[must_use]
pub fn validate_control_plane_config_update(
    old: &ControlPlaneConfig,
    new: &ControlPlaneConfig,
    fld_path: &Path,
) -> ErrorList {
    rules::immutable(&new.zone, &old.zone, &fld_path.child("zone"))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::types::CloudControllerManagerConfig;
    use field_validation::ErrorType;

    fn zones(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn config(zone: &str) -> ControlPlaneConfig {
        ControlPlaneConfig {
            zone: zone.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_zone() {
        let errs = validate_control_plane_config(
            &config("zone1"),
            &zones(&["zone1", "zone2", "zone3"]),
            &zones(&["zone1", "zone2"]),
            "1.30.0",
            &Path::root(),
        );
        assert!(errs.is_empty(), "unexpected errors: {errs:?}");
    }

    #[test]
    fn test_empty_zone_reports_required_and_worker_zone() {
        let errs = validate_control_plane_config(
            &config(""),
            &zones(&["zone1", "zone2"]),
            &zones(&["zone1", "zone2"]),
            "1.30.0",
            &Path::root(),
        );

        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].error_type, ErrorType::Required);
        assert_eq!(errs[0].field, "zone");
        assert!(errs[0].detail.contains("must provide the name of a zone"));
        assert_eq!(errs[1].error_type, ErrorType::Invalid);
        assert_eq!(errs[1].field, "zone");
        assert!(errs[1].detail.contains("must be part of at least one worker zone"));
    }

    #[test]
    fn test_zone_outside_region_and_workers() {
        let errs = validate_control_plane_config(
            &config("zone9"),
            &zones(&["zone1", "zone2"]),
            &zones(&["zone1"]),
            "1.30.0",
            &Path::root(),
        );

        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].error_type, ErrorType::NotSupported);
        assert_eq!(errs[0].detail, "supported values: \"zone1\", \"zone2\"");
        assert_eq!(errs[1].error_type, ErrorType::Invalid);
    }

    #[test]
    fn test_zone_in_region_but_not_in_workers() {
        let errs = validate_control_plane_config(
            &config("zone2"),
            &zones(&["zone1", "zone2"]),
            &zones(&["zone1"]),
            "1.30.0",
            &Path::root(),
        );
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].error_type, ErrorType::Invalid);
    }

    #[test]
    fn test_feature_gates_are_validated() {
        let mut cp = config("zone1");
        cp.cloud_controller_manager = Some(CloudControllerManagerConfig {
            feature_gates: BTreeMap::from([("Unknown".to_string(), true)]),
        });

        let errs = validate_control_plane_config(
            &cp,
            &zones(&["zone1"]),
            &zones(&["zone1"]),
            "1.30.0",
            &Path::root(),
        );
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "cloudControllerManager.featureGates.Unknown");
    }

    #[test]
    fn test_zone_is_immutable() {
        let path = Path::root();
        assert!(validate_control_plane_config_update(&config("zone1"), &config("zone1"), &path).is_empty());

        let errs = validate_control_plane_config_update(&config("zone1"), &config("zone2"), &path);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "zone");
        assert_eq!(errs[0].detail, "field is immutable");
    }
}
