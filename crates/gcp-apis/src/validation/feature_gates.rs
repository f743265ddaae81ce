//! Feature gate validation
//!
//! Feature gates passed to control plane components must be known and
//! available in the shoot's Kubernetes version.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use field_validation::{ErrorList, FieldError, Path};
use semver::Version;
use thiserror::Error;

/// Errors looking up a feature gate.
#[derive(Debug, Error)]
pub enum FeatureGateError {
    /// The gate is not in the version table
    #[error("unknown feature gate {0}")]
    Unknown(String),

    /// The Kubernetes version cannot be parsed
    #[error("invalid kubernetes version {version:?}: {source}")]
    InvalidVersion {
        /// Offending version
        version: String,
        /// Parse failure
        source: semver::Error,
    },
}

/// Kubernetes versions a feature gate exists in: `[added_in, removed_in)`.
#[derive(Debug, Clone)]
struct VersionRange {
    added_in: Option<Version>,
    removed_in: Option<Version>,
}

impl VersionRange {
    fn contains(&self, version: &Version) -> bool {
        self.added_in.as_ref().is_none_or(|added| version >= added)
            && self.removed_in.as_ref().is_none_or(|removed| version < removed)
    }
}

const fn minor(minor: u64) -> Option<Version> {
    Some(Version::new(1, minor, 0))
}

const fn range(added_in: Option<Version>, removed_in: Option<Version>) -> VersionRange {
    VersionRange { added_in, removed_in }
}

static FEATURE_GATE_VERSION_RANGES: LazyLock<BTreeMap<&'static str, VersionRange>> = LazyLock::new(|| {
    BTreeMap::from([
        ("AllAlpha", range(None, None)),
        ("AllBeta", range(None, None)),
        ("APIListChunking", range(None, minor(32))),
        ("CloudDualStackNodeIPs", range(minor(27), minor(32))),
        ("ContextualLogging", range(minor(24), None)),
        ("DisableCloudProviders", range(minor(22), None)),
        ("DisableKubeletCloudCredentialProviders", range(minor(23), None)),
        ("InTreePluginGCEUnregister", range(minor(21), minor(31))),
        ("LoggingAlphaOptions", range(minor(24), None)),
        ("LoggingBetaOptions", range(minor(24), None)),
        ("MixedProtocolLBService", range(minor(20), minor(28))),
        ("OpenAPIEnums", range(minor(23), None)),
        ("RetryGenerateName", range(minor(30), None)),
        ("ServiceTrafficDistribution", range(minor(30), None)),
        ("StableLoadBalancerNodeSet", range(minor(27), minor(32))),
        ("WatchList", range(minor(27), None)),
    ])
});

// Kubernetes versions may come as `1.30`, `v1.30.2` or `1.30.2`.
fn parse_kubernetes_version(version: &str) -> Result<Version, FeatureGateError> {
    let trimmed = version.trim().trim_start_matches('v');
    let normalized = if trimmed.matches('.').count() == 1 {
        format!("{trimmed}.0")
    } else {
        trimmed.to_string()
    };
    Version::parse(&normalized).map_err(|source| FeatureGateError::InvalidVersion {
        version: version.to_string(),
        source,
    })
}

/// Whether `gate` is available in Kubernetes `version`.
///
/// # Errors
///
/// Fails for unknown gates and versions that are not valid semver.
pub fn is_feature_gate_supported(gate: &str, version: &str) -> Result<bool, FeatureGateError> {
    let range = FEATURE_GATE_VERSION_RANGES
        .get(gate)
        .ok_or_else(|| FeatureGateError::Unknown(gate.to_string()))?;
    let version = parse_kubernetes_version(version)?;
    // Pre-releases of a minor count as that minor
    let version = Version::new(version.major, version.minor, version.patch);
    Ok(range.contains(&version))
}

/// Validate feature gate names against the Kubernetes `version`.
#[must_use]
pub fn validate_feature_gates(feature_gates: &BTreeMap<String, bool>, version: &str, fld_path: &Path) -> ErrorList {
    let mut all_errs = ErrorList::new();
    for gate in feature_gates.keys() {
        match is_feature_gate_supported(gate, version) {
            Err(err) => all_errs.push(FieldError::invalid(&fld_path.child(gate.as_str()), gate.as_str(), err.to_string())),
            Ok(false) => all_errs.push(FieldError::forbidden(
                &fld_path.child(gate.as_str()),
                format!("not supported in Kubernetes version {version}"),
            )),
            Ok(true) => {}
        }
    }
    all_errs
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test code")]
mod tests {
    use super::*;
    use field_validation::ErrorType;

    #[test]
    fn test_supported_gates() {
        assert!(is_feature_gate_supported("AllAlpha", "1.30.0").unwrap());
        assert!(is_feature_gate_supported("CloudDualStackNodeIPs", "1.29").unwrap());
        assert!(!is_feature_gate_supported("CloudDualStackNodeIPs", "1.26.3").unwrap());
        assert!(!is_feature_gate_supported("CloudDualStackNodeIPs", "v1.32.0").unwrap());
        assert!(is_feature_gate_supported("WatchList", "1.30.0-rc.1").unwrap());
    }

    #[test]
    fn test_unknown_gate_and_bad_version() {
        assert!(matches!(
            is_feature_gate_supported("Foo", "1.30.0"),
            Err(FeatureGateError::Unknown(_))
        ));
        assert!(matches!(
            is_feature_gate_supported("AllAlpha", "one.thirty"),
            Err(FeatureGateError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_validate_feature_gates() {
        let gates = BTreeMap::from([
            ("AllAlpha".to_string(), true),
            ("Foo".to_string(), true),
            ("MixedProtocolLBService".to_string(), false),
        ]);
        let path = Path::new("cloudControllerManager").child("featureGates");
        let errs = validate_feature_gates(&gates, "1.30.0", &path);

        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].error_type, ErrorType::Invalid);
        assert_eq!(errs[0].field, "cloudControllerManager.featureGates.Foo");
        assert_eq!(errs[0].detail, "unknown feature gate Foo");
        assert_eq!(errs[1].error_type, ErrorType::Forbidden);
        assert_eq!(errs[1].field, "cloudControllerManager.featureGates.MixedProtocolLBService");
    }
}
