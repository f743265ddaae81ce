//! Admission configuration
//!
//! Tunables of the admission layer, loaded from a YAML document:
//!
//! ```yaml
//! apiVersion: gcp.provider.extensions.config.gardener.cloud/v1alpha1
//! kind: AdmissionConfig
//! allowedTokenURLs:
//! - https://sts.googleapis.com/v1/token
//! allowedServiceAccountImpersonationURLRegExps:
//! - ^https://iamcredentials\.googleapis\.com/v1/projects/-/serviceAccounts/.+:generateAccessToken$
//! ```

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::validation::WorkloadIdentityPolicy;

/// Errors loading the admission configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file cannot be read
    #[error("failed to read admission config {}: {source}", .path.display())]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The document is not a valid `AdmissionConfig`
    #[error("failed to parse admission config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// An impersonation URL pattern does not compile
    #[error("invalid service account impersonation URL pattern {pattern:?}: {source}")]
    InvalidRegex {
        /// Offending pattern
        pattern: String,
        /// Compile error
        source: regex::Error,
    },
}

/// `AdmissionConfig` contains the configuration of the GCP admission layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionConfig {
    /// API version of the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Kind of the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Token URLs workload identity credentials may use. Empty allows any https URL.
    #[serde(default, rename = "allowedTokenURLs")]
    pub allowed_token_urls: Vec<String>,

    /// Patterns service account impersonation URLs have to match. Empty allows any https URL.
    #[serde(default, rename = "allowedServiceAccountImpersonationURLRegExps")]
    pub allowed_service_account_impersonation_url_regexps: Vec<String>,
}

impl AdmissionConfig {
    /// Parse an `AdmissionConfig` from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse an `AdmissionConfig` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] for malformed documents.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&yaml)?;
        info!(
            path = %path.display(),
            token_urls = config.allowed_token_urls.len(),
            impersonation_patterns = config.allowed_service_account_impersonation_url_regexps.len(),
            "Loaded admission config"
        );
        Ok(config)
    }

    /// Compile the workload identity policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRegex`] for the first pattern that does not compile.
    pub fn policy(&self) -> Result<WorkloadIdentityPolicy, ConfigError> {
        let patterns = self
            .allowed_service_account_impersonation_url_regexps
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidRegex {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WorkloadIdentityPolicy {
            allowed_token_urls: self.allowed_token_urls.clone(),
            allowed_service_account_impersonation_urls: patterns,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test code")]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
apiVersion: gcp.provider.extensions.config.gardener.cloud/v1alpha1
kind: AdmissionConfig
allowedTokenURLs:
- https://sts.googleapis.com/v1/token
allowedServiceAccountImpersonationURLRegExps:
- ^https://iamcredentials\.googleapis\.com/v1/projects/-/serviceAccounts/.+:generateAccessToken$
"#;

    #[test]
    fn test_from_yaml() {
        let config = AdmissionConfig::from_yaml(CONFIG).unwrap();
        assert_eq!(config.kind.as_deref(), Some("AdmissionConfig"));
        assert_eq!(config.allowed_token_urls, vec!["https://sts.googleapis.com/v1/token"]);
        assert_eq!(config.allowed_service_account_impersonation_url_regexps.len(), 1);

        let policy = config.policy().unwrap();
        assert!(policy.allowed_service_account_impersonation_urls[0].is_match(
            "https://iamcredentials.googleapis.com/v1/projects/-/serviceAccounts/sa@p.iam.gserviceaccount.com:generateAccessToken"
        ));
    }

    #[test]
    fn test_empty_document_allows_everything() {
        let config = AdmissionConfig::from_yaml("{}").unwrap();
        let policy = config.policy().unwrap();
        assert!(policy.allowed_token_urls.is_empty());
        assert!(policy.allowed_service_account_impersonation_urls.is_empty());
    }

    #[test]
    fn test_invalid_regex() {
        let config = AdmissionConfig {
            allowed_service_account_impersonation_url_regexps: vec!["^https://(".to_string()],
            ..Default::default()
        };
        assert!(matches!(config.policy(), Err(ConfigError::InvalidRegex { .. })));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            AdmissionConfig::from_yaml("allowedTokenURLs: {"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = AdmissionConfig::from_file("/nonexistent/admission.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/admission.yaml"));
    }
}
