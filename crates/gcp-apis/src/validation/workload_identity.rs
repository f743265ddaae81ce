//! `WorkloadIdentityConfig` validation
//!
//! The credentials config is an external account document as produced by
//! `gcloud iam workload-identity-pools create-cred-config`. It is checked
//! against a closed key table; `credential_source` is injected by the
//! extension and therefore ignored.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use field_validation::{ErrorList, FieldError, Path, Sensitivity, rules};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::types::WorkloadIdentityConfig;

/// Expected `type` of a credentials config.
pub const EXTERNAL_ACCOUNT_TYPE: &str = "external_account";

/// Expected `subject_token_type` of a credentials config.
pub const JWT_SUBJECT_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:jwt";

/// Key of the credentials config replaced by the extension.
pub const CREDENTIAL_SOURCE_KEY: &str = "credential_source";

#[allow(clippy::expect_used, reason = "constant pattern")]
static PROJECT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]{4,28}[a-z0-9]$").expect("project ID pattern compiles"));

/// Where the credentials config may point to.
///
/// Empty lists allow every https URL.
#[derive(Debug, Clone, Default)]
pub struct WorkloadIdentityPolicy {
    /// Token URLs allowed verbatim
    pub allowed_token_urls: Vec<String>,
    /// Patterns service account impersonation URLs must match one of
    pub allowed_service_account_impersonation_urls: Vec<Regex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    Optional,
}

type KeyCheck = fn(&str, &WorkloadIdentityPolicy, &Path) -> ErrorList;

struct CredentialKey {
    name: &'static str,
    presence: Presence,
    check: KeyCheck,
}

static CREDENTIALS_CONFIG_KEYS: [CredentialKey; 6] = [
    CredentialKey {
        name: "audience",
        presence: Presence::Required,
        check: check_non_empty,
    },
    CredentialKey {
        name: "service_account_impersonation_url",
        presence: Presence::Optional,
        check: check_impersonation_url,
    },
    CredentialKey {
        name: "subject_token_type",
        presence: Presence::Required,
        check: check_subject_token_type,
    },
    CredentialKey {
        name: "token_url",
        presence: Presence::Required,
        check: check_token_url,
    },
    CredentialKey {
        name: "type",
        presence: Presence::Required,
        check: check_type,
    },
    CredentialKey {
        name: "universe_domain",
        presence: Presence::Required,
        check: check_non_empty,
    },
];

/// Validate a `WorkloadIdentityConfig`.
#[must_use]
pub fn validate_workload_identity_config(
    config: &WorkloadIdentityConfig,
    policy: &WorkloadIdentityPolicy,
    fld_path: &Path,
) -> ErrorList {
    let mut all_errs = validate_project_id(&config.project_id, &fld_path.child("projectID"), Sensitivity::Plain);

    let credentials_path = fld_path.child("credentialsConfig");
    match &config.credentials_config {
        None => all_errs.push(FieldError::required(&credentials_path, "must be set")),
        Some(raw) => all_errs.extend(validate_credentials_config(&raw.0, policy, &credentials_path)),
    }

    debug!(
        project_id = %config.project_id,
        errors = all_errs.len(),
        "Validated WorkloadIdentityConfig"
    );
    all_errs
}

/// Validate a transition between two `WorkloadIdentityConfig`s.
///
/// The project is immutable; the new config has to be valid on its own.
#[must_use]
pub fn validate_workload_identity_config_update(
    old: &WorkloadIdentityConfig,
    new: &WorkloadIdentityConfig,
    policy: &WorkloadIdentityPolicy,
    fld_path: &Path,
) -> ErrorList {
    let mut all_errs = rules::immutable(&new.project_id, &old.project_id, &fld_path.child("projectID"));
    all_errs.extend(validate_workload_identity_config(new, policy, fld_path));
    all_errs
}

/// `Invalid` when `value` is not a GCP project ID.
pub(crate) fn validate_project_id(value: &str, fld_path: &Path, sensitivity: Sensitivity) -> ErrorList {
    rules::pattern(value, &PROJECT_ID_RE, fld_path, "does not match the expected format", sensitivity)
}

fn validate_credentials_config(raw: &Value, policy: &WorkloadIdentityPolicy, fld_path: &Path) -> ErrorList {
    let Value::Object(document) = raw else {
        return vec![FieldError::invalid(fld_path, raw.clone(), "has invalid format")];
    };

    let mut document: Map<String, Value> = document.clone();
    document.remove(CREDENTIAL_SOURCE_KEY);

    let mut all_errs = ErrorList::new();

    let allowed: BTreeSet<&str> = CREDENTIALS_CONFIG_KEYS.iter().map(|key| key.name).collect();
    if document.keys().any(|key| !allowed.contains(key.as_str())) {
        let allowed: Vec<&str> = allowed.into_iter().collect();
        all_errs.push(FieldError::forbidden(
            fld_path,
            format!("contains extra fields, allowed fields are: {}", allowed.join(", ")),
        ));
    }

    for key in &CREDENTIALS_CONFIG_KEYS {
        let key_path = fld_path.child(key.name);
        match document.get(key.name) {
            None if key.presence == Presence::Required => {
                all_errs.push(FieldError::forbidden(fld_path, format!("missing required field: {:?}", key.name)));
            }
            None => {}
            Some(Value::String(value)) => all_errs.extend((key.check)(value, policy, &key_path)),
            Some(other) => all_errs.push(FieldError::invalid(&key_path, other.clone(), "must be a string")),
        }
    }

    all_errs
}

fn check_non_empty(value: &str, _: &WorkloadIdentityPolicy, fld_path: &Path) -> ErrorList {
    rules::required(value, fld_path, "must not be empty")
}

fn check_type(value: &str, _: &WorkloadIdentityPolicy, fld_path: &Path) -> ErrorList {
    if value == EXTERNAL_ACCOUNT_TYPE {
        Vec::new()
    } else {
        vec![FieldError::invalid(fld_path, value, format!("should equal {EXTERNAL_ACCOUNT_TYPE:?}"))]
    }
}

fn check_subject_token_type(value: &str, _: &WorkloadIdentityPolicy, fld_path: &Path) -> ErrorList {
    if value == JWT_SUBJECT_TOKEN_TYPE {
        Vec::new()
    } else {
        vec![FieldError::invalid(fld_path, value, format!("should equal {JWT_SUBJECT_TOKEN_TYPE:?}"))]
    }
}

fn check_token_url(value: &str, policy: &WorkloadIdentityPolicy, fld_path: &Path) -> ErrorList {
    let mut all_errs = rules::https_url(value, fld_path, Sensitivity::Plain);
    if all_errs.is_empty() && !policy.allowed_token_urls.is_empty() {
        all_errs.extend(rules::supported(value, &policy.allowed_token_urls, fld_path));
    }
    all_errs
}

fn check_impersonation_url(value: &str, policy: &WorkloadIdentityPolicy, fld_path: &Path) -> ErrorList {
    let mut all_errs = rules::https_url(value, fld_path, Sensitivity::Plain);
    let patterns = &policy.allowed_service_account_impersonation_urls;
    if all_errs.is_empty() && !patterns.is_empty() && !patterns.iter().any(|re| re.is_match(value)) {
        let rendered: Vec<&str> = patterns.iter().map(Regex::as_str).collect();
        all_errs.push(FieldError::invalid(
            fld_path,
            value,
            format!("should match one of the allowed regular expressions: {}", rendered.join(", ")),
        ));
    }
    all_errs
}
