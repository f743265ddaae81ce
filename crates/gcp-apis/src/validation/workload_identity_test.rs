//! Unit tests for `WorkloadIdentityConfig` validation

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test code")]
mod tests {
    use field_validation::{ErrorListExt, ErrorType, Path};
    use k8s_openapi::apimachinery::pkg::runtime::RawExtension;
    use regex::Regex;
    use serde_json::json;

    use super::super::workload_identity::{
        WorkloadIdentityPolicy, validate_workload_identity_config, validate_workload_identity_config_update,
    };
    use crate::test_utils::*;
    use crate::types::WorkloadIdentityConfig;

    fn policy() -> WorkloadIdentityPolicy {
        WorkloadIdentityPolicy {
            allowed_token_urls: vec!["https://sts.googleapis.com/v1/token".to_string()],
            allowed_service_account_impersonation_urls: vec![
                Regex::new(r"^https://iamcredentials\.googleapis\.com/v1/projects/-/serviceAccounts/.+:generateAccessToken$")
                    .unwrap(),
            ],
        }
    }

    fn config_with(credentials: serde_json::Value) -> WorkloadIdentityConfig {
        WorkloadIdentityConfig {
            project_id: "my-project".to_string(),
            credentials_config: Some(RawExtension(credentials)),
        }
    }

    #[test]
    fn test_valid_config() {
        let errs = validate_workload_identity_config(&create_test_workload_identity_config(), &policy(), &Path::root());
        assert!(errs.is_empty(), "unexpected errors: {errs:?}");

        let errs = validate_workload_identity_config(
            &create_test_workload_identity_config(),
            &WorkloadIdentityPolicy::default(),
            &Path::root(),
        );
        assert!(errs.is_empty(), "an empty policy allows every https URL: {errs:?}");
    }

    #[test]
    fn test_project_id_format() {
        for project_id in ["", "1project", "abc", "My-Project", "project-"] {
            let mut config = create_test_workload_identity_config();
            config.project_id = project_id.to_string();
            let errs = validate_workload_identity_config(&config, &policy(), &Path::root());
            assert_eq!(errs.len(), 1, "{project_id:?} should be rejected");
            assert_eq!(errs[0].field, "projectID");
            assert_eq!(errs[0].detail, "does not match the expected format");
        }
    }

    #[test]
    fn test_missing_credentials_config() {
        let mut config = create_test_workload_identity_config();
        config.credentials_config = None;
        let errs = validate_workload_identity_config(&config, &policy(), &Path::root());

        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].error_type, ErrorType::Required);
        assert_eq!(errs[0].field, "credentialsConfig");
    }

    #[test]
    fn test_malformed_credentials_config_short_circuits() {
        let errs = validate_workload_identity_config(&config_with(json!("not an object")), &policy(), &Path::root());

        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].error_type, ErrorType::Invalid);
        assert_eq!(errs[0].detail, "has invalid format");
    }

    #[test]
    fn test_missing_universe_domain() {
        let mut credentials = create_test_credentials_config();
        credentials.as_object_mut().unwrap().remove("universe_domain");
        let errs = validate_workload_identity_config(&config_with(credentials), &policy(), &Path::root());

        assert_eq!(errs.len(), 1, "unexpected errors: {errs:?}");
        assert_eq!(errs[0].error_type, ErrorType::Forbidden);
        assert_eq!(errs[0].field, "credentialsConfig");
        assert_eq!(errs[0].detail, "missing required field: \"universe_domain\"");
    }

    #[test]
    fn test_extra_fields_are_reported_once() {
        let mut credentials = create_test_credentials_config();
        let document = credentials.as_object_mut().unwrap();
        document.insert("foo".to_string(), json!("bar"));
        document.insert("bar".to_string(), json!("baz"));
        document.insert("credential_source".to_string(), json!({"file": "/var/run/token"}));
        let errs = validate_workload_identity_config(&config_with(credentials), &policy(), &Path::root());

        assert_eq!(errs.len(), 1, "unexpected errors: {errs:?}");
        assert_eq!(errs[0].error_type, ErrorType::Forbidden);
        assert_eq!(
            errs[0].detail,
            "contains extra fields, allowed fields are: audience, service_account_impersonation_url, \
             subject_token_type, token_url, type, universe_domain"
        );
    }

    #[test]
    fn test_field_values() {
        let mut credentials = create_test_credentials_config();
        let document = credentials.as_object_mut().unwrap();
        document.insert("type".to_string(), json!("service_account"));
        document.insert("subject_token_type".to_string(), json!("urn:ietf:params:oauth:token-type:id_token"));
        document.insert("token_url".to_string(), json!("http://sts.googleapis.com/v1/token"));
        document.insert(
            "service_account_impersonation_url".to_string(),
            json!("https://evil.example.com/generateAccessToken"),
        );
        document.insert("audience".to_string(), json!(42));
        let errs = validate_workload_identity_config(&config_with(credentials), &policy(), &Path::root());

        assert_eq!(errs.len(), 5, "unexpected errors: {errs:?}");
        assert_eq!(errs.for_field("credentialsConfig.audience")[0].detail, "must be a string");
        assert_eq!(errs.for_field("credentialsConfig.type").len(), 1);
        assert_eq!(errs.for_field("credentialsConfig.subject_token_type").len(), 1);
        assert_eq!(
            errs.for_field("credentialsConfig.token_url")[0].detail,
            "should start with https://"
        );
        assert!(
            errs.for_field("credentialsConfig.service_account_impersonation_url")[0]
                .detail
                .starts_with("should match one of the allowed regular expressions")
        );
    }

    #[test]
    fn test_token_url_must_be_allowed() {
        let mut credentials = create_test_credentials_config();
        credentials
            .as_object_mut()
            .unwrap()
            .insert("token_url".to_string(), json!("https://sts.example.com/v1/token"));
        let errs = validate_workload_identity_config(&config_with(credentials), &policy(), &Path::root());

        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].error_type, ErrorType::NotSupported);
        assert_eq!(errs[0].field, "credentialsConfig.token_url");
    }

    #[test]
    fn test_update_keeps_project() {
        let old = create_test_workload_identity_config();
        let mut new = old.clone();
        assert!(validate_workload_identity_config_update(&old, &new, &policy(), &Path::root()).is_empty());

        new.project_id = "other-project".to_string();
        let errs = validate_workload_identity_config_update(&old, &new, &policy(), &Path::root());
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "projectID");
        assert_eq!(errs[0].detail, "field is immutable");
    }

    #[test]
    fn test_update_validates_new_config() {
        let old = create_test_workload_identity_config();
        let mut new = old.clone();
        new.credentials_config = None;
        let errs = validate_workload_identity_config_update(&old, &new, &policy(), &Path::root());
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].error_type, ErrorType::Required);
    }
}
