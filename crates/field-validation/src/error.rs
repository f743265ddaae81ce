//! Field errors
//!
//! Mirrors the Kubernetes API field error model: every error carries a kind,
//! the rendered field path, the offending value and a human-readable detail.
//! The serialized shape is what admission responses render.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::path::Path;

/// Placeholder written instead of sensitive bad values.
pub const REDACTED_VALUE: &str = "(hidden)";

/// Kind of a field error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorType {
    /// A mandatory field is missing.
    #[serde(rename = "FieldValueRequired")]
    Required,
    /// A field is present but malformed, out of range or inconsistent.
    #[serde(rename = "FieldValueInvalid")]
    Invalid,
    /// A value is not in an enumerated allow-list.
    #[serde(rename = "FieldValueNotSupported")]
    NotSupported,
    /// A value is present but disallowed in this context.
    #[serde(rename = "FieldValueForbidden")]
    Forbidden,
    /// A value is repeated where uniqueness is required.
    #[serde(rename = "FieldValueDuplicate")]
    Duplicate,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorType::Required => "Required value",
            ErrorType::Invalid => "Invalid value",
            ErrorType::NotSupported => "Unsupported value",
            ErrorType::Forbidden => "Forbidden",
            ErrorType::Duplicate => "Duplicate value",
        };
        f.write_str(text)
    }
}

/// A single validation failure attributed to a field path.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{field}: {}", error_body(.error_type, .bad_value, .detail))]
pub struct FieldError {
    /// Kind of the failure
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    /// Rendered field path, e.g. `networks.vpc.name`
    pub field: String,
    /// Offending value (or [`REDACTED_VALUE`])
    pub bad_value: Value,
    /// Human-readable explanation
    pub detail: String,
}

impl FieldError {
    fn new(error_type: ErrorType, path: &Path, bad_value: Value, detail: impl Into<String>) -> Self {
        Self {
            error_type,
            field: path.to_string(),
            bad_value,
            detail: detail.into(),
        }
    }

    /// A mandatory field is missing.
    #[must_use]
    pub fn required(path: &Path, detail: impl Into<String>) -> Self {
        Self::new(ErrorType::Required, path, Value::String(String::new()), detail)
    }

    /// A value is malformed.
    #[must_use]
    pub fn invalid(path: &Path, value: impl Into<Value>, detail: impl Into<String>) -> Self {
        Self::new(ErrorType::Invalid, path, value.into(), detail)
    }

    /// A value is not one of `supported`. The detail lists the supported values.
    #[must_use]
    pub fn not_supported<S: AsRef<str>>(path: &Path, value: impl Into<Value>, supported: &[S]) -> Self {
        let quoted: Vec<String> = supported
            .iter()
            .map(|value| format!("{:?}", value.as_ref()))
            .collect();
        let detail = if quoted.is_empty() {
            String::new()
        } else {
            format!("supported values: {}", quoted.join(", "))
        };
        Self::new(ErrorType::NotSupported, path, value.into(), detail)
    }

    /// A value is not allowed here.
    #[must_use]
    pub fn forbidden(path: &Path, detail: impl Into<String>) -> Self {
        Self::new(ErrorType::Forbidden, path, Value::String(String::new()), detail)
    }

    /// A value is repeated.
    #[must_use]
    pub fn duplicate(path: &Path, value: impl Into<Value>) -> Self {
        Self::new(ErrorType::Duplicate, path, value.into(), String::new())
    }

    /// Replace the bad value with [`REDACTED_VALUE`].
    #[must_use]
    pub fn redacted(mut self) -> Self {
        self.bad_value = Value::String(REDACTED_VALUE.to_string());
        self
    }
}

fn error_body(error_type: &ErrorType, bad_value: &Value, detail: &str) -> String {
    let mut body = match error_type {
        ErrorType::Required | ErrorType::Forbidden => error_type.to_string(),
        _ => format!("{}: {}", error_type, render_value(bad_value)),
    };
    if !detail.is_empty() {
        body.push_str(": ");
        body.push_str(detail);
    }
    body
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => format!("{text:?}"),
        other => other.to_string(),
    }
}

/// Collected validation errors.
pub type ErrorList = Vec<FieldError>;

/// All errors of a validation pass folded into a single error value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", render_aggregate(.0))]
pub struct AggregateError(pub ErrorList);

fn render_aggregate(errors: &[FieldError]) -> String {
    match errors {
        [single] => single.to_string(),
        errors => {
            let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
            format!("[{}]", rendered.join(", "))
        }
    }
}

/// Helpers on [`ErrorList`].
pub trait ErrorListExt {
    /// `Ok(())` for an empty list, the aggregated errors otherwise.
    ///
    /// # Errors
    ///
    /// Returns an [`AggregateError`] holding every error of a non-empty list.
    fn to_aggregate(self) -> Result<(), AggregateError>;

    /// Errors of the given kind.
    fn of_type(&self, error_type: ErrorType) -> Vec<&FieldError>;

    /// Errors attributed to exactly the given field.
    fn for_field(&self, field: &str) -> Vec<&FieldError>;
}

impl ErrorListExt for ErrorList {
    fn to_aggregate(self) -> Result<(), AggregateError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AggregateError(self))
        }
    }

    fn of_type(&self, error_type: ErrorType) -> Vec<&FieldError> {
        self.iter().filter(|err| err.error_type == error_type).collect()
    }

    fn for_field(&self, field: &str) -> Vec<&FieldError> {
        self.iter().filter(|err| err.field == field).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test code")]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_api_error_format() {
        let path = Path::new("networks").child("workers");

        let err = FieldError::required(&path, "must specify the network range");
        assert_eq!(err.to_string(), "networks.workers: Required value: must specify the network range");

        let err = FieldError::invalid(&path, "10.0.0.1/16", "must be valid canonical CIDR");
        assert_eq!(
            err.to_string(),
            "networks.workers: Invalid value: \"10.0.0.1/16\": must be valid canonical CIDR"
        );

        let err = FieldError::invalid(&path, 20, "must be a power of 2");
        assert_eq!(err.to_string(), "networks.workers: Invalid value: 20: must be a power of 2");
    }

    #[test]
    fn test_not_supported_lists_values() {
        let path = Path::new("volume").child("localSSDInterface");
        let err = FieldError::not_supported(&path, "SATA", &["NVME", "SCSI"]);
        assert_eq!(err.error_type, ErrorType::NotSupported);
        assert_eq!(err.detail, "supported values: \"NVME\", \"SCSI\"");
    }

    #[test]
    fn test_redacted_hides_value() {
        let err = FieldError::invalid(&Path::new("private_key"), "secret material", "bad").redacted();
        assert_eq!(err.bad_value, Value::String(REDACTED_VALUE.to_string()));
        assert!(!err.to_string().contains("secret material"));
    }

    #[test]
    fn test_serialized_shape() {
        let err = FieldError::duplicate(&Path::new("scopes").index(1), "a");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "FieldValueDuplicate");
        assert_eq!(json["field"], "scopes[1]");
        assert_eq!(json["badValue"], "a");
        assert_eq!(json["detail"], "");
    }

    #[test]
    fn test_to_aggregate() {
        let empty: ErrorList = Vec::new();
        assert!(empty.to_aggregate().is_ok());

        let errs = vec![
            FieldError::required(&Path::new("a"), "x"),
            FieldError::forbidden(&Path::new("b"), "y"),
        ];
        let aggregate = errs.to_aggregate().unwrap_err();
        assert_eq!(aggregate.to_string(), "[a: Required value: x, b: Forbidden: y]");
    }
}
