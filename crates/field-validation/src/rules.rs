//! Rule primitives
//!
//! Each rule checks one value against one constraint and returns the errors it
//! found. Rules never short-circuit each other; callers extend their own
//! [`ErrorList`] with every rule they apply to a field.

use std::collections::HashSet;
use std::fmt::Display;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{ErrorList, FieldError};
use crate::path::Path;

/// Error message used for changed immutable fields.
pub const FIELD_IMMUTABLE_ERROR_MSG: &str = "field is immutable";

/// Whether a checked value may appear in error output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sensitivity {
    /// The bad value is reported as-is.
    #[default]
    Plain,
    /// The bad value is replaced with a placeholder.
    Sensitive,
}

impl Sensitivity {
    /// Apply the redaction policy to an error.
    #[must_use]
    pub fn apply(self, err: FieldError) -> FieldError {
        match self {
            Sensitivity::Plain => err,
            Sensitivity::Sensitive => err.redacted(),
        }
    }
}

/// `Required` when `value` is empty or whitespace only.
#[must_use]
pub fn required(value: &str, path: &Path, detail: &str) -> ErrorList {
    if value.trim().is_empty() {
        vec![FieldError::required(path, detail)]
    } else {
        Vec::new()
    }
}

/// `Invalid` when `value` does not match `pattern`.
#[must_use]
pub fn pattern(value: &str, pattern: &Regex, path: &Path, detail: &str, sensitivity: Sensitivity) -> ErrorList {
    if pattern.is_match(value) {
        Vec::new()
    } else {
        vec![sensitivity.apply(FieldError::invalid(path, value, detail))]
    }
}

/// `Invalid` when the character count of `value` is outside `[min, max]`.
#[must_use]
pub fn length(value: &str, min: usize, max: usize, path: &Path, sensitivity: Sensitivity) -> ErrorList {
    let len = value.chars().count();
    if len < min {
        vec![sensitivity.apply(FieldError::invalid(
            path,
            value,
            format!("must be at least {min} characters"),
        ))]
    } else if len > max {
        vec![sensitivity.apply(FieldError::invalid(
            path,
            value,
            format!("must be no more than {max} characters"),
        ))]
    } else {
        Vec::new()
    }
}

/// `Invalid` when `value` is not a parseable URL using the `https` scheme.
///
/// The scheme is only checked after the URL parsed successfully.
#[must_use]
pub fn https_url(value: &str, path: &Path, sensitivity: Sensitivity) -> ErrorList {
    match Url::parse(value) {
        Err(_) => vec![sensitivity.apply(FieldError::invalid(path, value, "should be a valid URL"))],
        Ok(url) if url.scheme() != "https" => {
            vec![sensitivity.apply(FieldError::invalid(path, value, "should start with https://"))]
        }
        Ok(_) => Vec::new(),
    }
}

/// `Invalid` when `value` is outside the inclusive range `[min, max]`.
#[must_use]
pub fn in_range<T>(value: T, min: T, max: T, path: &Path, detail: &str) -> ErrorList
where
    T: PartialOrd + Into<Value>,
{
    if value < min || value > max {
        vec![FieldError::invalid(path, value, detail)]
    } else {
        Vec::new()
    }
}

/// `Invalid` when `value` is not strictly positive.
#[must_use]
pub fn positive<T>(value: T, path: &Path) -> ErrorList
where
    T: PartialOrd + Default + Into<Value>,
{
    if value > T::default() {
        Vec::new()
    } else {
        vec![FieldError::invalid(path, value, "must be greater than 0")]
    }
}

/// Whether `value` is a positive power of two.
#[must_use]
pub fn is_power_of_two(value: i64) -> bool {
    value > 0 && (value & (value - 1)) == 0
}

/// `Invalid` when `value` is not a power of two.
#[must_use]
pub fn power_of_two(value: i64, path: &Path) -> ErrorList {
    if is_power_of_two(value) {
        Vec::new()
    } else {
        vec![FieldError::invalid(path, value, "must be a power of 2")]
    }
}

/// `NotSupported` when `value` is not one of `supported`.
#[must_use]
pub fn supported<S: AsRef<str>>(value: &str, supported: &[S], path: &Path) -> ErrorList {
    if supported.iter().any(|candidate| candidate.as_ref() == value) {
        Vec::new()
    } else {
        vec![FieldError::not_supported(path, value, supported)]
    }
}

/// `Invalid` when `value` is shorter than `min`. The rendered duration is the bad value.
#[must_use]
pub fn min_duration(value: Duration, rendered: &str, min: Duration, path: &Path, detail: &str) -> ErrorList {
    if value < min {
        vec![FieldError::invalid(path, rendered, detail)]
    } else {
        Vec::new()
    }
}

/// `Forbidden` when `new` is smaller than `old`.
#[must_use]
pub fn not_decreasing<T: PartialOrd>(old: &T, new: &T, path: &Path, detail: &str) -> ErrorList {
    if new < old {
        vec![FieldError::forbidden(path, detail)]
    } else {
        Vec::new()
    }
}

/// `Invalid` ("field is immutable") when `new` differs from `old`.
#[must_use]
pub fn immutable<T>(new: &T, old: &T, path: &Path) -> ErrorList
where
    T: PartialEq + Serialize,
{
    if new == old {
        Vec::new()
    } else {
        let bad_value = serde_json::to_value(new).unwrap_or_default();
        vec![FieldError::invalid(path, bad_value, FIELD_IMMUTABLE_ERROR_MSG)]
    }
}

/// `Required` for empty entries and `Duplicate` for repeated entries of `values`.
///
/// Errors are attributed to `path[i]`.
#[must_use]
pub fn unique_non_empty<S: AsRef<str> + Display>(values: &[S], path: &Path, empty_detail: &str) -> ErrorList {
    let mut all_errs = ErrorList::new();
    let mut seen = HashSet::new();
    for (i, value) in values.iter().enumerate() {
        let value = value.as_ref();
        if value.is_empty() {
            all_errs.push(FieldError::required(&path.index(i), empty_detail));
        } else if !seen.insert(value) {
            all_errs.push(FieldError::duplicate(&path.index(i), value));
        }
    }
    all_errs
}
