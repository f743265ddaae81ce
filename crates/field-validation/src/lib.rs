//! Field Validation
//!
//! Building blocks for structural validation of Kubernetes-style configuration
//! documents:
//! - [`Path`]: persistent field paths rendered as `a.b[2].c`
//! - [`FieldError`] / [`ErrorList`]: typed, path-addressed validation errors
//! - [`rules`]: composable rule primitives returning error lists
//! - [`cidr`]: CIDR parsing, canonical form, overlap and subset checks
//!
//! Validators never stop at the first problem. Every primitive returns an
//! [`ErrorList`] and callers extend their own list with it, so a single pass
//! reports every violation at once.

pub mod cidr;
pub mod error;
pub mod path;
pub mod rules;

pub use cidr::Cidr;
pub use error::{AggregateError, ErrorList, ErrorListExt, ErrorType, FieldError, REDACTED_VALUE};
pub use path::Path;
pub use rules::Sensitivity;
