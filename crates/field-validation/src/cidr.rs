//! CIDR validation helpers
//!
//! A [`Cidr`] couples a CIDR string with the field path it was read from, so
//! that overlap and subset violations can be attributed to the right field.
//! Unparseable CIDRs report a single parse error and are ignored by every
//! relational check.

use std::net::IpAddr;

use ipnetwork::IpNetwork;

use crate::error::{ErrorList, FieldError};
use crate::path::Path;

/// A CIDR value read from a field.
#[derive(Debug, Clone)]
pub struct Cidr {
    value: String,
    path: Path,
    network: Option<IpNetwork>,
}

impl Cidr {
    /// Parse `value`. Parse failures are reported by [`Cidr::validate_parse`].
    #[must_use]
    pub fn new(value: impl Into<String>, path: Path) -> Self {
        let value = value.into();
        let network = parse_cidr(&value);
        Self { value, path, network }
    }

    /// The raw CIDR string.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The field path the CIDR was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed network, if the value is a valid CIDR.
    #[must_use]
    pub fn network(&self) -> Option<IpNetwork> {
        self.network
    }

    /// `Invalid` when the value is not a CIDR.
    #[must_use]
    pub fn validate_parse(&self) -> ErrorList {
        if self.network.is_some() {
            Vec::new()
        } else {
            vec![FieldError::invalid(
                &self.path,
                self.value.as_str(),
                format!("invalid CIDR address: {}", self.value),
            )]
        }
    }

    /// `Invalid` when host bits are set beyond the prefix.
    #[must_use]
    pub fn validate_canonical(&self) -> ErrorList {
        match self.network {
            Some(network) if network.ip() != network.network() => vec![FieldError::invalid(
                &self.path,
                self.value.as_str(),
                "must be valid canonical CIDR",
            )],
            _ => Vec::new(),
        }
    }

    /// Whether every address of `other` is inside this CIDR.
    #[must_use]
    pub fn contains(&self, other: &Cidr) -> bool {
        match (self.network, other.network) {
            (Some(outer), Some(inner)) => is_subnet(outer, inner),
            _ => false,
        }
    }

    /// Whether both CIDRs share at least one address.
    #[must_use]
    pub fn overlaps(&self, other: &Cidr) -> bool {
        match (self.network, other.network) {
            (Some(a), Some(b)) => is_subnet(a, b) || is_subnet(b, a),
            _ => false,
        }
    }

    /// `Invalid` on every CIDR of `others` that overlaps this one.
    #[must_use]
    pub fn validate_not_overlap(&self, others: &[&Cidr]) -> ErrorList {
        others
            .iter()
            .filter(|other| self.overlaps(other))
            .map(|other| {
                FieldError::invalid(
                    &other.path,
                    other.value.as_str(),
                    format!("must not overlap with {} ({:?})", self.path, self.value),
                )
            })
            .collect()
    }

    /// `Invalid` on every CIDR of `others` that is not inside this one.
    #[must_use]
    pub fn validate_subset(&self, others: &[&Cidr]) -> ErrorList {
        if self.network.is_none() {
            return Vec::new();
        }
        others
            .iter()
            .filter(|other| other.network.is_some() && !self.contains(other))
            .map(|other| {
                FieldError::invalid(
                    &other.path,
                    other.value.as_str(),
                    format!("must be a subset of {} ({:?})", self.path, self.value),
                )
            })
            .collect()
    }
}

fn parse_cidr(value: &str) -> Option<IpNetwork> {
    // A bare address would otherwise be accepted as a host route.
    if !value.contains('/') {
        return None;
    }
    value.parse::<IpNetwork>().ok()
}

// CIDR blocks are aligned, so they are either nested or disjoint.
fn is_subnet(outer: IpNetwork, inner: IpNetwork) -> bool {
    same_family(outer.network(), inner.network())
        && outer.prefix() <= inner.prefix()
        && outer.contains(inner.network())
}

fn same_family(a: IpAddr, b: IpAddr) -> bool {
    a.is_ipv4() == b.is_ipv4()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;

    fn cidr(value: &str, name: &str) -> Cidr {
        Cidr::new(value, Path::new(name))
    }

    #[test]
    fn test_parse() {
        assert!(cidr("10.250.0.0/16", "workers").validate_parse().is_empty());
        assert!(cidr("2001:db8::/32", "workers").validate_parse().is_empty());

        let errs = cidr("10.250.0.0", "workers").validate_parse();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].error_type, ErrorType::Invalid);

        assert_eq!(cidr("garbage", "workers").validate_parse().len(), 1);
    }

    #[test]
    fn test_canonical() {
        assert!(cidr("10.250.0.0/16", "workers").validate_canonical().is_empty());
        let errs = cidr("10.250.0.1/16", "workers").validate_canonical();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].detail, "must be valid canonical CIDR");
        assert!(cidr("garbage", "workers").validate_canonical().is_empty());
    }

    #[test]
    fn test_contains() {
        let big = cidr("10.0.0.0/8", "big");
        let small = cidr("10.250.0.0/16", "small");
        let other = cidr("192.168.0.0/16", "other");

        assert!(big.contains(&small));
        assert!(!small.contains(&big));
        assert!(!big.contains(&other));
        assert!(big.contains(&big));
        assert!(!big.contains(&cidr("::/0", "v6")));
    }

    #[test]
    fn test_not_overlap_attributes_error_to_other() {
        let workers = cidr("10.250.0.0/16", "networks.workers");
        let internal = cidr("10.250.112.0/22", "networks.internal");
        let errs = workers.validate_not_overlap(&[&internal]);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "networks.internal");
        assert_eq!(errs[0].detail, "must not overlap with networks.workers (\"10.250.0.0/16\")");

        let internal = cidr("10.251.0.0/22", "networks.internal");
        assert!(workers.validate_not_overlap(&[&internal]).is_empty());
    }

    #[test]
    fn test_subset() {
        let nodes = cidr("10.250.0.0/16", "networking.nodes");
        let workers = cidr("10.250.0.0/19", "networks.workers");
        assert!(nodes.validate_subset(&[&workers]).is_empty());

        let workers = cidr("10.0.0.0/8", "networks.workers");
        let errs = nodes.validate_subset(&[&workers]);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "networks.workers");
    }
}
