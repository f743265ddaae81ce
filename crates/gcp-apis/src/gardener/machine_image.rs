//! Cloud profile machine images and capabilities

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Name of the architecture capability.
pub const ARCHITECTURE_CAPABILITY: &str = "architecture";

/// CPU architectures machine images can be built for.
pub const VALID_ARCHITECTURES: [&str; 2] = ["amd64", "arm64"];

/// Capability name to supported values, e.g. `architecture: [amd64]`.
pub type Capabilities = BTreeMap<String, Vec<String>>;

/// A capability the cloud profile defines, with all values it may take
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDefinition {
    /// Capability name
    pub name: String,

    /// Allowed values, the first being the most preferred
    #[serde(default)]
    pub values: Vec<String>,
}

/// A machine image declared in the cloud profile spec
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MachineImage {
    /// Logical name of the image
    pub name: String,

    /// Offered versions
    #[serde(default)]
    pub versions: Vec<MachineImageVersion>,
}

/// A version of a cloud profile machine image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MachineImageVersion {
    /// Version string
    pub version: String,

    /// Architectures the version is offered for (legacy format)
    #[serde(default)]
    pub architectures: Vec<String>,

    /// Capability flavors the version is offered for
    #[serde(default)]
    pub capability_flavors: Vec<Capabilities>,
}

/// Fill every capability missing from `capabilities` with all values of its definition.
#[must_use]
pub fn capabilities_with_defaults(capabilities: &Capabilities, definitions: &[CapabilityDefinition]) -> Capabilities {
    let mut defaulted = capabilities.clone();
    for definition in definitions {
        defaulted
            .entry(definition.name.clone())
            .or_insert_with(|| definition.values.clone());
    }
    defaulted
}

/// Flavors of a version with defaults applied. No flavors means one flavor
/// supporting every defined value.
#[must_use]
pub fn capability_flavors_with_defaults(
    flavors: &[Capabilities],
    definitions: &[CapabilityDefinition],
) -> Vec<Capabilities> {
    if flavors.is_empty() {
        return vec![capabilities_with_defaults(&Capabilities::new(), definitions)];
    }
    flavors
        .iter()
        .map(|flavor| capabilities_with_defaults(flavor, definitions))
        .collect()
}

/// Whether two capability sets are equal, ignoring value order and duplicates.
#[must_use]
pub fn capabilities_equal(a: &Capabilities, b: &Capabilities) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|(name, values)| {
        b.get(name).is_some_and(|other| {
            values.iter().collect::<BTreeSet<_>>() == other.iter().collect::<BTreeSet<_>>()
        })
    })
}
