//! `CloudProfileConfig`
//!
//! Maps logical machine images (name + version) to GCP image paths, keyed by
//! CPU architecture (legacy format) or by capability flavor.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ProviderConfigKind;
use crate::gardener::Capabilities;

/// `CloudProfileConfig` contains provider-specific configuration that is embedded into a `CloudProfile`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CloudProfileConfig {
    /// Machine image mappings
    #[serde(default)]
    pub machine_images: Vec<MachineImages>,
}

impl ProviderConfigKind for CloudProfileConfig {
    const KIND: &'static str = "CloudProfileConfig";
}

/// `MachineImages` is a mapping from logical names and versions to GCP-specific identifiers
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MachineImages {
    /// Logical name of the machine image
    #[serde(default)]
    pub name: String,

    /// Versions of the machine image
    #[serde(default)]
    pub versions: Vec<MachineImageVersion>,
}

/// `MachineImageVersion` contains a version and a provider-specific identifier
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MachineImageVersion {
    /// Version of the image
    #[serde(default)]
    pub version: String,

    /// Image path (legacy format)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,

    /// CPU architecture of the image (legacy format)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,

    /// Image paths per capability set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability_flavors: Vec<MachineImageFlavor>,
}

/// `MachineImageFlavor` is an image path for a set of capabilities
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MachineImageFlavor {
    /// Image path
    #[serde(default)]
    pub image: String,

    /// Capabilities supported by the image
    #[serde(default)]
    pub capabilities: Capabilities,
}

/// Which of the two mapping formats a [`MachineImageVersion`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat<'a> {
    /// A single image with an optional architecture
    Legacy {
        /// Image path
        image: &'a str,
        /// Declared architecture
        architecture: Option<&'a str>,
    },
    /// One image per capability flavor
    Flavors(&'a [MachineImageFlavor]),
    /// Both formats present in one entry
    Mixed,
    /// Neither format present
    Empty,
}

impl MachineImageVersion {
    /// Resolve the mapping format of this entry.
    #[must_use]
    pub fn format(&self) -> ImageFormat<'_> {
        let legacy = !self.image.is_empty() || self.architecture.is_some();
        let flavors = !self.capability_flavors.is_empty();
        match (legacy, flavors) {
            (true, true) => ImageFormat::Mixed,
            (true, false) => ImageFormat::Legacy {
                image: &self.image,
                architecture: self.architecture.as_deref(),
            },
            (false, true) => ImageFormat::Flavors(&self.capability_flavors),
            (false, false) => ImageFormat::Empty,
        }
    }
}
