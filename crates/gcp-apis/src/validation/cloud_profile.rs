//! `CloudProfileConfig` validation
//!
//! Two passes run over a cloud profile:
//! 1. Every provider image entry is well-formed. Each version uses either
//!    the legacy image/architecture pair or capability flavors, depending
//!    on whether the profile defines capabilities.
//! 2. Every image version the profile offers resolves to a provider image
//!    for each architecture or capability flavor it is offered with.

use std::collections::BTreeMap;

use field_validation::{ErrorList, FieldError, Path, rules};
use tracing::debug;

use crate::gardener::{
    self, ARCHITECTURE_CAPABILITY, Capabilities, CapabilityDefinition, VALID_ARCHITECTURES, capabilities_equal,
    capabilities_with_defaults, capability_flavors_with_defaults,
};
use crate::types::{CloudProfileConfig, ImageFormat, MachineImageFlavor, MachineImages};

/// Architecture assumed for legacy entries without one.
pub const DEFAULT_ARCHITECTURE: &str = "amd64";

/// Image paths of a `CloudProfileConfig` indexed by image name and version.
#[derive(Debug, Default)]
pub struct ProviderImages<'a> {
    images: BTreeMap<&'a str, BTreeMap<&'a str, ProviderVersion<'a>>>,
}

#[derive(Debug, Default)]
struct ProviderVersion<'a> {
    by_architecture: BTreeMap<&'a str, &'a str>,
    flavors: Vec<&'a MachineImageFlavor>,
}

impl<'a> ProviderImages<'a> {
    /// Index the well-formed entries of `config`. Mixed and empty entries are skipped.
    #[must_use]
    pub fn new(config: &'a CloudProfileConfig) -> Self {
        let mut images: BTreeMap<&str, BTreeMap<&str, ProviderVersion<'_>>> = BTreeMap::new();
        for image in &config.machine_images {
            let versions = images.entry(image.name.as_str()).or_default();
            for version in &image.versions {
                let entry = versions.entry(version.version.as_str()).or_default();
                match version.format() {
                    ImageFormat::Legacy { image, architecture } => {
                        entry
                            .by_architecture
                            .insert(architecture.unwrap_or(DEFAULT_ARCHITECTURE), image);
                    }
                    ImageFormat::Flavors(flavors) => entry.flavors.extend(flavors),
                    ImageFormat::Mixed | ImageFormat::Empty => {}
                }
            }
        }
        Self { images }
    }

    /// Whether an image with this name is mapped.
    #[must_use]
    pub fn has_image(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    /// Whether this image version is mapped.
    #[must_use]
    pub fn has_version(&self, name: &str, version: &str) -> bool {
        self.images.get(name).is_some_and(|versions| versions.contains_key(version))
    }

    /// Image path of a legacy entry.
    #[must_use]
    pub fn image_for_architecture(&self, name: &str, version: &str, architecture: &str) -> Option<&'a str> {
        self.version(name, version)?.by_architecture.get(architecture).copied()
    }

    /// Image path of the flavor whose defaulted capabilities equal `capabilities`.
    #[must_use]
    pub fn image_for_capabilities(
        &self,
        name: &str,
        version: &str,
        capabilities: &Capabilities,
        definitions: &[CapabilityDefinition],
    ) -> Option<&'a str> {
        let wanted = capabilities_with_defaults(capabilities, definitions);
        self.version(name, version)?
            .flavors
            .iter()
            .copied()
            .find(|flavor| capabilities_equal(&capabilities_with_defaults(&flavor.capabilities, definitions), &wanted))
            .map(|flavor| flavor.image.as_str())
    }

    fn version(&self, name: &str, version: &str) -> Option<&ProviderVersion<'a>> {
        self.images.get(name)?.get(version)
    }
}

/// Validate a `CloudProfileConfig` against the machine images and capability
/// definitions of its cloud profile.
#[must_use]
pub fn validate_cloud_profile_config(
    config: &CloudProfileConfig,
    machine_images: &[gardener::MachineImage],
    capability_definitions: &[CapabilityDefinition],
    fld_path: &Path,
) -> ErrorList {
    let mut all_errs = validate_provider_images(
        &config.machine_images,
        capability_definitions,
        &fld_path.child("machineImages"),
    );
    all_errs.extend(validate_image_coverage(
        &ProviderImages::new(config),
        machine_images,
        capability_definitions,
        &Path::new("spec").child("machineImages"),
    ));

    debug!(
        images = config.machine_images.len(),
        capabilities = capability_definitions.len(),
        errors = all_errs.len(),
        "Validated CloudProfileConfig"
    );
    all_errs
}

fn validate_provider_images(
    images: &[MachineImages],
    capability_definitions: &[CapabilityDefinition],
    fld_path: &Path,
) -> ErrorList {
    let mut all_errs = ErrorList::new();

    if images.is_empty() {
        all_errs.push(FieldError::required(fld_path, "must provide at least one machine image"));
    }

    for (i, image) in images.iter().enumerate() {
        let idx_path = fld_path.index(i);
        all_errs.extend(rules::required(&image.name, &idx_path.child("name"), "must provide a name"));

        let versions_path = idx_path.child("versions");
        if image.versions.is_empty() {
            all_errs.push(FieldError::required(
                &versions_path,
                format!("must provide at least one version for machine image {:?}", image.name),
            ));
        }

        for (j, version) in image.versions.iter().enumerate() {
            let version_path = versions_path.index(j);
            all_errs.extend(rules::required(
                &version.version,
                &version_path.child("version"),
                "must provide a version",
            ));

            match version.format() {
                ImageFormat::Mixed => all_errs.push(FieldError::forbidden(
                    &version_path,
                    "must not provide both image/architecture and capabilityFlavors",
                )),
                ImageFormat::Empty if capability_definitions.is_empty() => {
                    all_errs.push(FieldError::required(&version_path.child("image"), "must provide an image"));
                }
                ImageFormat::Empty => all_errs.push(FieldError::required(
                    &version_path.child("capabilityFlavors"),
                    "must provide at least one capability flavor",
                )),
                ImageFormat::Legacy { image, architecture } => {
                    if !capability_definitions.is_empty() {
                        all_errs.push(FieldError::forbidden(
                            &version_path.child("image"),
                            "must not be set as the CloudProfile defines capabilities, use capabilityFlavors instead",
                        ));
                        continue;
                    }
                    all_errs.extend(rules::required(image, &version_path.child("image"), "must provide an image"));
                    if let Some(architecture) = architecture {
                        all_errs.extend(rules::supported(
                            architecture,
                            &VALID_ARCHITECTURES,
                            &version_path.child("architecture"),
                        ));
                    }
                }
                ImageFormat::Flavors(flavors) => {
                    let flavors_path = version_path.child("capabilityFlavors");
                    if capability_definitions.is_empty() {
                        all_errs.push(FieldError::forbidden(
                            &flavors_path,
                            "must not be set as the CloudProfile does not define capabilities",
                        ));
                        continue;
                    }
                    for (k, flavor) in flavors.iter().enumerate() {
                        let flavor_path = flavors_path.index(k);
                        all_errs.extend(rules::required(
                            &flavor.image,
                            &flavor_path.child("image"),
                            "must provide an image",
                        ));
                        all_errs.extend(validate_capabilities(
                            &flavor.capabilities,
                            capability_definitions,
                            &flavor_path.child("capabilities"),
                        ));
                    }
                }
            }
        }
    }

    all_errs
}

/// Validate a capability set against the capability definitions.
///
/// Unknown names or values are not supported, every named capability needs
/// at least one value, and the (defaulted) architecture must be exactly one.
#[must_use]
pub fn validate_capabilities(
    capabilities: &Capabilities,
    definitions: &[CapabilityDefinition],
    fld_path: &Path,
) -> ErrorList {
    let mut all_errs = ErrorList::new();
    let names: Vec<&str> = definitions.iter().map(|definition| definition.name.as_str()).collect();

    for (name, values) in capabilities {
        let name_path = fld_path.key(name.as_str());
        let Some(definition) = definitions.iter().find(|definition| &definition.name == name) else {
            all_errs.push(FieldError::not_supported(&name_path, name.as_str(), &names));
            continue;
        };
        if values.is_empty() {
            all_errs.push(FieldError::required(&name_path, "must provide at least one value"));
        }
        for (i, value) in values.iter().enumerate() {
            all_errs.extend(rules::supported(value, &definition.values, &name_path.index(i)));
        }
    }

    let defaulted = capabilities_with_defaults(capabilities, definitions);
    if let Some(architectures) = defaulted.get(ARCHITECTURE_CAPABILITY) {
        if architectures.len() != 1 {
            all_errs.push(FieldError::invalid(
                &fld_path.key(ARCHITECTURE_CAPABILITY),
                architectures.clone(),
                "must have exactly one architecture",
            ));
        }
    }

    all_errs
}

// Every offered image version needs a provider image for each architecture
// or capability flavor it is offered with.
fn validate_image_coverage(
    provider_images: &ProviderImages<'_>,
    machine_images: &[gardener::MachineImage],
    capability_definitions: &[CapabilityDefinition],
    fld_path: &Path,
) -> ErrorList {
    let mut all_errs = ErrorList::new();

    for (i, image) in machine_images.iter().enumerate() {
        if image.versions.is_empty() {
            continue;
        }
        let idx_path = fld_path.index(i);
        if !provider_images.has_image(&image.name) {
            all_errs.push(FieldError::required(
                &idx_path,
                format!("must provide an image mapping for image {:?} in providerConfig", image.name),
            ));
            continue;
        }

        for (j, version) in image.versions.iter().enumerate() {
            let version_path = idx_path.child("versions").index(j);
            if !provider_images.has_version(&image.name, &version.version) {
                all_errs.push(FieldError::required(
                    &version_path,
                    format!(
                        "machine image version {}@{} is not defined in the providerConfig",
                        image.name, version.version
                    ),
                ));
                continue;
            }

            if capability_definitions.is_empty() {
                let default_architectures = [DEFAULT_ARCHITECTURE.to_string()];
                let architectures = if version.architectures.is_empty() {
                    &default_architectures[..]
                } else {
                    &version.architectures[..]
                };
                for architecture in architectures {
                    if provider_images
                        .image_for_architecture(&image.name, &version.version, architecture)
                        .is_none()
                    {
                        all_errs.push(FieldError::required(
                            &version_path,
                            format!(
                                "must provide an image mapping for version {:?} and architecture: {architecture}",
                                version.version
                            ),
                        ));
                    }
                }
                continue;
            }

            let flavors = capability_flavors_with_defaults(&version.capability_flavors, capability_definitions);
            for (k, flavor) in flavors.iter().enumerate() {
                if provider_images
                    .image_for_capabilities(&image.name, &version.version, flavor, capability_definitions)
                    .is_none()
                {
                    all_errs.push(FieldError::required(
                        &version_path.child("capabilityFlavors").index(k),
                        format!(
                            "must provide an image mapping for version {:?} and capabilities {}",
                            version.version,
                            render_capabilities(flavor)
                        ),
                    ));
                }
            }
        }
    }

    all_errs
}

fn render_capabilities(capabilities: &Capabilities) -> String {
    let rendered: Vec<String> = capabilities
        .iter()
        .map(|(name, values)| format!("{name}=[{}]", values.join(",")))
        .collect();
    format!("{{{}}}", rendered.join(", "))
}
