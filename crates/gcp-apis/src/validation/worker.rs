//! `WorkerConfig` validation

use std::collections::HashSet;

use field_validation::{ErrorList, FieldError, Path, rules};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use tracing::debug;

use crate::gardener::{self, VOLUME_TYPE_SCRATCH};
use crate::types::{DataVolume, DiskEncryption, Gpu, NodeTemplate, ServiceAccount, Volume, WorkerConfig};

/// Interfaces local SSDs can be attached with.
pub const VALID_LOCAL_SSD_INTERFACES: [&str; 2] = ["NVME", "SCSI"];

/// Disk types that accept provisioned IOPS.
pub const DISK_TYPES_WITH_PROVISIONED_IOPS: [&str; 3] = ["pd-extreme", "hyperdisk-extreme", "hyperdisk-balanced"];

/// Disk types that accept provisioned throughput.
pub const DISK_TYPES_WITH_PROVISIONED_THROUGHPUT: [&str; 2] = ["hyperdisk-throughput", "hyperdisk-balanced"];

/// Validate the provider config of a worker pool against the pool's volumes.
///
/// `volume` and `data_volumes` are the pool's own root and data volumes. A
/// missing config is validated as an empty one so the SCRATCH rules still
/// apply.
#[must_use]
pub fn validate_worker_config(
    config: Option<&WorkerConfig>,
    volume: Option<&gardener::Volume>,
    data_volumes: &[gardener::DataVolume],
    fld_path: &Path,
) -> ErrorList {
    let default_config = WorkerConfig::default();
    let config = config.unwrap_or(&default_config);
    let mut all_errs = ErrorList::new();

    all_errs.extend(validate_volume_config(config.volume.as_ref(), volume, data_volumes, &fld_path.child("volume")));
    all_errs.extend(validate_data_volume_configs(&config.data_volumes, data_volumes, &fld_path.child("dataVolumes")));

    if let Some(gpu) = &config.gpu {
        all_errs.extend(validate_gpu(gpu, &fld_path.child("gpu")));
    }
    if let Some(service_account) = &config.service_account {
        all_errs.extend(validate_service_account(service_account, &fld_path.child("serviceAccount")));
    }
    if let Some(node_template) = &config.node_template {
        all_errs.extend(validate_node_template(node_template, &fld_path.child("nodeTemplate")));
    }

    debug!(
        data_volumes = data_volumes.len(),
        errors = all_errs.len(),
        "Validated WorkerConfig"
    );
    all_errs
}

fn validate_volume_config(
    config: Option<&Volume>,
    volume: Option<&gardener::Volume>,
    data_volumes: &[gardener::DataVolume],
    fld_path: &Path,
) -> ErrorList {
    let mut all_errs = ErrorList::new();
    let interface_path = fld_path.child("localSSDInterface");
    let interface = config.and_then(|config| config.local_ssd_interface.as_deref());
    let encryption = config.and_then(|config| config.encryption.as_ref());

    if data_volumes.iter().any(gardener::DataVolume::is_scratch) {
        match interface {
            None => all_errs.push(FieldError::required(
                &interface_path,
                format!("must be set when using {VOLUME_TYPE_SCRATCH} volumes"),
            )),
            Some(interface) => {
                all_errs.extend(rules::supported(interface, &VALID_LOCAL_SSD_INTERFACES, &interface_path));
            }
        }
        if encryption.is_some() {
            all_errs.push(FieldError::forbidden(
                &fld_path.child("encryption"),
                format!("must not be set in combination with {VOLUME_TYPE_SCRATCH} volumes"),
            ));
        }
    } else if interface.is_some() {
        all_errs.push(FieldError::forbidden(
            &interface_path,
            format!("is only allowed when using {VOLUME_TYPE_SCRATCH} volumes"),
        ));
    }

    if let Some(encryption) = encryption {
        all_errs.extend(validate_disk_encryption(encryption, &fld_path.child("encryption")));
    }

    if let Some(config) = config {
        let disk_type = volume.and_then(|volume| volume.volume_type.as_deref());
        all_errs.extend(validate_provisioned_performance(
            disk_type,
            config.provisioned_iops,
            config.provisioned_throughput,
            fld_path,
        ));
    }

    all_errs
}

fn validate_disk_encryption(encryption: &DiskEncryption, fld_path: &Path) -> ErrorList {
    rules::required(
        encryption.kms_key_name.as_deref().unwrap_or_default(),
        &fld_path.child("kmsKeyName"),
        "must specify the kms key name",
    )
}

fn validate_data_volume_configs(
    configs: &[DataVolume],
    data_volumes: &[gardener::DataVolume],
    fld_path: &Path,
) -> ErrorList {
    let mut all_errs = ErrorList::new();
    let mut seen = HashSet::new();

    for (i, config) in configs.iter().enumerate() {
        let idx_path = fld_path.index(i);
        let name_path = idx_path.child("name");
        let data_volume = data_volumes.iter().find(|volume| volume.name == config.name);

        if data_volume.is_none() {
            all_errs.push(FieldError::invalid(
                &name_path,
                config.name.as_str(),
                format!("could not find dataVolume with name {}", config.name),
            ));
        }
        if !seen.insert(config.name.as_str()) {
            all_errs.push(FieldError::duplicate(&name_path, config.name.as_str()));
        }

        if let Some(source_image) = &config.source_image {
            all_errs.extend(rules::required(
                source_image,
                &idx_path.child("sourceImage"),
                "must not be empty when provided",
            ));
        }

        let disk_type = data_volume.and_then(|volume| volume.volume_type.as_deref());
        all_errs.extend(validate_provisioned_performance(
            disk_type,
            config.provisioned_iops,
            config.provisioned_throughput,
            &idx_path,
        ));
    }

    all_errs
}

// IOPS and throughput overrides are only honoured by some disk families.
fn validate_provisioned_performance(
    disk_type: Option<&str>,
    iops: Option<i64>,
    throughput: Option<i64>,
    fld_path: &Path,
) -> ErrorList {
    let mut all_errs = ErrorList::new();
    let disk_type = disk_type.unwrap_or_default();

    if let Some(iops) = iops {
        let path = fld_path.child("provisionedIops");
        if DISK_TYPES_WITH_PROVISIONED_IOPS.contains(&disk_type) {
            all_errs.extend(rules::positive(iops, &path));
        } else {
            all_errs.push(FieldError::forbidden(
                &path,
                format!(
                    "is only allowed for disk types {}",
                    DISK_TYPES_WITH_PROVISIONED_IOPS.join(", ")
                ),
            ));
        }
    }

    if let Some(throughput) = throughput {
        let path = fld_path.child("provisionedThroughput");
        if DISK_TYPES_WITH_PROVISIONED_THROUGHPUT.contains(&disk_type) {
            all_errs.extend(rules::positive(throughput, &path));
        } else {
            all_errs.push(FieldError::forbidden(
                &path,
                format!(
                    "is only allowed for disk types {}",
                    DISK_TYPES_WITH_PROVISIONED_THROUGHPUT.join(", ")
                ),
            ));
        }
    }

    all_errs
}

fn validate_gpu(gpu: &Gpu, fld_path: &Path) -> ErrorList {
    let mut all_errs = rules::required(
        &gpu.accelerator_type,
        &fld_path.child("acceleratorType"),
        "must be set when providing gpu",
    );
    if gpu.count <= 0 {
        all_errs.push(FieldError::forbidden(&fld_path.child("count"), "must be > 0 when providing gpu"));
    }
    all_errs
}

fn validate_service_account(service_account: &ServiceAccount, fld_path: &Path) -> ErrorList {
    let mut all_errs = rules::required(
        &service_account.email,
        &fld_path.child("email"),
        "must specify the email of the service account",
    );

    let scopes_path = fld_path.child("scopes");
    if service_account.scopes.is_empty() {
        all_errs.push(FieldError::required(&scopes_path, "must have at least one scope"));
    }
    all_errs.extend(rules::unique_non_empty(
        &service_account.scopes,
        &scopes_path,
        "must not be empty",
    ));

    all_errs
}

fn validate_node_template(node_template: &NodeTemplate, fld_path: &Path) -> ErrorList {
    let capacity_path = fld_path.child("capacity");
    node_template
        .capacity
        .iter()
        .filter_map(|(resource, quantity)| {
            let path = capacity_path.key(resource.as_str());
            match quantity_number(quantity) {
                None => Some(FieldError::invalid(&path, quantity.0.as_str(), "must be a valid quantity")),
                Some(number) if number < 0.0 => Some(FieldError::invalid(
                    &path,
                    quantity.0.as_str(),
                    "must be greater than or equal to 0",
                )),
                Some(_) => None,
            }
        })
        .collect()
}

// Numeric part of a quantity like `-1.5Gi` or `500m`. Suffixes never change
// the sign, so the number alone decides.
fn quantity_number(quantity: &Quantity) -> Option<f64> {
    let value = quantity.0.trim();
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.')))
        .unwrap_or(value.len());
    value[..end].parse::<f64>().ok()
}
