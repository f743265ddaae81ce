//! Shoot worker pool validation
//!
//! Checks the provider-relevant parts of the host worker pools: volumes,
//! zones and each pool's embedded `WorkerConfig`.

use std::collections::HashSet;

use field_validation::{ErrorList, FieldError, Path, rules};
use tracing::debug;

use super::worker::validate_worker_config;
use crate::gardener::{VOLUME_TYPE_SCRATCH, Worker};

/// Validate the worker pools of a shoot.
#[must_use]
pub fn validate_workers(workers: &[Worker], fld_path: &Path) -> ErrorList {
    let mut all_errs = ErrorList::new();

    for (i, worker) in workers.iter().enumerate() {
        let idx_path = fld_path.index(i);
        let volume_path = idx_path.child("volume");

        match &worker.volume {
            None => all_errs.push(FieldError::required(&volume_path, "must not be nil")),
            Some(volume) => {
                match volume.volume_type.as_deref() {
                    None | Some("") => {
                        all_errs.push(FieldError::required(&volume_path.child("type"), "must not be empty"));
                    }
                    Some(VOLUME_TYPE_SCRATCH) => all_errs.push(FieldError::invalid(
                        &volume_path.child("type"),
                        VOLUME_TYPE_SCRATCH,
                        format!("type {VOLUME_TYPE_SCRATCH} is not allowed for the root volume"),
                    )),
                    Some(_) => {}
                }
                all_errs.extend(rules::required(
                    &volume.volume_size,
                    &volume_path.child("size"),
                    "must not be empty",
                ));
            }
        }

        let data_volumes_path = idx_path.child("dataVolumes");
        for (j, data_volume) in worker.data_volumes.iter().enumerate() {
            let data_volume_path = data_volumes_path.index(j);
            all_errs.extend(rules::required(
                &data_volume.name,
                &data_volume_path.child("name"),
                "must not be empty",
            ));
            all_errs.extend(rules::required(
                data_volume.volume_type.as_deref().unwrap_or_default(),
                &data_volume_path.child("type"),
                "must not be empty",
            ));
            // Local SSDs have a fixed size
            if !data_volume.is_scratch() {
                all_errs.extend(rules::required(
                    &data_volume.volume_size,
                    &data_volume_path.child("size"),
                    "must not be empty",
                ));
            }
        }

        let zones_path = idx_path.child("zones");
        if worker.zones.is_empty() {
            all_errs.push(FieldError::required(&zones_path, "at least one zone must be configured"));
        }
        let mut zones = HashSet::new();
        for (j, zone) in worker.zones.iter().enumerate() {
            if !zones.insert(zone.as_str()) {
                all_errs.push(FieldError::duplicate(&zones_path.index(j), zone.as_str()));
            }
        }

        all_errs.extend(validate_worker_config(
            worker.provider_config.as_ref(),
            worker.volume.as_ref(),
            &worker.data_volumes,
            &idx_path.child("providerConfig"),
        ));
    }

    debug!(workers = workers.len(), errors = all_errs.len(), "Validated worker pools");
    all_errs
}

/// Validate a transition between two sets of worker pools.
///
/// For pools present in both sets, zones may only be appended; existing
/// zones keep their order.
#[must_use]
pub fn validate_workers_update(old_workers: &[Worker], new_workers: &[Worker], fld_path: &Path) -> ErrorList {
    let mut all_errs = ErrorList::new();

    for (i, new_worker) in new_workers.iter().enumerate() {
        let Some(old_worker) = old_workers.iter().find(|old| old.name == new_worker.name) else {
            continue;
        };
        if !new_worker.zones.starts_with(&old_worker.zones) {
            all_errs.extend(rules::immutable(
                &new_worker.zones,
                &old_worker.zones,
                &fld_path.index(i).child("zones"),
            ));
        }
    }

    all_errs
}
