//! `InfrastructureConfig` validation
//!
//! Create-time rules cover worker/internal CIDRs, the VPC reference, VPC flow
//! logs and Cloud NAT. Update-time rules keep the VPC and internal subnet
//! fixed once a VPC is set and only allow the worker CIDR to grow.

use field_validation::{Cidr, ErrorList, FieldError, Path, rules};
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{CloudNat, FlowLogs, InfrastructureConfig, NetworkConfig, Vpc};

/// Supported VPC flow log aggregation intervals.
pub const VALID_AGGREGATION_INTERVALS: [&str; 6] = [
    "INTERVAL_5_SEC",
    "INTERVAL_30_SEC",
    "INTERVAL_1_MIN",
    "INTERVAL_5_MIN",
    "INTERVAL_10_MIN",
    "INTERVAL_15_MIN",
];

/// Supported VPC flow log metadata settings.
pub const VALID_FLOW_LOG_METADATA: [&str; 1] = ["INCLUDE_ALL_METADATA"];

/// Shoot networking CIDRs the infrastructure has to fit in.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShootNetworking<'a> {
    /// Node CIDR
    pub nodes: Option<&'a str>,
    /// Pod CIDR
    pub pods: Option<&'a str>,
    /// Service CIDR
    pub services: Option<&'a str>,
}

/// Validate an `InfrastructureConfig` against the shoot networking.
#[must_use]
pub fn validate_infrastructure_config(
    config: &InfrastructureConfig,
    networking: ShootNetworking<'_>,
    fld_path: &Path,
) -> ErrorList {
    let all_errs = validate_network_config(&config.networks, networking, &fld_path.child("networks"));
    debug!(errors = all_errs.len(), "Validated InfrastructureConfig");
    all_errs
}

/// Validate the `networks` section of an `InfrastructureConfig`.
#[must_use]
pub fn validate_network_config(
    config: &NetworkConfig,
    networking: ShootNetworking<'_>,
    fld_path: &Path,
) -> ErrorList {
    let mut all_errs = ErrorList::new();

    if config.worker.is_empty() && config.workers.is_empty() {
        all_errs.push(FieldError::required(
            &fld_path.child("workers"),
            "must specify the network range for the worker network",
        ));
    }
    if !config.worker.is_empty() && !config.workers.is_empty() {
        warn!(
            worker = %config.worker,
            workers = %config.workers,
            "Both worker and workers are set, using workers"
        );
    }

    let mut worker_cidrs = Vec::new();
    for (field, value) in [("worker", &config.worker), ("workers", &config.workers)] {
        if value.is_empty() {
            continue;
        }
        let cidr = Cidr::new(value.as_str(), fld_path.child(field));
        all_errs.extend(cidr.validate_parse());
        all_errs.extend(cidr.validate_canonical());
        worker_cidrs.push(cidr);
    }
    // `workers` comes last and wins
    let worker_cidr = worker_cidrs.last();

    let networking_path = Path::new("networking");
    let nodes = networking.nodes.map(|cidr| Cidr::new(cidr, networking_path.child("nodes")));
    let pods = networking.pods.map(|cidr| Cidr::new(cidr, networking_path.child("pods")));
    let services = networking.services.map(|cidr| Cidr::new(cidr, networking_path.child("services")));

    if let Some(internal) = &config.internal {
        let internal_cidr = Cidr::new(internal.as_str(), fld_path.child("internal"));
        all_errs.extend(internal_cidr.validate_parse());
        all_errs.extend(internal_cidr.validate_canonical());

        for other in worker_cidrs.iter().chain([&nodes, &pods, &services].into_iter().flatten()) {
            all_errs.extend(other.validate_not_overlap(&[&internal_cidr]));
        }
    }

    if let (Some(nodes), Some(worker_cidr)) = (&nodes, worker_cidr) {
        all_errs.extend(nodes.validate_subset(&[worker_cidr]));
    }

    if let Some(flow_logs) = &config.flow_logs {
        all_errs.extend(validate_flow_logs(flow_logs, &fld_path.child("flowLogs")));
    }

    if let Some(cloud_nat) = &config.cloud_nat {
        all_errs.extend(validate_cloud_nat(cloud_nat, &fld_path.child("cloudNAT")));
    }

    if let Some(vpc) = &config.vpc {
        all_errs.extend(validate_vpc(vpc, &fld_path.child("vpc")));
    }

    all_errs
}

fn validate_vpc(vpc: &Vpc, fld_path: &Path) -> ErrorList {
    let mut all_errs = ErrorList::new();
    let router_path = fld_path.child("cloudRouter");

    if vpc.name.is_empty() {
        all_errs.push(FieldError::required(
            &fld_path.child("name"),
            "vpc name must not be empty when vpc key is provided",
        ));
    }

    match (&vpc.cloud_router, vpc.name.is_empty()) {
        (Some(router), true) => all_errs.push(FieldError::invalid(
            &router_path,
            router.name.as_str(),
            "cloud router can not be configured when the VPC is created by Gardener",
        )),
        (None, false) => all_errs.push(FieldError::invalid(
            &router_path,
            Value::Null,
            "cloud router must be defined when re-using an existing VPC",
        )),
        (Some(router), false) if router.name.is_empty() => all_errs.push(FieldError::required(
            &router_path.child("name"),
            "cloud router name must not be empty when re-using an existing VPC",
        )),
        _ => {}
    }

    all_errs
}

fn validate_flow_logs(flow_logs: &FlowLogs, fld_path: &Path) -> ErrorList {
    let mut all_errs = ErrorList::new();

    if flow_logs.aggregation_interval.is_none() && flow_logs.flow_sampling.is_none() && flow_logs.metadata.is_none() {
        all_errs.push(FieldError::required(
            fld_path,
            "at least one VPC flow log parameter must be specified when VPC flow log section is provided",
        ));
    }

    if let Some(interval) = &flow_logs.aggregation_interval {
        all_errs.extend(rules::supported(
            interval,
            &VALID_AGGREGATION_INTERVALS,
            &fld_path.child("aggregationInterval"),
        ));
    }

    if let Some(sampling) = flow_logs.flow_sampling {
        all_errs.extend(rules::in_range(
            f64::from(sampling),
            0.0,
            1.0,
            &fld_path.child("flowSampling"),
            "must contain a valid value",
        ));
    }

    if let Some(metadata) = &flow_logs.metadata {
        all_errs.extend(rules::supported(metadata, &VALID_FLOW_LOG_METADATA, &fld_path.child("metadata")));
    }

    all_errs
}

fn validate_cloud_nat(cloud_nat: &CloudNat, fld_path: &Path) -> ErrorList {
    let mut all_errs = ErrorList::new();
    let min_path = fld_path.child("minPortsPerVM");
    let max_path = fld_path.child("maxPortsPerVM");

    if let Some(names) = &cloud_nat.nat_ip_names {
        let names_path = fld_path.child("natIPNames");
        if names.is_empty() {
            all_errs.push(FieldError::invalid(
                &names_path,
                Value::Array(Vec::new()),
                "nat IP names must not be empty when provided",
            ));
        }
        for (i, nat_ip) in names.iter().enumerate() {
            all_errs.extend(rules::required(
                &nat_ip.name,
                &names_path.index(i).child("name"),
                "must provide a name of an external IP",
            ));
        }
    }

    if cloud_nat.enable_dynamic_port_allocation {
        if let Some(min) = cloud_nat.min_ports_per_vm {
            all_errs.extend(rules::power_of_two(i64::from(min), &min_path));
        }
        if let Some(max) = cloud_nat.max_ports_per_vm {
            all_errs.extend(rules::power_of_two(i64::from(max), &max_path));
        }
        if let (Some(min), Some(max)) = (cloud_nat.min_ports_per_vm, cloud_nat.max_ports_per_vm) {
            if max < min {
                all_errs.push(FieldError::invalid(
                    &max_path,
                    max,
                    "must be greater than or equal to minPortsPerVM",
                ));
            }
        }
        if cloud_nat.endpoint_independent_mapping.as_ref().is_some_and(|mapping| mapping.enabled) {
            all_errs.push(FieldError::forbidden(
                &fld_path.child("endpointIndependentMapping").child("enabled"),
                "endpoint independent mapping cannot be enabled together with dynamic port allocation",
            ));
        }
    } else {
        if cloud_nat.min_ports_per_vm.is_some() {
            all_errs.push(FieldError::forbidden(
                &min_path,
                "can only be set when dynamic port allocation is enabled",
            ));
        }
        if cloud_nat.max_ports_per_vm.is_some() {
            all_errs.push(FieldError::forbidden(
                &max_path,
                "can only be set when dynamic port allocation is enabled",
            ));
        }
    }

    for (field, timeout) in cloud_nat.idle_timeouts() {
        if let Some(timeout) = timeout {
            all_errs.extend(rules::positive(timeout, &fld_path.child(field)));
        }
    }

    all_errs
}

/// Validate a transition between two `InfrastructureConfig`s.
#[must_use]
pub fn validate_infrastructure_config_update(
    old: &InfrastructureConfig,
    new: &InfrastructureConfig,
    fld_path: &Path,
) -> ErrorList {
    let mut all_errs = ErrorList::new();
    let networks_path = fld_path.child("networks");

    // A Gardener-managed network can still be moved to an existing VPC
    if old.networks.vpc.is_some() {
        all_errs.extend(rules::immutable(&new.networks.vpc, &old.networks.vpc, &networks_path.child("vpc")));
        all_errs.extend(rules::immutable(
            &new.networks.internal,
            &old.networks.internal,
            &networks_path.child("internal"),
        ));
    }
    all_errs.extend(validate_worker_cidr_update(&old.networks, &new.networks, &networks_path));

    debug!(errors = all_errs.len(), "Validated InfrastructureConfig update");
    all_errs
}

// The worker CIDR may grow, but every old address has to stay inside it.
fn validate_worker_cidr_update(old: &NetworkConfig, new: &NetworkConfig, fld_path: &Path) -> ErrorList {
    let (Some(old_value), Some(new_value)) = (old.effective_worker_cidr(), new.effective_worker_cidr()) else {
        return Vec::new();
    };
    if old_value == new_value {
        return Vec::new();
    }

    let field_path = if new.workers.is_empty() {
        fld_path.child("worker")
    } else {
        fld_path.child("workers")
    };
    let old_cidr = Cidr::new(old_value, field_path.clone());
    let new_cidr = Cidr::new(new_value, field_path.clone());

    // Unparseable values are reported by the create-time validation
    if old_cidr.network().is_none() || new_cidr.network().is_none() {
        return Vec::new();
    }

    if new_cidr.contains(&old_cidr) {
        Vec::new()
    } else {
        vec![FieldError::invalid(
            &field_path,
            new_value,
            format!("worker CIDR can only be expanded, {new_value:?} does not contain {old_value:?}"),
        )]
    }
}
