//! Schema generator
//!
//! Writes a JSON schema (as YAML) for every provider config kind:
//! - `InfrastructureConfig`, `ControlPlaneConfig`, `WorkerConfig`
//! - `CloudProfileConfig`, `BackupBucketConfig`, `WorkloadIdentityConfig`
//!
//! Usage: `schemagen [OUT_DIR]`. Without an argument the directory is taken
//! from `SCHEMA_OUT_DIR`, falling back to `./schemas`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gcp_apis::types::{
    BackupBucketConfig, CloudProfileConfig, ControlPlaneConfig, InfrastructureConfig, ProviderConfigKind,
    WorkerConfig, WorkloadIdentityConfig,
};
use schemars::JsonSchema;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn write_schema<T: JsonSchema + ProviderConfigKind>(out_dir: &Path) -> Result<()> {
    let schema = schemars::schema_for!(T);
    let yaml = serde_yaml::to_string(&schema).with_context(|| format!("failed to serialize schema of {}", T::KIND))?;
    let file = out_dir.join(format!("{}.yaml", T::KIND.to_lowercase()));
    fs::write(&file, yaml).with_context(|| format!("failed to write {}", file.display()))?;
    info!("Wrote {} ({}) to {}", T::KIND, T::api_version(), file.display());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let out_dir = env::args()
        .nth(1)
        .or_else(|| env::var("SCHEMA_OUT_DIR").ok())
        .map_or_else(|| PathBuf::from("schemas"), PathBuf::from);
    fs::create_dir_all(&out_dir).with_context(|| format!("failed to create {}", out_dir.display()))?;

    write_schema::<InfrastructureConfig>(&out_dir)?;
    write_schema::<ControlPlaneConfig>(&out_dir)?;
    write_schema::<WorkerConfig>(&out_dir)?;
    write_schema::<CloudProfileConfig>(&out_dir)?;
    write_schema::<BackupBucketConfig>(&out_dir)?;
    write_schema::<WorkloadIdentityConfig>(&out_dir)?;

    Ok(())
}
