//! Command implementations for provision-cli

pub mod list;
pub mod run;

pub use list::run_list;
pub use run::run_manifests;

use std::path::Path;

use provision_core::{ProvisionConfig, Provisioner};

use crate::error::Result;

/// Load the configuration and build a provisioner over its providers.
pub fn load_provisioner(config_path: &Path) -> Result<Provisioner> {
    let config = ProvisionConfig::load(config_path)?;
    tracing::debug!(
        config = %config_path.display(),
        providers = config.providers.len(),
        "Loaded configuration"
    );
    Ok(Provisioner::new(config.registry()))
}
