//! Configuration types and loading for `provision.toml`.
//!
//! ```toml
//! [[providers]]
//! id = "db"
//! path = "providers/db"
//!
//! [[providers]]
//! id = "app"
//! path = "providers/app"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::file_provider::FileProvider;
use crate::provider::ProviderRegistry;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "provision.toml";

/// One provider entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Provider id used in manifest keys.
    pub id: String,
    /// Directory holding the provider's `manifests.toml`. Relative paths
    /// are taken relative to the configuration file.
    pub path: PathBuf,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProvisionConfig {
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl ProvisionConfig {
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load the configuration at `path` and anchor relative provider paths
    /// to the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for provider in &mut config.providers {
            if provider.path.is_relative() {
                provider.path = base.join(&provider.path);
            }
        }
        Ok(config)
    }

    /// Register a [`FileProvider`] for every configured provider, in
    /// declaration order.
    pub fn registry(&self) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        for provider in &self.providers {
            registry.register(FileProvider::new(&provider.id, &provider.path));
        }
        registry
    }
}
