//! Providers backed by a `manifests.toml` file.
//!
//! # Example TOML
//!
//! ```toml
//! [manifests.schema]
//! command = "bin/create-schema"
//!
//! [manifests.seed]
//! command = "bin/seed --fixtures"
//! args = ["--verbose"]
//! dependencies = [{ provider = "db", name = "schema" }]
//! resource = { file = "env.sh", base_path = "lib" }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::command::CommandTask;
use crate::error::{Error, Result};
use crate::key::ManifestKey;
use crate::manifest::{Declaration, Resource};
use crate::provider::Provider;
use crate::task::Task;

/// The file a [`FileProvider`] reads its declarations from.
pub const MANIFESTS_FILENAME: &str = "manifests.toml";

/// Parsed contents of a `manifests.toml` file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestsFile {
    #[serde(default)]
    pub manifests: BTreeMap<String, ManifestEntry>,
}

/// One declared manifest.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    /// Program and fixed arguments to run.
    #[serde(default)]
    pub command: Option<String>,
    /// Extra arguments appended to the command. Must be an array; checked
    /// when the manifest runs.
    #[serde(default)]
    pub args: Option<toml::Value>,
    #[serde(default)]
    pub dependencies: Vec<ManifestKey>,
    #[serde(default)]
    pub resource: Option<Resource>,
}

impl ManifestsFile {
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Provider reading `<dir>/manifests.toml`. Its directory doubles as the
/// working directory of its commands and its default resource directory.
#[derive(Debug, Clone)]
pub struct FileProvider {
    id: String,
    dir: PathBuf,
}

impl FileProvider {
    pub fn new(id: impl Into<String>, dir: impl AsRef<Path>) -> Self {
        Self {
            id: id.into(),
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn declaration(&self, entry: ManifestEntry) -> Declaration {
        Declaration {
            dependencies: entry.dependencies,
            task: entry.command.map(|command| -> Arc<dyn Task> {
                Arc::new(CommandTask::parse(&command, &self.dir))
            }),
            resource: entry.resource,
            arguments: entry.args,
        }
    }
}

impl Provider for FileProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn discover(&self) -> Result<BTreeMap<String, Declaration>> {
        if !self.dir.is_dir() {
            return Err(Error::Provider {
                provider: self.id.clone(),
                message: format!("directory {} does not exist", self.dir.display()),
            });
        }

        let path = self.dir.join(MANIFESTS_FILENAME);
        if !path.is_file() {
            debug!(provider = %self.id, "No {} found; provider declares nothing", MANIFESTS_FILENAME);
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&path)?;
        let file = ManifestsFile::from_toml(&content)
            .map_err(|source| Error::ManifestParse { path, source })?;

        Ok(file
            .manifests
            .into_iter()
            .map(|(name, entry)| (name, self.declaration(entry)))
            .collect())
    }

    fn resource_dir(&self) -> Option<PathBuf> {
        Some(self.dir.clone())
    }
}
