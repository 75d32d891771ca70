//! Manifest declarations and resolved manifest records.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::key::ManifestKey;
use crate::task::Task;

/// Resolved manifests keyed by identity.
pub type ManifestMap = BTreeMap<ManifestKey, ManifestInfo>;

/// An external file to load before a manifest's task runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// File name, relative to the base path.
    pub file: PathBuf,
    /// Directory holding the file. Falls back to the provider's default
    /// resource directory when absent.
    #[serde(default)]
    pub base_path: Option<PathBuf>,
}

impl Resource {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            base_path: None,
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }
}

/// A manifest as a provider declares it.
#[derive(Clone, Default)]
pub struct Declaration {
    pub dependencies: Vec<ManifestKey>,
    pub task: Option<Arc<dyn Task>>,
    pub resource: Option<Resource>,
    pub arguments: Option<toml::Value>,
}

impl Declaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task(mut self, task: Arc<dyn Task>) -> Self {
        self.task = Some(task);
        self
    }

    pub fn depends_on(mut self, provider: impl Into<String>, name: impl Into<String>) -> Self {
        self.dependencies.push(ManifestKey::new(provider, name));
        self
    }

    pub fn resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn arguments(mut self, arguments: impl Into<toml::Value>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("dependencies", &self.dependencies)
            .field("task", &self.task.is_some())
            .field("resource", &self.resource)
            .field("arguments", &self.arguments)
            .finish()
    }
}

/// A vertex of the manifest graph.
///
/// Created by the collector (or synthesized as a stub by the graph
/// builder); `weight` and `component` are filled in by the resolver and
/// `applicable`/`blocked_by` by the applicability pass.
#[derive(Clone)]
pub struct ManifestInfo {
    pub key: ManifestKey,
    pub task: Option<Arc<dyn Task>>,
    pub resource: Option<Resource>,
    pub dependencies: Vec<ManifestKey>,
    pub arguments: Option<toml::Value>,
    pub is_stub: bool,
    pub weight: usize,
    pub component: Option<ManifestKey>,
    pub applicable: bool,
    pub blocked_by: Vec<ManifestKey>,
}

impl ManifestInfo {
    pub fn from_declaration(key: ManifestKey, declaration: Declaration) -> Self {
        Self {
            key,
            task: declaration.task,
            resource: declaration.resource,
            dependencies: declaration.dependencies,
            arguments: declaration.arguments,
            is_stub: false,
            weight: 0,
            component: None,
            applicable: false,
            blocked_by: Vec::new(),
        }
    }

    /// Placeholder for a dependency no provider declared.
    pub fn stub(key: ManifestKey) -> Self {
        let mut info = Self::from_declaration(key, Declaration::default());
        info.is_stub = true;
        info
    }

    /// Serializable view of the resolved state.
    pub fn summary(&self) -> ManifestSummary {
        ManifestSummary {
            id: self.key.id(),
            provider: self.key.provider.clone(),
            name: self.key.name.clone(),
            weight: self.weight,
            component: self.component.as_ref().map(ManifestKey::id),
            dependencies: self.dependencies.iter().map(ManifestKey::id).collect(),
            is_stub: self.is_stub,
            applicable: self.applicable,
            blocked_by: self.blocked_by.iter().map(ManifestKey::id).collect(),
        }
    }
}

impl fmt::Debug for ManifestInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManifestInfo")
            .field("key", &self.key)
            .field("task", &self.task.is_some())
            .field("resource", &self.resource)
            .field("dependencies", &self.dependencies)
            .field("arguments", &self.arguments)
            .field("is_stub", &self.is_stub)
            .field("weight", &self.weight)
            .field("component", &self.component)
            .field("applicable", &self.applicable)
            .field("blocked_by", &self.blocked_by)
            .finish()
    }
}

/// Flattened, serializable state of one resolved manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestSummary {
    pub id: String,
    pub provider: String,
    pub name: String,
    pub weight: usize,
    pub component: Option<String>,
    pub dependencies: Vec<String>,
    pub is_stub: bool,
    pub applicable: bool,
    pub blocked_by: Vec<String>,
}
