//! Provider trait and registry

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::Result;
use crate::manifest::{Declaration, ManifestMap};

/// A contributor of manifest declarations.
pub trait Provider: Send + Sync {
    /// Provider id; forms the first half of every key it declares.
    fn id(&self) -> &str;

    /// Enumerate the manifests this provider declares, keyed by name.
    fn discover(&self) -> Result<BTreeMap<String, Declaration>>;

    /// Directory searched for resources that declare no base path.
    fn resource_dir(&self) -> Option<PathBuf> {
        None
    }

    /// Inspect or override the resolved manifests before they are frozen.
    fn alter(&self, _manifests: &mut ManifestMap) {}
}

/// Registered providers, in registration order.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Box<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: impl Provider + 'static) {
        self.providers.push(Box::new(provider));
    }

    pub fn with(mut self, provider: impl Provider + 'static) -> Self {
        self.register(provider);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Provider> {
        self.providers.iter().map(|p| p.as_ref())
    }

    /// Find a provider by id. When several share an id, the last
    /// registered wins, matching the collector's collision rule.
    pub fn get(&self, id: &str) -> Option<&dyn Provider> {
        self.providers
            .iter()
            .rev()
            .find(|p| p.id() == id)
            .map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.id()))
            .finish()
    }
}

type AlterFn = Box<dyn Fn(&mut ManifestMap) + Send + Sync>;

/// A provider whose declarations are supplied in code.
pub struct StaticProvider {
    id: String,
    manifests: BTreeMap<String, Declaration>,
    resource_dir: Option<PathBuf>,
    alter: Option<AlterFn>,
}

impl StaticProvider {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            manifests: BTreeMap::new(),
            resource_dir: None,
            alter: None,
        }
    }

    pub fn manifest(mut self, name: impl Into<String>, declaration: Declaration) -> Self {
        self.manifests.insert(name.into(), declaration);
        self
    }

    pub fn resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dir = Some(dir.into());
        self
    }

    pub fn on_alter(mut self, hook: impl Fn(&mut ManifestMap) + Send + Sync + 'static) -> Self {
        self.alter = Some(Box::new(hook));
        self
    }
}

impl Provider for StaticProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn discover(&self) -> Result<BTreeMap<String, Declaration>> {
        Ok(self.manifests.clone())
    }

    fn resource_dir(&self) -> Option<PathBuf> {
        self.resource_dir.clone()
    }

    fn alter(&self, manifests: &mut ManifestMap) {
        if let Some(hook) = &self.alter {
            hook(manifests);
        }
    }
}
