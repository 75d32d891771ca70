//! The resolved, frozen set of manifests and the orchestrator owning it.

use tracing::debug;

use crate::Result;
use crate::applicability::mark;
use crate::collector::collect;
use crate::graph::ManifestGraph;
use crate::key::ManifestKey;
use crate::manifest::{ManifestInfo, ManifestMap, ManifestSummary};
use crate::provider::ProviderRegistry;
use crate::resolver::resolve;
use crate::resource::{FileResourceLoader, ResourceCache, ResourceLoader};
use crate::runner::{RunListener, RunReport, Runner};

/// Every manifest with its weight, component and applicability settled.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    manifests: ManifestMap,
    order: Vec<ManifestKey>,
}

impl Resolution {
    /// Collect, build, resolve and mark, then give every provider one
    /// chance to alter the result.
    pub fn compute(registry: &ProviderRegistry) -> Result<Self> {
        let collected = collect(registry)?;
        let mut graph = ManifestGraph::build(collected);
        resolve(&mut graph)?;
        mark(&mut graph);

        let mut manifests = graph.into_vertices();
        for provider in registry.iter() {
            provider.alter(&mut manifests);
        }

        Ok(Self::from_manifests(manifests))
    }

    /// Freeze an already resolved mapping, ordering it by weight.
    pub fn from_manifests(manifests: ManifestMap) -> Self {
        let mut ordered: Vec<&ManifestInfo> = manifests.values().collect();
        ordered.sort_by(|a, b| a.weight.cmp(&b.weight).then_with(|| a.key.cmp(&b.key)));
        let order = ordered.into_iter().map(|info| info.key.clone()).collect();
        Self { manifests, order }
    }

    pub fn get(&self, key: &ManifestKey) -> Option<&ManifestInfo> {
        self.manifests.get(key)
    }

    pub fn manifests(&self) -> &ManifestMap {
        &self.manifests
    }

    /// Keys in execution order.
    pub fn order(&self) -> &[ManifestKey] {
        &self.order
    }

    /// Manifests in execution order.
    pub fn ordered(&self) -> impl Iterator<Item = &ManifestInfo> {
        self.order.iter().filter_map(|key| self.manifests.get(key))
    }

    pub fn summaries(&self) -> Vec<ManifestSummary> {
        self.ordered().map(ManifestInfo::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }
}

/// Owns the providers, the resolution computed from them and the cache of
/// loaded resources.
///
/// The resolution is computed on first use and reused for the lifetime of
/// the provisioner; there is no way to invalidate it. Resources stay loaded
/// across runs, so a path is loaded at most once per provisioner.
#[derive(Debug)]
pub struct Provisioner<L = FileResourceLoader> {
    registry: ProviderRegistry,
    resolution: Option<Resolution>,
    resources: ResourceCache<L>,
}

impl Provisioner {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self::with_loader(registry, FileResourceLoader)
    }
}

impl<L: ResourceLoader> Provisioner<L> {
    pub fn with_loader(registry: ProviderRegistry, loader: L) -> Self {
        Self {
            registry,
            resolution: None,
            resources: ResourceCache::new(loader),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// The resolution, computing it if this is the first call.
    pub fn resolution(&mut self) -> Result<&Resolution> {
        let resolution = match self.resolution.take() {
            Some(resolution) => resolution,
            None => {
                debug!(providers = self.registry.len(), "Computing manifest resolution");
                Resolution::compute(&self.registry)?
            }
        };
        Ok(self.resolution.insert(resolution))
    }

    /// Run every manifest in order, stopping at the first failure.
    pub fn run(&mut self, listener: &mut dyn RunListener) -> Result<RunReport> {
        let resolution = match self.resolution.take() {
            Some(resolution) => resolution,
            None => Resolution::compute(&self.registry)?,
        };
        let resolution = &*self.resolution.insert(resolution);
        Runner::new(&self.registry, &mut self.resources).run(resolution, listener)
    }
}
