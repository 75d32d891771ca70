//! Dependency graph over collected manifests.
//!
//! Edges point from a dependency to its dependent: if `app-site` depends on
//! `db-schema`, the edge is `db-schema -> app-site`. Every dependency that
//! no provider declared becomes a stub vertex so that the blockage it
//! causes stays visible in the graph.
//!
//! # Example
//!
//! ```
//! use provision_core::{Declaration, ManifestGraph, ManifestKey, ManifestMap, ManifestInfo};
//!
//! let mut collected = ManifestMap::new();
//! let site = ManifestKey::new("app", "site");
//! collected.insert(
//!     site.clone(),
//!     ManifestInfo::from_declaration(site.clone(), Declaration::new().depends_on("db", "schema")),
//! );
//!
//! let graph = ManifestGraph::build(collected);
//! assert_eq!(graph.node_count(), 2);
//! assert!(graph.get(&ManifestKey::new("db", "schema")).unwrap().is_stub);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::key::ManifestKey;
use crate::manifest::{ManifestInfo, ManifestMap};

/// Directed graph of manifests, edges running dependency -> dependent.
#[derive(Debug, Clone, Default)]
pub struct ManifestGraph {
    vertices: ManifestMap,
    /// Adjacency list: each key is a dependency of every value.
    edges: BTreeMap<ManifestKey, BTreeSet<ManifestKey>>,
}

impl ManifestGraph {
    /// Build the graph from collected manifests, synthesizing a stub for
    /// every dependency that was never collected.
    pub fn build(collected: ManifestMap) -> Self {
        let mut graph = Self {
            vertices: collected,
            edges: BTreeMap::new(),
        };

        let declared: Vec<(ManifestKey, Vec<ManifestKey>)> = graph
            .vertices
            .values()
            .map(|info| (info.key.clone(), info.dependencies.clone()))
            .collect();

        for (dependent, dependencies) in declared {
            graph.edges.entry(dependent.clone()).or_default();
            for dependency in dependencies {
                if !graph.vertices.contains_key(&dependency) {
                    debug!(manifest = %dependency, required_by = %dependent, "Synthesizing stub for missing manifest");
                    graph
                        .vertices
                        .insert(dependency.clone(), ManifestInfo::stub(dependency.clone()));
                }
                graph
                    .edges
                    .entry(dependency)
                    .or_default()
                    .insert(dependent.clone());
            }
        }

        graph
    }

    /// Return the number of vertices, stubs included.
    pub fn node_count(&self) -> usize {
        self.vertices.len()
    }

    /// Return the number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn get(&self, key: &ManifestKey) -> Option<&ManifestInfo> {
        self.vertices.get(key)
    }

    pub fn vertices(&self) -> &ManifestMap {
        &self.vertices
    }

    pub(crate) fn vertices_mut(&mut self) -> &mut ManifestMap {
        &mut self.vertices
    }

    /// Manifests that directly depend on `key`.
    pub fn dependents_of(&self, key: &ManifestKey) -> impl Iterator<Item = &ManifestKey> {
        self.edges.get(key).into_iter().flatten()
    }

    /// Every vertex reachable from `key` by following edges forward: the
    /// manifests that depend on it, directly or transitively.
    pub fn descendants(&self, key: &ManifestKey) -> BTreeSet<ManifestKey> {
        let mut found = BTreeSet::new();
        let mut pending: Vec<&ManifestKey> = self.dependents_of(key).collect();
        while let Some(next) = pending.pop() {
            if found.insert(next.clone()) {
                pending.extend(self.dependents_of(next));
            }
        }
        found
    }

    /// Every edge as a `(dependency, dependent)` pair.
    pub fn edges(&self) -> impl Iterator<Item = (&ManifestKey, &ManifestKey)> {
        self.edges
            .iter()
            .flat_map(|(from, to)| to.iter().map(move |dependent| (from, dependent)))
    }

    /// Keys sorted ascending by weight: the execution order.
    pub fn order(&self) -> Vec<ManifestKey> {
        let mut keys: Vec<&ManifestInfo> = self.vertices.values().collect();
        keys.sort_by_key(|info| info.weight);
        keys.into_iter().map(|info| info.key.clone()).collect()
    }

    pub fn into_vertices(self) -> ManifestMap {
        self.vertices
    }
}
