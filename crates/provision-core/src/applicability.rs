//! Marks which manifests may run.

use std::collections::BTreeSet;

use tracing::debug;

use crate::graph::ManifestGraph;
use crate::key::ManifestKey;

/// Flag every vertex applicable or blocked.
///
/// Stubs are never applicable, and neither is anything reachable from a
/// stub. Each blocked vertex records the stubs responsible in
/// `blocked_by`, in key order.
pub fn mark(graph: &mut ManifestGraph) {
    let stubs: Vec<(ManifestKey, BTreeSet<ManifestKey>)> = graph
        .vertices()
        .values()
        .filter(|info| info.is_stub)
        .map(|info| (info.key.clone(), graph.descendants(&info.key)))
        .collect();

    let vertices = graph.vertices_mut();
    for info in vertices.values_mut() {
        info.applicable = true;
        info.blocked_by.clear();
    }

    for (stub, descendants) in stubs {
        if let Some(info) = vertices.get_mut(&stub) {
            info.applicable = false;
        }
        for key in descendants {
            if let Some(info) = vertices.get_mut(&key) {
                debug!(manifest = %key, missing = %stub, "Manifest blocked by missing dependency");
                info.applicable = false;
                info.blocked_by.push(stub.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Declaration, ManifestInfo, ManifestMap};
    use crate::resolver::resolve;

    fn marked(entries: &[(&str, &str, &[(&str, &str)])]) -> ManifestGraph {
        let collected: ManifestMap = entries
            .iter()
            .map(|(provider, name, deps)| {
                let key = ManifestKey::new(*provider, *name);
                let decl = deps
                    .iter()
                    .fold(Declaration::new(), |d, (p, n)| d.depends_on(*p, *n));
                (key.clone(), ManifestInfo::from_declaration(key, decl))
            })
            .collect();
        let mut graph = ManifestGraph::build(collected);
        resolve(&mut graph).unwrap();
        mark(&mut graph);
        graph
    }

    #[test]
    fn test_unrelated_manifest_is_applicable() {
        let graph = marked(&[("app", "solo", &[])]);
        let solo = graph.get(&ManifestKey::new("app", "solo")).unwrap();
        assert!(solo.applicable);
        assert!(solo.blocked_by.is_empty());
    }

    #[test]
    fn test_stub_blocks_direct_dependent() {
        let graph = marked(&[("app", "c", &[("providerY", "Z")])]);

        let stub = graph.get(&ManifestKey::new("providerY", "Z")).unwrap();
        assert!(stub.is_stub);
        assert!(!stub.applicable);

        let c = graph.get(&ManifestKey::new("app", "c")).unwrap();
        assert!(!c.applicable);
        assert_eq!(c.blocked_by, vec![ManifestKey::new("providerY", "Z")]);
    }

    #[test]
    fn test_blockage_cascades_transitively() {
        let graph = marked(&[
            ("app", "a", &[("gone", "x")]),
            ("app", "b", &[("app", "a")]),
            ("app", "c", &[("app", "b")]),
            ("app", "free", &[]),
        ]);

        for name in ["a", "b", "c"] {
            let info = graph.get(&ManifestKey::new("app", name)).unwrap();
            assert!(!info.applicable, "{name} should be blocked");
            assert_eq!(info.blocked_by, vec![ManifestKey::new("gone", "x")]);
        }
        assert!(graph.get(&ManifestKey::new("app", "free")).unwrap().applicable);
    }

    #[test]
    fn test_multiple_stubs_are_all_recorded() {
        let graph = marked(&[("app", "site", &[("db", "schema"), ("cache", "warm")])]);
        let site = graph.get(&ManifestKey::new("app", "site")).unwrap();
        assert_eq!(
            site.blocked_by,
            vec![ManifestKey::new("cache", "warm"), ManifestKey::new("db", "schema")]
        );
    }

    #[test]
    fn test_dependency_of_blocked_manifest_stays_applicable() {
        let graph = marked(&[
            ("db", "schema", &[]),
            ("app", "site", &[("db", "schema"), ("gone", "x")]),
        ]);
        assert!(graph.get(&ManifestKey::new("db", "schema")).unwrap().applicable);
        assert!(!graph.get(&ManifestKey::new("app", "site")).unwrap().applicable);
    }
}
