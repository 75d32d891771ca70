//! Depth-first ordering of the manifest graph.
//!
//! Each unvisited vertex (in key order) roots a traversal along
//! dependency -> dependent edges. A vertex receives its weight only after
//! every dependent below it has been finished, taken from a counter that
//! counts down from the vertex count, so a dependency always weighs less
//! than its dependents.
//!
//! The traversal root's key becomes the component id of everything it
//! discovers. Meeting a vertex already finished under another component
//! merges the two, which makes components follow weak connectivity.
//!
//! Re-entering a vertex that is still on the traversal stack is a cycle and
//! fails the resolution.
//!
//! The traversal keeps its own stack of frames rather than recursing, so
//! the depth of a dependency chain is bounded by memory, not by the thread
//! stack.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::ManifestGraph;
use crate::key::ManifestKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Active,
    Done,
}

struct Traversal<'g> {
    graph: &'g ManifestGraph,
    state: BTreeMap<&'g ManifestKey, Visit>,
    counter: usize,
    weight: BTreeMap<ManifestKey, usize>,
    component: BTreeMap<ManifestKey, ManifestKey>,
    members: BTreeMap<ManifestKey, Vec<ManifestKey>>,
}

impl<'g> Traversal<'g> {
    fn new(graph: &'g ManifestGraph) -> Self {
        Self {
            graph,
            state: BTreeMap::new(),
            counter: graph.node_count(),
            weight: BTreeMap::new(),
            component: BTreeMap::new(),
            members: BTreeMap::new(),
        }
    }

    /// Walk everything reachable from `root`.
    ///
    /// Each frame pairs a vertex with the iterator over its remaining
    /// dependents. A vertex is finished when its iterator runs dry.
    fn visit(&mut self, root: &'g ManifestKey) -> Result<()> {
        let graph = self.graph;
        let mut current = root.clone();
        self.enter(root, &current);
        let mut stack = vec![(root, graph.dependents_of(root))];

        while let Some((key, dependents)) = stack.last_mut() {
            let key: &'g ManifestKey = *key;
            let Some(dependent) = dependents.next() else {
                self.finish(key);
                stack.pop();
                continue;
            };

            match self.state.get(dependent).copied() {
                None => {
                    self.enter(dependent, &current);
                    stack.push((dependent, graph.dependents_of(dependent)));
                }
                Some(Visit::Active) => {
                    let start = stack
                        .iter()
                        .position(|(k, _)| *k == dependent)
                        .unwrap_or(0);
                    return Err(Error::DependencyCycle {
                        participants: stack[start..].iter().map(|(k, _)| (*k).clone()).collect(),
                    });
                }
                Some(Visit::Done) => {
                    let existing = self.component[dependent].clone();
                    if existing != current {
                        self.merge(&current, &existing);
                        current = existing;
                    }
                }
            }
        }
        Ok(())
    }

    fn enter(&mut self, key: &'g ManifestKey, component: &ManifestKey) {
        self.state.insert(key, Visit::Active);
        self.component.insert(key.clone(), component.clone());
        self.members
            .entry(component.clone())
            .or_default()
            .push(key.clone());
    }

    fn finish(&mut self, key: &'g ManifestKey) {
        self.weight.insert(key.clone(), self.counter);
        self.counter -= 1;
        self.state.insert(key, Visit::Done);
    }

    /// Fold every vertex tagged `from` into component `into`.
    fn merge(&mut self, from: &ManifestKey, into: &ManifestKey) {
        let moved = self.members.remove(from).unwrap_or_default();
        for key in &moved {
            self.component.insert(key.clone(), into.clone());
        }
        self.members.entry(into.clone()).or_default().extend(moved);
    }
}

/// Assign weight and component to every vertex.
///
/// Descendants are not stored per vertex; [`ManifestGraph::descendants`]
/// answers them from the same edges the traversal follows.
///
/// # Errors
///
/// Returns `Error::DependencyCycle` if the graph contains a cycle.
pub fn resolve(graph: &mut ManifestGraph) -> Result<()> {
    let (mut weight, mut component, components) = {
        let mut traversal = Traversal::new(graph);
        for key in graph.vertices().keys() {
            if !traversal.state.contains_key(key) {
                traversal.visit(key)?;
            }
        }
        (traversal.weight, traversal.component, traversal.members.len())
    };
    debug!(
        vertices = graph.node_count(),
        components, "Resolved manifest order"
    );

    for (key, info) in graph.vertices_mut() {
        info.weight = weight.remove(key).unwrap_or_default();
        info.component = component.remove(key);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Declaration, ManifestInfo, ManifestMap};
    use pretty_assertions::assert_eq;

    fn key(id: &str) -> ManifestKey {
        ManifestKey::new("p", id)
    }

    fn graph(entries: &[(&str, &[&str])]) -> ManifestGraph {
        let collected: ManifestMap = entries
            .iter()
            .map(|(name, deps)| {
                let decl = deps
                    .iter()
                    .fold(Declaration::new(), |d, dep| d.depends_on("p", *dep));
                (key(name), ManifestInfo::from_declaration(key(name), decl))
            })
            .collect();
        ManifestGraph::build(collected)
    }

    fn names_of(order: Vec<ManifestKey>) -> Vec<String> {
        order.into_iter().map(|k| k.name).collect()
    }

    #[test]
    fn test_empty_graph_resolves() {
        let mut g = graph(&[]);
        resolve(&mut g).unwrap();
        assert!(g.order().is_empty());
    }

    #[test]
    fn test_linear_chain() {
        let mut g = graph(&[("b", &["a"]), ("a", &[])]);
        resolve(&mut g).unwrap();
        assert_eq!(names_of(g.order()), vec!["a", "b"]);
        assert!(g.get(&key("a")).unwrap().weight < g.get(&key("b")).unwrap().weight);
    }

    #[test]
    fn test_weights_are_a_permutation() {
        let mut g = graph(&[("a", &[]), ("b", &["a"]), ("c", &["a"]), ("d", &[])]);
        resolve(&mut g).unwrap();
        let mut weights: Vec<usize> = g.vertices().values().map(|i| i.weight).collect();
        weights.sort();
        assert_eq!(weights, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_diamond_dependency() {
        let mut g = graph(&[
            ("base", &[]),
            ("left", &["base"]),
            ("right", &["base"]),
            ("top", &["left", "right"]),
        ]);
        resolve(&mut g).unwrap();

        let order = names_of(g.order());
        assert_eq!(order.first().map(String::as_str), Some("base"));
        assert_eq!(order.last().map(String::as_str), Some("top"));
    }

    #[test]
    fn test_descendants_are_transitive() {
        let mut g = graph(&[("a", &[]), ("b", &["a"]), ("c", &["b"]), ("x", &[])]);
        resolve(&mut g).unwrap();

        assert_eq!(
            g.descendants(&key("a")),
            [key("b"), key("c")].into_iter().collect::<std::collections::BTreeSet<_>>()
        );
        assert!(g.descendants(&key("c")).is_empty());
        assert!(g.descendants(&key("x")).is_empty());
    }

    #[test]
    fn test_long_chain_resolves_without_recursion() {
        let names: Vec<String> = (0..20_000).map(|i| format!("m{i:05}")).collect();
        let entries: Vec<(&str, Vec<&str>)> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let deps = if i == 0 { vec![] } else { vec![names[i - 1].as_str()] };
                (name.as_str(), deps)
            })
            .collect();
        let borrowed: Vec<(&str, &[&str])> = entries
            .iter()
            .map(|(name, deps)| (*name, deps.as_slice()))
            .collect();
        let mut g = graph(&borrowed);
        resolve(&mut g).unwrap();

        let order = names_of(g.order());
        assert_eq!(order, names);
        let root = g.get(&key("m00000")).unwrap().component.clone();
        assert!(g.vertices().values().all(|info| info.component == root));
    }

    #[test]
    fn test_components_merge_across_roots() {
        // "a" and "b" are both roots; "c" joins them. "a" is traversed
        // first, so "b"'s traversal must adopt a's component on reaching c.
        let mut g = graph(&[("a", &[]), ("b", &[]), ("c", &["a", "b"]), ("lonely", &[])]);
        resolve(&mut g).unwrap();

        let comp = |name: &str| g.get(&key(name)).unwrap().component.clone().unwrap();
        assert_eq!(comp("a"), comp("b"));
        assert_eq!(comp("a"), comp("c"));
        assert_ne!(comp("a"), comp("lonely"));
        assert_eq!(comp("lonely"), key("lonely"));
    }

    #[test]
    fn test_component_merge_retags_vertices_mid_traversal() {
        // "m" is a root whose traversal reaches "o", which is finished
        // under "a"'s component, after m itself was tagged.
        let mut g = graph(&[("a", &[]), ("n", &["a"]), ("m", &[]), ("o", &["m", "n"])]);
        resolve(&mut g).unwrap();

        let comp = |name: &str| g.get(&key(name)).unwrap().component.clone().unwrap();
        for name in ["m", "n", "o"] {
            assert_eq!(comp(name), comp("a"), "component of {name}");
        }
    }

    #[test]
    fn test_cycle_detected() {
        let mut g = graph(&[("a", &["b"]), ("b", &["a"])]);
        let err = resolve(&mut g).unwrap_err();
        match err {
            Error::DependencyCycle { participants } => {
                assert_eq!(participants.len(), 2);
                assert!(participants.contains(&key("a")));
                assert!(participants.contains(&key("b")));
            }
            other => panic!("expected DependencyCycle, got: {other:?}"),
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let mut g = graph(&[("a", &["a"])]);
        assert!(matches!(
            resolve(&mut g),
            Err(Error::DependencyCycle { ref participants }) if participants == &vec![key("a")]
        ));
    }

    #[test]
    fn test_cycle_participants_exclude_lead_in() {
        // 0 -> a -> b -> c -> a : "0" is on the stack but not in the cycle.
        let mut g = graph(&[("0", &[]), ("a", &["0", "c"]), ("b", &["a"]), ("c", &["b"])]);
        let Err(Error::DependencyCycle { participants }) = resolve(&mut g) else {
            panic!("expected a cycle");
        };
        assert!(!participants.contains(&key("0")));
        assert_eq!(participants.len(), 3);
    }
}
