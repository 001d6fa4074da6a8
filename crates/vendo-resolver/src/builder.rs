//! Incremental graph builder: registers a fetched node's manifest-declared
//! children as nodes and edges.

use std::path::{Path, PathBuf};

use petgraph::graph::NodeIndex;

use vendo_core::dependency::DepSpec;
use vendo_util::fs::dep_dir;

use crate::conflict::{ConflictReport, PinConflict};
use crate::graph::{DepGraph, DepNode, NodeState, ROOT_URL};

/// Turns dependency declarations into graph structure.
///
/// Discovery is lazy by construction: a node's declarations only become
/// available after its source tree is present, so `discover` is called once
/// per node, by the fetch coordinator, after that node's fetch step succeeds.
pub struct GraphBuilder {
    deps_root: PathBuf,
}

impl GraphBuilder {
    pub fn new(deps_root: PathBuf) -> Self {
        Self { deps_root }
    }

    /// Create the root sentinel node for the project being resolved.
    pub fn seed_root(&self, graph: &mut DepGraph, name: &str, path: &Path) -> NodeIndex {
        let idx = graph.add_node(DepNode {
            name: name.to_string(),
            url: ROOT_URL.to_string(),
            rev: String::new(),
            branch: None,
            path: path.to_path_buf(),
            state: NodeState::Pending,
            failure: None,
        });
        graph.set_root(idx);
        idx
    }

    /// Register `parent`'s declared children. Known names get a new edge
    /// only; a known name with a different pin additionally records a
    /// conflict (first-seen pin wins). Unknown names become Pending nodes
    /// and are returned so the caller can schedule them for fetching.
    pub fn discover(
        &self,
        graph: &mut DepGraph,
        conflicts: &mut ConflictReport,
        parent: NodeIndex,
        decls: &[DepSpec],
    ) -> Vec<NodeIndex> {
        let mut created = Vec::new();
        for spec in decls {
            match graph.find(&spec.name) {
                Some(existing) => {
                    let node = graph.node(existing);
                    if node.rev != spec.rev {
                        let conflict = PinConflict {
                            name: spec.name.clone(),
                            kept: node.rev.clone(),
                            requested: spec.rev.clone(),
                            requested_by: graph.node(parent).name.clone(),
                        };
                        tracing::warn!(%conflict, "pin conflict");
                        conflicts.add(conflict);
                    }
                    graph.add_edge(parent, existing);
                }
                None => {
                    let idx = graph.add_node(DepNode {
                        name: spec.name.clone(),
                        url: spec.url.clone(),
                        rev: spec.rev.clone(),
                        branch: spec.branch.clone(),
                        path: dep_dir(&self.deps_root, &spec.name),
                        state: NodeState::Pending,
                        failure: None,
                    });
                    graph.add_edge(parent, idx);
                    created.push(idx);
                }
            }
        }
        created
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, rev: &str) -> DepSpec {
        DepSpec {
            name: name.to_string(),
            url: format!("example.com/org/{name}"),
            rev: rev.to_string(),
            branch: None,
        }
    }

    fn setup() -> (DepGraph, ConflictReport, GraphBuilder, NodeIndex) {
        let mut graph = DepGraph::new();
        let builder = GraphBuilder::new(PathBuf::from("deps"));
        let root = builder.seed_root(&mut graph, "proj", Path::new("."));
        (graph, ConflictReport::new(), builder, root)
    }

    #[test]
    fn new_declarations_become_pending_nodes() {
        let (mut graph, mut conflicts, builder, root) = setup();
        let created = builder.discover(
            &mut graph,
            &mut conflicts,
            root,
            &[spec("a", "1"), spec("b", "2")],
        );
        assert_eq!(created.len(), 2);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.node(created[0]).state, NodeState::Pending);
        assert_eq!(graph.node(created[0]).path, Path::new("deps/a"));
        assert_eq!(graph.dependencies_of(root), created);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn same_name_same_pin_dedups_to_one_node_with_extra_edge() {
        let (mut graph, mut conflicts, builder, root) = setup();
        let created = builder.discover(&mut graph, &mut conflicts, root, &[spec("a", "1")]);
        let a = created[0];
        let b = builder.discover(&mut graph, &mut conflicts, root, &[spec("b", "2")])[0];

        let from_b = builder.discover(&mut graph, &mut conflicts, b, &[spec("a", "1")]);
        assert!(from_b.is_empty());
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.dependencies_of(b), vec![a]);
        assert_eq!(graph.dependents_of(a).len(), 2);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn divergent_pin_records_conflict_and_keeps_first() {
        let (mut graph, mut conflicts, builder, root) = setup();
        let a = builder.discover(&mut graph, &mut conflicts, root, &[spec("a", "1")])[0];
        let b = builder.discover(&mut graph, &mut conflicts, root, &[spec("b", "2")])[0];

        let from_b = builder.discover(&mut graph, &mut conflicts, b, &[spec("a", "9")]);
        assert!(from_b.is_empty());
        assert_eq!(graph.node(a).rev, "1");
        assert_eq!(conflicts.len(), 1);
        let c = &conflicts.conflicts[0];
        assert_eq!(c.name, "a");
        assert_eq!(c.kept, "1");
        assert_eq!(c.requested, "9");
        assert_eq!(c.requested_by, "b");
    }
}
