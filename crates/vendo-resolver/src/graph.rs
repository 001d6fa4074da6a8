//! Dependency graph construction and traversal.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use vendo_core::dependency::abbrev;

/// Sentinel `url` marking the root project node. The root participates in
/// edges and traversal like any other node but is never fetched and never
/// appears in the emitted build order.
pub const ROOT_URL: &str = "<root>";

/// Resolution state of a node. Only ever advances, never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeState {
    Pending,
    Fetching,
    Present,
    Failed,
}

/// A recorded per-node failure: message plus the captured command trace.
#[derive(Debug, Clone)]
pub struct Failure {
    pub message: String,
    pub trace: Vec<String>,
}

/// A node in the dependency graph: one resolved-or-pending dependency.
#[derive(Debug, Clone)]
pub struct DepNode {
    /// Unique identity key; dedup happens on this.
    pub name: String,
    /// Repository location (no transport scheme), or [`ROOT_URL`].
    pub url: String,
    /// Pinned revision the work tree must be materialized to. Empty for root.
    pub rev: String,
    pub branch: Option<String>,
    /// Where this node's source tree lives or will live.
    pub path: PathBuf,
    pub state: NodeState,
    /// Set when `state` is `Failed`; preserved for the run summary.
    pub failure: Option<Failure>,
}

impl DepNode {
    pub fn is_root(&self) -> bool {
        self.url == ROOT_URL
    }
}

impl fmt::Display for DepNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}@{}", self.name, abbrev(&self.rev))
        }
    }
}

/// The dependency graph backed by petgraph, with a name index for dedup.
///
/// Owned exclusively by the fetch coordinator's task during a run; read-only
/// once the run completes.
pub struct DepGraph {
    graph: DiGraph<DepNode, ()>,
    /// Lookup from node name to index (one node per distinct name).
    index: HashMap<String, NodeIndex>,
    pub root: Option<NodeIndex>,
}

impl DepGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            root: None,
        }
    }

    /// Add or retrieve a node. If the name already exists, returns the
    /// existing index — the caller decides whether that is a conflict.
    pub fn add_node(&mut self, node: DepNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node.name) {
            return idx;
        }
        let name = node.name.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(name, idx);
        idx
    }

    /// Set the root node of the graph (the project itself).
    pub fn set_root(&mut self, idx: NodeIndex) {
        self.root = Some(idx);
    }

    /// Add a parent-requires-child edge, deduplicated per pair.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        if !self.graph.edges(from).any(|e| e.target() == to) {
            self.graph.add_edge(from, to, ());
        }
    }

    /// Look up a node by name.
    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &DepNode {
        &self.graph[idx]
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut DepNode {
        &mut self.graph[idx]
    }

    /// Advance a node's resolution state. States are ordered; a regression is
    /// a logic error and is ignored outside debug builds.
    pub fn advance(&mut self, idx: NodeIndex, next: NodeState) {
        let node = &mut self.graph[idx];
        debug_assert!(
            next >= node.state,
            "state regression on {}: {:?} -> {next:?}",
            node.name,
            node.state
        );
        if next > node.state {
            node.state = next;
        }
    }

    /// Direct dependencies of a node, in first-discovery order.
    ///
    /// petgraph iterates outgoing edges newest-first, so reverse to recover
    /// insertion order.
    pub fn dependencies_of(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut deps: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.target())
            .collect();
        deps.reverse();
        deps
    }

    /// Reverse dependencies (who requires this node).
    pub fn dependents_of(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.source())
            .collect()
    }

    /// All node indices, in creation order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// All non-root nodes.
    pub fn all_nodes(&self) -> Vec<&DepNode> {
        self.graph
            .node_indices()
            .filter(|&idx| Some(idx) != self.root)
            .map(|idx| &self.graph[idx])
            .collect()
    }

    /// Number of nodes (excluding root).
    pub fn len(&self) -> usize {
        let total = self.graph.node_count();
        if self.root.is_some() {
            total.saturating_sub(1)
        } else {
            total
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the dependency tree as text, one branch per requirement.
    pub fn print_tree(&self, max_depth: Option<usize>) -> String {
        let mut output = String::new();
        let root = match self.root {
            Some(r) => r,
            None => return output,
        };

        output.push_str(&format!("{}\n", self.graph[root]));

        let mut visited = HashSet::new();
        visited.insert(root);

        let deps = self.dependencies_of(root);
        let count = deps.len();
        for (i, idx) in deps.iter().enumerate() {
            let is_last = i == count - 1;
            self.print_subtree(&mut output, *idx, "", is_last, 1, max_depth, &mut visited);
        }

        output
    }

    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        depth: usize,
        max_depth: Option<usize>,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        let node = &self.graph[idx];
        let marker = match node.state {
            NodeState::Failed => " (failed)",
            NodeState::Pending | NodeState::Fetching => " (pending)",
            NodeState::Present => "",
        };
        output.push_str(&format!("{prefix}{connector}{node}{marker}\n"));

        if let Some(max) = max_depth {
            if depth >= max {
                return;
            }
        }

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let deps = self.dependencies_of(idx);
        let count = deps.len();
        for (i, child) in deps.iter().enumerate() {
            let is_last = i == count - 1;
            self.print_subtree(
                output,
                *child,
                &child_prefix,
                is_last,
                depth + 1,
                max_depth,
                visited,
            );
        }

        visited.remove(&idx);
    }
}

impl Default for DepGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_node(name: &str, rev: &str) -> DepNode {
        DepNode {
            name: name.to_string(),
            url: format!("example.com/org/{name}"),
            rev: rev.to_string(),
            branch: None,
            path: PathBuf::from(format!("deps/{name}")),
            state: NodeState::Pending,
            failure: None,
        }
    }

    #[test]
    fn add_and_find() {
        let mut g = DepGraph::new();
        let idx = g.add_node(make_node("zstd", "abc1234"));
        assert_eq!(g.find("zstd"), Some(idx));
        assert_eq!(g.node(idx).rev, "abc1234");
    }

    #[test]
    fn duplicate_add_returns_same_index() {
        let mut g = DepGraph::new();
        let idx1 = g.add_node(make_node("zstd", "abc1234"));
        let idx2 = g.add_node(make_node("zstd", "fff9999"));
        assert_eq!(idx1, idx2);
        // First registration wins; the caller records the conflict.
        assert_eq!(g.node(idx1).rev, "abc1234");
    }

    #[test]
    fn edges_deduplicate_per_pair() {
        let mut g = DepGraph::new();
        let a = g.add_node(make_node("a", "1"));
        let b = g.add_node(make_node("b", "2"));
        g.add_edge(a, b);
        g.add_edge(a, b);
        assert_eq!(g.dependencies_of(a), vec![b]);
        assert_eq!(g.dependents_of(b), vec![a]);
    }

    #[test]
    fn dependencies_in_discovery_order() {
        let mut g = DepGraph::new();
        let root = g.add_node(make_node("root", ""));
        let a = g.add_node(make_node("a", "1"));
        let b = g.add_node(make_node("b", "2"));
        let c = g.add_node(make_node("c", "3"));
        g.add_edge(root, a);
        g.add_edge(root, b);
        g.add_edge(root, c);
        assert_eq!(g.dependencies_of(root), vec![a, b, c]);
    }

    #[test]
    fn state_only_advances() {
        let mut g = DepGraph::new();
        let idx = g.add_node(make_node("a", "1"));
        g.advance(idx, NodeState::Fetching);
        g.advance(idx, NodeState::Present);
        assert_eq!(g.node(idx).state, NodeState::Present);
    }

    #[test]
    fn len_excludes_root() {
        let mut g = DepGraph::new();
        let root = g.add_node(DepNode {
            url: ROOT_URL.to_string(),
            ..make_node("proj", "")
        });
        g.set_root(root);
        assert!(g.is_empty());
        let a = g.add_node(make_node("a", "1"));
        g.add_edge(root, a);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn tree_printing() {
        let mut g = DepGraph::new();
        let root = g.add_node(DepNode {
            url: ROOT_URL.to_string(),
            ..make_node("proj", "")
        });
        g.set_root(root);
        let a = g.add_node(make_node("alib", "abc1234def"));
        let b = g.add_node(make_node("blib", "9876543210"));
        g.add_edge(root, a);
        g.add_edge(a, b);

        let tree = g.print_tree(None);
        assert!(tree.starts_with("proj\n"));
        assert!(tree.contains("alib@abc1234"));
        assert!(tree.contains("blib@9876543"));
    }
}
