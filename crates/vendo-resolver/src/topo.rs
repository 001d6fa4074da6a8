//! Topological build order over the closed graph.

use std::collections::HashSet;

use miette::Diagnostic;
use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::graph::{DepGraph, NodeState};

/// The graph contains a dependency cycle; valid manifests never produce one,
/// so this aborts the run. `names` walks the cycle, repeating the entry node.
#[derive(Debug, Error, Diagnostic)]
#[error("dependency cycle detected: {}", names.join(" -> "))]
#[diagnostic(help("break the cycle by removing one of the manifest declarations"))]
pub struct CycleError {
    pub names: Vec<String>,
}

/// Compute the build order: depth-first post-order from the root, each node
/// appended only after all of its children. Child visitation follows
/// first-discovery order, so the result is deterministic for a given set of
/// manifests regardless of fetch interleaving.
///
/// The root is excluded. Failed nodes stay in the graph for reporting but
/// are excluded from the order, yielding a best-effort sequence over
/// everything that resolved.
pub fn sort(graph: &DepGraph) -> Result<Vec<NodeIndex>, CycleError> {
    let root = match graph.root {
        Some(r) => r,
        None => return Ok(Vec::new()),
    };

    let mut order = Vec::new();
    let mut done = HashSet::new();
    let mut on_stack = HashSet::new();
    let mut path = Vec::new();
    visit(graph, root, &mut done, &mut on_stack, &mut path, &mut order)?;

    Ok(order
        .into_iter()
        .filter(|&idx| idx != root && graph.node(idx).state != NodeState::Failed)
        .collect())
}

fn visit(
    graph: &DepGraph,
    idx: NodeIndex,
    done: &mut HashSet<NodeIndex>,
    on_stack: &mut HashSet<NodeIndex>,
    path: &mut Vec<NodeIndex>,
    order: &mut Vec<NodeIndex>,
) -> Result<(), CycleError> {
    on_stack.insert(idx);
    path.push(idx);

    for child in graph.dependencies_of(idx) {
        if done.contains(&child) {
            continue;
        }
        if on_stack.contains(&child) {
            let start = path.iter().position(|&p| p == child).unwrap_or(0);
            let mut names: Vec<String> = path[start..]
                .iter()
                .map(|&p| graph.node(p).name.clone())
                .collect();
            names.push(graph.node(child).name.clone());
            return Err(CycleError { names });
        }
        visit(graph, child, done, on_stack, path, order)?;
    }

    path.pop();
    on_stack.remove(&idx);
    done.insert(idx);
    order.push(idx);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DepNode, Failure, ROOT_URL};
    use std::path::PathBuf;

    fn make_node(name: &str, url: &str) -> DepNode {
        DepNode {
            name: name.to_string(),
            url: url.to_string(),
            rev: "abc1234".to_string(),
            branch: None,
            path: PathBuf::from(name),
            state: NodeState::Present,
            failure: None,
        }
    }

    fn graph_with_root() -> (DepGraph, NodeIndex) {
        let mut g = DepGraph::new();
        let root = g.add_node(make_node("proj", ROOT_URL));
        g.set_root(root);
        (g, root)
    }

    fn names(g: &DepGraph, order: &[NodeIndex]) -> Vec<String> {
        order.iter().map(|&i| g.node(i).name.clone()).collect()
    }

    #[test]
    fn empty_graph_sorts_to_nothing() {
        let (g, _) = graph_with_root();
        assert!(sort(&g).unwrap().is_empty());
    }

    #[test]
    fn children_come_before_parents() {
        let (mut g, root) = graph_with_root();
        let a = g.add_node(make_node("a", "u/a"));
        let b = g.add_node(make_node("b", "u/b"));
        let c = g.add_node(make_node("c", "u/c"));
        g.add_edge(root, a);
        g.add_edge(root, b);
        g.add_edge(a, c);

        let order = names(&g, &sort(&g).unwrap());
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert_eq!(order.len(), 3);
        assert!(pos("c") < pos("a"));
        assert!(!order.contains(&"proj".to_string()));
    }

    #[test]
    fn diamond_visits_shared_node_once() {
        let (mut g, root) = graph_with_root();
        let a = g.add_node(make_node("a", "u/a"));
        let b = g.add_node(make_node("b", "u/b"));
        let d = g.add_node(make_node("d", "u/d"));
        g.add_edge(root, a);
        g.add_edge(root, b);
        g.add_edge(a, d);
        g.add_edge(b, d);

        let order = names(&g, &sort(&g).unwrap());
        assert_eq!(order.iter().filter(|n| *n == "d").count(), 1);
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert!(pos("d") < pos("a"));
        assert!(pos("d") < pos("b"));
    }

    #[test]
    fn deterministic_first_discovery_order() {
        let (mut g, root) = graph_with_root();
        let b = g.add_node(make_node("b", "u/b"));
        let a = g.add_node(make_node("a", "u/a"));
        g.add_edge(root, b);
        g.add_edge(root, a);
        // b was discovered first, so it sorts first among independent leaves.
        assert_eq!(names(&g, &sort(&g).unwrap()), vec!["b", "a"]);
    }

    #[test]
    fn failed_nodes_are_excluded() {
        let (mut g, root) = graph_with_root();
        let a = g.add_node(make_node("a", "u/a"));
        let mut bad = make_node("bad", "u/bad");
        bad.state = NodeState::Failed;
        bad.failure = Some(Failure {
            message: "clone failed".to_string(),
            trace: vec![],
        });
        let bad = g.add_node(bad);
        g.add_edge(root, bad);
        g.add_edge(root, a);

        assert_eq!(names(&g, &sort(&g).unwrap()), vec!["a"]);
    }

    #[test]
    fn cycle_is_fatal_and_names_members() {
        let (mut g, root) = graph_with_root();
        let x = g.add_node(make_node("x", "u/x"));
        let y = g.add_node(make_node("y", "u/y"));
        g.add_edge(root, x);
        g.add_edge(x, y);
        g.add_edge(y, x);

        let err = sort(&g).unwrap_err();
        assert!(err.names.contains(&"x".to_string()));
        assert!(err.names.contains(&"y".to_string()));
        assert_eq!(err.names.first(), err.names.last());
    }
}
