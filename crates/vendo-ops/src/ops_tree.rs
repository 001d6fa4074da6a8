//! Operation: print the dependency tree from on-disk manifests.
//!
//! Offline by design — walks whatever is already vendored under the
//! dependency root and never invokes git. Dependencies that are declared but
//! not yet materialized show up as pending leaves.

use std::collections::VecDeque;
use std::path::Path;

use vendo_core::manifest::Manifest;
use vendo_core::MANIFEST_FILE;
use vendo_resolver::builder::GraphBuilder;
use vendo_resolver::conflict::ConflictReport;
use vendo_resolver::graph::{DepGraph, NodeState};

/// Build the graph from local manifests and return its rendering.
pub fn tree(project_root: &Path, deps_root: &Path, max_depth: Option<usize>) -> miette::Result<String> {
    let manifest = Manifest::from_path(&project_root.join(MANIFEST_FILE))?;

    let mut graph = DepGraph::new();
    let mut conflicts = ConflictReport::new();
    let builder = GraphBuilder::new(deps_root.to_path_buf());
    let root = builder.seed_root(&mut graph, &manifest.package.name, project_root);
    graph.advance(root, NodeState::Present);

    let mut queue: VecDeque<_> = builder
        .discover(&mut graph, &mut conflicts, root, &manifest.resolved_deps()?)
        .into();

    while let Some(idx) = queue.pop_front() {
        let manifest_path = graph.node(idx).path.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            // Leaf, or not yet vendored; either way there is nothing to read.
            if graph.node(idx).path.is_dir() {
                graph.advance(idx, NodeState::Present);
            }
            continue;
        }
        match Manifest::from_path(&manifest_path).and_then(|m| m.resolved_deps()) {
            Ok(decls) => {
                graph.advance(idx, NodeState::Present);
                queue.extend(builder.discover(&mut graph, &mut conflicts, idx, &decls));
            }
            Err(e) => {
                tracing::warn!(name = %graph.node(idx).name, error = %e, "unreadable manifest");
                graph.advance(idx, NodeState::Failed);
            }
        }
    }

    Ok(graph.print_tree(max_depth))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(dir: &Path, content: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(MANIFEST_FILE), content).unwrap();
    }

    #[test]
    fn renders_materialized_and_pending_deps() {
        let tmp = tempfile::TempDir::new().unwrap();
        let project = tmp.path().join("proj");
        let deps_root = tmp.path().join("deps");
        write_manifest(
            &project,
            r#"
[package]
name = "proj"

[deps]
here = { git = "example.com/org/here", rev = "abc1234" }
missing = { git = "example.com/org/missing", rev = "def5678" }
"#,
        );
        write_manifest(
            &deps_root.join("here"),
            r#"
[package]
name = "here"

[deps]
inner = { git = "example.com/org/inner", rev = "fff0000" }
"#,
        );

        let rendered = tree(&project, &deps_root, None).unwrap();
        assert!(rendered.starts_with("proj\n"));
        assert!(rendered.contains("here@abc1234"));
        assert!(rendered.contains("inner@fff0000 (pending)"));
        assert!(rendered.contains("missing@def5678 (pending)"));
    }

    #[test]
    fn depth_limit_truncates() {
        let tmp = tempfile::TempDir::new().unwrap();
        let project = tmp.path().join("proj");
        let deps_root = tmp.path().join("deps");
        write_manifest(
            &project,
            "[package]\nname = \"proj\"\n\n[deps]\na = { git = \"u/a\", rev = \"1111111\" }\n",
        );
        write_manifest(
            &deps_root.join("a"),
            "[package]\nname = \"a\"\n\n[deps]\nb = { git = \"u/b\", rev = \"2222222\" }\n",
        );

        let rendered = tree(&project, &deps_root, Some(1)).unwrap();
        assert!(rendered.contains("a@1111111"));
        assert!(!rendered.contains("b@2222222"));
    }
}
