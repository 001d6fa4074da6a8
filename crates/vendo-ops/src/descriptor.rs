//! Build-file descriptor emission.
//!
//! The downstream build orchestrator consumes a generated `CMakeLists.txt`
//! in the dependency root: one `add_subdirectory` directive per resolved
//! dependency, in topological build order.

use std::path::{Path, PathBuf};

use petgraph::graph::NodeIndex;

use vendo_resolver::graph::DepGraph;
use vendo_util::errors::VendoError;

/// File written into the dependency root.
pub const DESCRIPTOR_FILE: &str = "CMakeLists.txt";

/// Write the descriptor for a sorted order. Returns the descriptor path.
///
/// `order` is expected to come from the topological sorter: root and failed
/// nodes already excluded, every child ahead of its parents.
pub fn emit(deps_root: &Path, graph: &DepGraph, order: &[NodeIndex]) -> miette::Result<PathBuf> {
    let mut content = String::new();
    content.push_str(&format!("project({})\n", deps_root.display()));
    content.push_str("cmake_minimum_required(VERSION 3.10)\n\n");
    for &idx in order {
        content.push_str(&format!(
            "add_subdirectory({} EXCLUDE_FROM_ALL)\n",
            graph.node(idx).name
        ));
    }

    let path = deps_root.join(DESCRIPTOR_FILE);
    std::fs::write(&path, content).map_err(|e| VendoError::Generic {
        message: format!("failed to write {}: {e}", path.display()),
    })?;
    tracing::debug!(path = %path.display(), entries = order.len(), "wrote descriptor");
    Ok(path)
}
