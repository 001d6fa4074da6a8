//! Command dispatch and handler modules.

mod sync;
mod tree;

use std::path::{Path, PathBuf};

use miette::Result;

use vendo_core::MANIFEST_FILE;
use vendo_util::errors::VendoError;
use vendo_util::fs::find_ancestor_with;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Sync {
            deps_root,
            https,
            jobs,
            fail_fast,
        } => sync::exec(&deps_root, https, jobs, fail_fast, cli.verbose).await,
        Command::Tree { deps_root, depth } => tree::exec(&deps_root, depth),
    }
}

/// Locate the project root: the nearest ancestor of the working directory
/// that carries a `vendo.toml`.
fn project_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(VendoError::Io)?;
    find_ancestor_with(&cwd, MANIFEST_FILE).ok_or_else(|| {
        VendoError::Manifest {
            message: format!("No {MANIFEST_FILE} found in {} or any parent", cwd.display()),
        }
        .into()
    })
}

/// Resolve a user-supplied dependency root against the project root.
fn resolve_deps_root(project_root: &Path, deps_root: &str) -> PathBuf {
    let path = Path::new(deps_root);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
