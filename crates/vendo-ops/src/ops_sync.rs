//! Operation: resolve, fetch, and pin all transitive dependencies, then
//! emit the build descriptor.

use std::path::Path;

use vendo_core::manifest::Manifest;
use vendo_core::MANIFEST_FILE;
use vendo_resolver::fetch::{self, FetchConfig};
use vendo_resolver::topo;
use vendo_util::errors::VendoError;
use vendo_util::progress::{status, status_warn};

use crate::descriptor;

/// Run a full sync against `project_root`.
///
/// Per-node failures are isolated and summarized; the run only errors out on
/// structural problems (unreadable root manifest, dependency cycle, unusable
/// dependency root) or, with `fail_fast`, on any node failure.
pub async fn sync(project_root: &Path, cfg: &FetchConfig, verbose: bool) -> miette::Result<()> {
    // Fail early on a missing or malformed root manifest; dependency
    // manifests are the coordinator's concern.
    let manifest = Manifest::from_path(&project_root.join(MANIFEST_FILE))?;

    let outcome = fetch::run(project_root, &manifest.package.name, cfg).await?;

    if !outcome.conflicts.is_empty() {
        if verbose {
            eprintln!("{}", outcome.conflicts);
        } else {
            status_warn(
                "Conflicts",
                &format!(
                    "{} pin conflict(s); run with --verbose for details",
                    outcome.conflicts.len()
                ),
            );
        }
    }

    // Cycle detection is fatal; no descriptor is emitted for a cyclic graph.
    let order = topo::sort(&outcome.graph).map_err(|e| VendoError::Resolution {
        message: e.to_string(),
    })?;
    let descriptor_path = descriptor::emit(&cfg.deps_root, &outcome.graph, &order)?;

    let failed = outcome.failed_nodes();
    for node in &failed {
        if let Some(failure) = &node.failure {
            status_warn("Failed", &format!("{}: {}", node.name, failure.message));
            if !failure.trace.is_empty() {
                eprintln!("*** TRACE:");
                for line in &failure.trace {
                    eprintln!("{line}");
                }
            }
        }
    }

    status(
        "Synced",
        &format!(
            "{} dependencies: {} cloned, {} updated, {} reused, {} failed (wrote {})",
            outcome.graph.len(),
            outcome.cloned,
            outcome.updated,
            outcome.reused,
            failed.len(),
            descriptor_path.display()
        ),
    );

    if cfg.fail_fast && !failed.is_empty() {
        return Err(VendoError::Resolution {
            message: format!("{} dependencies failed", failed.len()),
        }
        .into());
    }
    Ok(())
}
