//! Handler for `vendo sync`.

use miette::Result;

use vendo_git::url::Protocol;
use vendo_ops::ops_sync;
use vendo_resolver::fetch::FetchConfig;

pub async fn exec(
    deps_root: &str,
    https: bool,
    jobs: usize,
    fail_fast: bool,
    verbose: bool,
) -> Result<()> {
    let project_root = super::project_root()?;

    let cfg = FetchConfig {
        deps_root: super::resolve_deps_root(&project_root, deps_root),
        protocol: if https { Protocol::Https } else { Protocol::Ssh },
        jobs: jobs.max(1),
        fail_fast,
    };

    tracing::debug!(
        project_root = %project_root.display(),
        deps_root = %cfg.deps_root.display(),
        jobs = cfg.jobs,
        "starting sync"
    );
    ops_sync::sync(&project_root, &cfg, verbose).await
}
