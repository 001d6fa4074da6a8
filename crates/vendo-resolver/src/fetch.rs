//! Fetch coordinator: drives every node from Pending to Present or Failed.
//!
//! One coordinating task owns the graph; it is the only code that reads or
//! writes node and edge sets, which removes the need for any lock on the
//! graph. Blocking git and filesystem work runs on a bounded pool of
//! `spawn_blocking` workers; each worker is a pure function from a job to a
//! report and posts its result back over a channel. Discovery recursion is
//! re-entered through that channel rather than the call stack, so deep
//! dependency chains cannot overflow and sibling subtrees interleave freely.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use petgraph::graph::NodeIndex;
use tokio::sync::{mpsc, Semaphore};

use vendo_core::dependency::{abbrev, DepSpec};
use vendo_core::manifest::Manifest;
use vendo_core::MANIFEST_FILE;
use vendo_git::{clone_url, GitError, Protocol, Repo};
use vendo_util::errors::VendoError;
use vendo_util::fs::{ensure_dir, is_git_work_tree};
use vendo_util::progress;

use crate::builder::GraphBuilder;
use crate::conflict::ConflictReport;
use crate::graph::{DepGraph, DepNode, Failure, NodeState};

/// Worker pool capacity: bounds concurrent network and disk load.
pub const DEFAULT_JOBS: usize = 5;

/// Parameters of one resolution run.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Directory the dependency sources are vendored under (created if absent).
    pub deps_root: PathBuf,
    /// Transport used to materialize clone URLs.
    pub protocol: Protocol,
    /// Worker pool size. Size 1 is the sequential reference mode.
    pub jobs: usize,
    /// Stop dispatching new work after the first per-node failure instead of
    /// isolating it. In-flight work still drains either way.
    pub fail_fast: bool,
}

impl FetchConfig {
    pub fn new(deps_root: impl Into<PathBuf>) -> Self {
        Self {
            deps_root: deps_root.into(),
            protocol: Protocol::default(),
            jobs: DEFAULT_JOBS,
            fail_fast: false,
        }
    }
}

/// The closed graph plus everything the run observed.
pub struct SyncOutcome {
    pub graph: DepGraph,
    pub conflicts: ConflictReport,
    pub cloned: usize,
    pub updated: usize,
    pub reused: usize,
    /// Reconciler warnings (local revision left untouched).
    pub warnings: Vec<String>,
}

impl SyncOutcome {
    pub fn failed_nodes(&self) -> Vec<&DepNode> {
        self.graph
            .all_nodes()
            .into_iter()
            .filter(|n| n.state == NodeState::Failed)
            .collect()
    }

    pub fn failed(&self) -> usize {
        self.failed_nodes().len()
    }
}

/// What the worker did to materialize a node's source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeAction {
    /// Fresh clone at the pinned revision.
    Cloned,
    /// Work tree already at the pin (or left untouched by policy).
    Reused,
    /// Branch checkout brought the work tree onto the pin.
    Updated,
    /// The root sentinel: manifest read only, nothing fetched.
    Root,
}

/// Result of one worker step; applied to the graph by the coordinator.
struct NodeReport {
    action: NodeAction,
    /// `(current, pinned)` when the on-disk revision differed from the pin.
    mismatch: Option<(String, String)>,
    /// Reconciler declined to act; surfaced to the user.
    warning: Option<String>,
    /// Declarations read from the node's manifest, ready for discovery.
    children: Vec<DepSpec>,
}

/// Everything a worker needs; copied out of the node so the graph itself
/// never crosses a task boundary.
struct NodeJob {
    name: String,
    url: String,
    rev: String,
    branch: Option<String>,
    path: PathBuf,
    is_root: bool,
}

/// A finished fetch/reconcile step, posted back to the coordinator.
struct Completion {
    idx: NodeIndex,
    result: Result<NodeReport, Failure>,
}

impl From<GitError> for Failure {
    fn from(err: GitError) -> Self {
        Failure {
            message: err.message,
            trace: err.trace,
        }
    }
}

/// Resolve the whole graph: seed with the root project, fetch and discover
/// until no Pending or Fetching node remains, and return the closed graph.
pub async fn run(
    project_root: &Path,
    project_name: &str,
    cfg: &FetchConfig,
) -> miette::Result<SyncOutcome> {
    ensure_dir(&cfg.deps_root).map_err(|e| VendoError::Config {
        message: format!(
            "cannot create dependency root {}: {e}",
            cfg.deps_root.display()
        ),
    })?;

    let mut graph = DepGraph::new();
    let mut conflicts = ConflictReport::new();
    let builder = GraphBuilder::new(cfg.deps_root.clone());
    let root = builder.seed_root(&mut graph, project_name, project_root);

    let semaphore = Arc::new(Semaphore::new(cfg.jobs.max(1)));
    let (tx, mut rx) = mpsc::channel::<Completion>(64);

    let mut in_flight = 0usize;
    let mut halted = false;
    let (mut cloned, mut updated, mut reused) = (0usize, 0usize, 0usize);
    let mut warnings = Vec::new();

    dispatch(&mut graph, root, cfg.protocol, &semaphore, &tx, &mut in_flight);

    // The run is closed when every dispatched job has reported back and
    // discovery produced nothing new to dispatch.
    while in_flight > 0 {
        let Some(Completion { idx, result }) = rx.recv().await else {
            break;
        };
        in_flight -= 1;

        match result {
            Ok(report) => {
                graph.advance(idx, NodeState::Present);
                let name = graph.node(idx).name.clone();

                if let Some((current, pinned)) = &report.mismatch {
                    progress::status_warn(
                        "Mismatch",
                        &format!(
                            "{name}: current {} pinned {}",
                            abbrev(current),
                            abbrev(pinned)
                        ),
                    );
                }
                if let Some(warning) = report.warning {
                    progress::status_warn("Warning", &warning);
                    warnings.push(warning);
                }
                match report.action {
                    NodeAction::Cloned => {
                        cloned += 1;
                        progress::status("Cloned", &name);
                    }
                    NodeAction::Updated => {
                        updated += 1;
                        progress::status("Updated", &name);
                    }
                    NodeAction::Reused => {
                        reused += 1;
                        tracing::debug!(name = %name, "reused existing work tree");
                    }
                    NodeAction::Root => {}
                }

                let created = builder.discover(&mut graph, &mut conflicts, idx, &report.children);
                for child in created {
                    if halted {
                        skip(&mut graph, child);
                    } else {
                        dispatch(&mut graph, child, cfg.protocol, &semaphore, &tx, &mut in_flight);
                    }
                }
            }
            Err(failure) => {
                progress::status_warn(
                    "Failed",
                    &format!("{}: {}", graph.node(idx).name, failure.message),
                );
                graph.advance(idx, NodeState::Failed);
                graph.node_mut(idx).failure = Some(failure);
                if cfg.fail_fast {
                    halted = true;
                }
            }
        }
    }

    Ok(SyncOutcome {
        graph,
        conflicts,
        cloned,
        updated,
        reused,
        warnings,
    })
}

/// Hand a node to the worker pool. The job carries owned copies of the
/// node's fields; results come back through the completion channel.
fn dispatch(
    graph: &mut DepGraph,
    idx: NodeIndex,
    protocol: Protocol,
    semaphore: &Arc<Semaphore>,
    tx: &mpsc::Sender<Completion>,
    in_flight: &mut usize,
) {
    graph.advance(idx, NodeState::Fetching);
    let node = graph.node(idx);
    let job = NodeJob {
        name: node.name.clone(),
        url: node.url.clone(),
        rev: node.rev.clone(),
        branch: node.branch.clone(),
        path: node.path.clone(),
        is_root: node.is_root(),
    };
    tracing::debug!(name = %job.name, "dispatching");
    *in_flight += 1;

    let semaphore = Arc::clone(semaphore);
    let tx = tx.clone();
    tokio::spawn(async move {
        let _permit = semaphore.acquire_owned().await;
        let result = match tokio::task::spawn_blocking(move || process_node(job, protocol)).await {
            Ok(result) => result,
            Err(e) => Err(Failure {
                message: format!("fetch worker panicked: {e}"),
                trace: Vec::new(),
            }),
        };
        let _ = tx.send(Completion { idx, result }).await;
    });
}

/// Mark a node skipped after a fail-fast halt.
fn skip(graph: &mut DepGraph, idx: NodeIndex) {
    graph.advance(idx, NodeState::Failed);
    graph.node_mut(idx).failure = Some(Failure {
        message: "skipped: run halted by fail-fast".to_string(),
        trace: Vec::new(),
    });
}

/// The blocking worker step: materialize one node's source tree at its pin
/// and read its manifest. Pure with respect to the graph — all it sees is
/// the job, all it produces is the report.
fn process_node(job: NodeJob, protocol: Protocol) -> Result<NodeReport, Failure> {
    if job.is_root {
        return Ok(NodeReport {
            action: NodeAction::Root,
            mismatch: None,
            warning: None,
            children: read_children(&job.path)?,
        });
    }

    if is_git_work_tree(&job.path) {
        let mut repo = Repo::open(&job.path);
        let current = repo.current_revision()?;
        if current == job.rev {
            return Ok(NodeReport {
                action: NodeAction::Reused,
                mismatch: None,
                warning: None,
                children: read_children(&job.path)?,
            });
        }
        reconcile(repo, &job, current)
    } else {
        // A directory without .git cannot receive a clone; clear it first.
        if job.path.exists() {
            std::fs::remove_dir_all(&job.path).map_err(|e| Failure {
                message: format!(
                    "cannot clear stale directory {}: {e}",
                    job.path.display()
                ),
                trace: Vec::new(),
            })?;
        }
        let url = clone_url(&job.url, protocol);
        Repo::clone_at(&url, &job.path, job.branch.as_deref(), &job.rev)?;
        Ok(NodeReport {
            action: NodeAction::Cloned,
            mismatch: None,
            warning: None,
            children: read_children(&job.path)?,
        })
    }
}

/// Revision reconciler: the work tree exists but sits on the wrong revision.
///
/// If the node tracks a branch whose remote head equals the pin, a branch
/// checkout brings the tree in line. Anything else is left untouched with a
/// warning — the one revision this tool ever materializes automatically is
/// the node's own pinned target, and that only at clone time.
fn reconcile(mut repo: Repo, job: &NodeJob, current: String) -> Result<NodeReport, Failure> {
    let mismatch = Some((current.clone(), job.rev.clone()));

    if let Some(branch) = &job.branch {
        let head = repo.remote_branch_head(branch)?;
        if head.as_deref() == Some(job.rev.as_str()) {
            repo.checkout_branch(branch)?;
            return Ok(NodeReport {
                action: NodeAction::Updated,
                mismatch,
                warning: None,
                children: read_children(&job.path)?,
            });
        }
    }

    let warning = format!(
        "{}: local revision {} differs from pinned {}; not updating automatically, \
         manual intervention may be required",
        job.name,
        abbrev(&current),
        abbrev(&job.rev)
    );
    Ok(NodeReport {
        action: NodeAction::Reused,
        mismatch,
        warning: Some(warning),
        children: read_children(&job.path)?,
    })
}

/// Read a node's manifest-declared children. No manifest means leaf; a
/// malformed manifest is this node's failure, not the run's.
fn read_children(path: &Path) -> Result<Vec<DepSpec>, Failure> {
    let manifest_path = path.join(MANIFEST_FILE);
    if !manifest_path.is_file() {
        return Ok(Vec::new());
    }
    let manifest = Manifest::from_path(&manifest_path).map_err(|e| Failure {
        message: format!("{e}"),
        trace: Vec::new(),
    })?;
    manifest.resolved_deps().map_err(|e| Failure {
        message: format!("{e}"),
        trace: Vec::new(),
    })
}
