use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use vendo_util::process::{CommandBuilder, CommandOutput, ProcessError};

/// A git operation failed. `trace` holds the rendered output of every
/// command the operation ran, including the failing one, for diagnostics.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct GitError {
    pub message: String,
    pub trace: Vec<String>,
}

/// Handle on one dependency's work tree.
///
/// Accumulates a transcript of every git command it runs so that a failure
/// anywhere in a multi-command sequence (fetch, checkout, merge) surfaces the
/// whole history, not just the last command.
#[derive(Debug)]
pub struct Repo {
    path: PathBuf,
    trace: Vec<String>,
}

impl Repo {
    /// Open an existing work tree. No validation happens here; the first
    /// command run against a non-repository fails with its own diagnostics.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            trace: Vec::new(),
        }
    }

    /// Clone `url` into `path` and check out the pinned revision.
    ///
    /// Passing `branch` narrows the clone to that branch's history where the
    /// transport supports it; the explicit checkout afterwards guarantees the
    /// work tree lands exactly on `rev` either way.
    pub fn clone_at(
        url: &str,
        path: &Path,
        branch: Option<&str>,
        rev: &str,
    ) -> Result<Self, GitError> {
        let mut repo = Self::open(path);

        let mut clone = CommandBuilder::new("git").arg("clone");
        if let Some(b) = branch {
            clone = clone.arg("--branch").arg(b);
        }
        let clone = clone.arg(url).arg(path.display().to_string());
        repo.record(clone.run())?;

        repo.checkout(rev)?;
        Ok(repo)
    }

    /// Commands executed so far, rendered for failure traces.
    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    /// Revision the work tree currently sits on (`git rev-parse HEAD`).
    pub fn current_revision(&mut self) -> Result<String, GitError> {
        let output = self.git(["rev-parse", "HEAD"])?;
        match output.first_line() {
            Some(rev) => Ok(rev.to_string()),
            None => Err(self.error("git rev-parse HEAD produced no output")),
        }
    }

    /// Current head of `branch` on the `origin` remote, if the remote has it.
    pub fn remote_branch_head(&mut self, branch: &str) -> Result<Option<String>, GitError> {
        let output = self.git(["ls-remote", "origin", branch])?;
        Ok(output
            .first_line()
            .and_then(|line| line.split_whitespace().next())
            .map(|rev| rev.to_string()))
    }

    /// Check out an arbitrary ref (commit, branch, or tag).
    pub fn checkout(&mut self, refname: &str) -> Result<(), GitError> {
        self.git(["checkout", refname])?;
        Ok(())
    }

    /// Bring the work tree onto `branch` at its remote head: fetch, check the
    /// branch out, and fast-forward to `origin/<branch>`.
    pub fn checkout_branch(&mut self, branch: &str) -> Result<(), GitError> {
        self.git(["fetch", "origin"])?;
        self.git(["checkout", branch])?;
        let upstream = format!("origin/{branch}");
        self.git(["merge", "--ff-only", upstream.as_str()])?;
        Ok(())
    }

    fn git<'a>(&mut self, args: impl IntoIterator<Item = &'a str>) -> Result<CommandOutput, GitError> {
        let builder = CommandBuilder::new("git")
            .args(args)
            .cwd(self.path.display().to_string());
        self.record(builder.run())
    }

    /// Fold a command result into the transcript. Successful commands extend
    /// the trace; a failure converts it into a [`GitError`] carrying the
    /// trace up to and including the failing command.
    fn record(
        &mut self,
        result: Result<CommandOutput, ProcessError>,
    ) -> Result<CommandOutput, GitError> {
        match result {
            Ok(output) => {
                tracing::trace!(command = %output.command, "git ok");
                self.trace.push(output.to_string());
                Ok(output)
            }
            Err(ProcessError::NonZeroExit {
                command,
                code,
                output,
            }) => {
                self.trace.push(output.to_string());
                Err(self.error(&format!("`{command}` exited with code {code}")))
            }
            Err(ProcessError::Spawn { command, source }) => {
                Err(self.error(&format!("failed to spawn `{command}`: {source}")))
            }
        }
    }

    fn error(&self, message: &str) -> GitError {
        GitError {
            message: message.to_string(),
            trace: self.trace.clone(),
        }
    }
}
