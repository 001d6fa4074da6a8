//! Git collaborator for the vendo dependency tool.
//!
//! Every operation here shells out to the `git` binary through
//! `vendo-util`'s process layer and accumulates a per-operation transcript,
//! so a failure carries everything that ran before it.

pub mod repo;
pub mod url;

pub use repo::{GitError, Repo};
pub use url::{clone_url, Protocol};
