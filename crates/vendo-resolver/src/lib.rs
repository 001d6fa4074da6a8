//! Dependency resolution engine for the vendo tool.
//!
//! Resolution is incremental: a node's dependencies are unknown until its
//! source tree is present, so the graph grows as fetches complete. A single
//! coordinating task owns all graph mutation; a bounded pool of blocking
//! workers performs the git work and posts results back to it.

pub mod builder;
pub mod conflict;
pub mod fetch;
pub mod graph;
pub mod topo;
