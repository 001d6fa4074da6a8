//! Core data types for the vendo dependency tool.
//!
//! This crate defines the manifest format and the dependency declaration
//! types that the resolver consumes. It is intentionally free of async code,
//! network I/O, and git invocation.

/// File name of the per-repository dependency manifest.
pub const MANIFEST_FILE: &str = "vendo.toml";

pub mod dependency;
pub mod manifest;
