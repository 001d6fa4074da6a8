//! Shared utilities for the vendo dependency tool.
//!
//! This crate provides cross-cutting concerns used by all other vendo crates:
//! error types, filesystem helpers, process spawning with captured output,
//! and terminal progress indicators.

pub mod errors;
pub mod fs;
pub mod process;
pub mod progress;
