use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all vendo operations.
#[derive(Debug, Error, Diagnostic)]
pub enum VendoError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed manifest (vendo.toml).
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Check the vendo.toml for syntax errors"))]
    Manifest { message: String },

    /// Dependency resolution failed (cycles, unreachable pins, etc.).
    #[error("Dependency resolution failed: {message}")]
    Resolution { message: String },

    /// Run configuration is unusable (e.g. dependency root cannot be created).
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}
