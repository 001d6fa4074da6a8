use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use vendo_util::errors::VendoError;

use crate::dependency::{DepEntry, DepSpec};

/// The parsed representation of a `vendo.toml` file.
///
/// Each vendored repository may carry one; a repository without a manifest is
/// a leaf of the dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub package: PackageMetadata,

    /// Direct dependencies, keyed by name. `BTreeMap` keeps declaration
    /// iteration deterministic across runs.
    #[serde(default)]
    pub deps: BTreeMap<String, DepEntry>,
}

/// Package identity from the `[package]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Manifest {
    /// Load and parse a `vendo.toml` file from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| VendoError::Manifest {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse_toml(&content)
    }

    /// Parse manifest TOML content.
    pub fn parse_toml(content: &str) -> miette::Result<Self> {
        toml::from_str(content)
            .map_err(|e| {
                VendoError::Manifest {
                    message: format!("Invalid vendo.toml: {e}"),
                }
                .into()
            })
            .map(|m: Manifest| {
                tracing::debug!(package = %m.package.name, deps = m.deps.len(), "parsed manifest");
                m
            })
    }

    /// Resolve every `[deps]` entry into a [`DepSpec`].
    ///
    /// A malformed entry (e.g. shorthand without a pinned revision) is an
    /// error: an unpinned dependency cannot be materialized deterministically.
    pub fn resolved_deps(&self) -> miette::Result<Vec<DepSpec>> {
        let mut specs = Vec::with_capacity(self.deps.len());
        for (name, entry) in &self.deps {
            let spec = entry.resolve(name).ok_or_else(|| VendoError::Manifest {
                message: format!(
                    "dependency `{name}` is missing a pinned revision \
                     (expected `url@rev` or `{{ git = ..., rev = ... }}`)"
                ),
            })?;
            specs.push(spec);
        }
        Ok(specs)
    }
}
