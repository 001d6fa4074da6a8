use serde::{Deserialize, Serialize};

/// A dependency declaration in vendo.toml.
///
/// Supports both shorthand (`"host/org/repo@revision"`) and detailed forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DepEntry {
    Short(String),
    Detailed(DetailedDep),
}

/// A dependency with explicit repository URL, pinned revision, and optional
/// branch to track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedDep {
    pub git: String,
    pub rev: String,
    #[serde(default)]
    pub branch: Option<String>,
}

/// A fully resolved dependency declaration: the unit the graph builder
/// registers as a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepSpec {
    /// Unique identity key within a resolution run.
    pub name: String,
    /// Repository location without transport scheme, e.g. `github.com/org/repo`.
    pub url: String,
    /// Exact commit the source tree must be materialized to.
    pub rev: String,
    /// Branch expected to contain `rev`, if the manifest declares one.
    pub branch: Option<String>,
}

impl DepEntry {
    /// Resolve a manifest entry (keyed by `name`) into a [`DepSpec`].
    ///
    /// Shorthand entries take the form `"host/org/repo@revision"`.
    pub fn resolve(&self, name: &str) -> Option<DepSpec> {
        match self {
            DepEntry::Short(s) => {
                let (url, rev) = s.split_once('@')?;
                if url.is_empty() || rev.is_empty() {
                    return None;
                }
                Some(DepSpec {
                    name: name.to_string(),
                    url: url.to_string(),
                    rev: rev.to_string(),
                    branch: None,
                })
            }
            DepEntry::Detailed(d) => Some(DepSpec {
                name: name.to_string(),
                url: d.git.clone(),
                rev: d.rev.clone(),
                branch: d.branch.clone(),
            }),
        }
    }
}

impl std::fmt::Display for DepSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, abbrev(&self.rev))
    }
}

/// Abbreviate a revision to a short human-readable prefix for display.
pub fn abbrev(rev: &str) -> &str {
    rev.get(..7).unwrap_or(rev)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_short_entry() {
        let entry = DepEntry::Short("github.com/example/zstd@f3bc2e6".to_string());
        let spec = entry.resolve("zstd").unwrap();
        assert_eq!(spec.name, "zstd");
        assert_eq!(spec.url, "github.com/example/zstd");
        assert_eq!(spec.rev, "f3bc2e6");
        assert_eq!(spec.branch, None);
    }

    #[test]
    fn resolve_short_entry_without_rev_is_rejected() {
        let entry = DepEntry::Short("github.com/example/zstd".to_string());
        assert!(entry.resolve("zstd").is_none());
    }

    #[test]
    fn resolve_detailed_entry() {
        let entry = DepEntry::Detailed(DetailedDep {
            git: "github.com/example/boost".to_string(),
            rev: "9ae5e98".to_string(),
            branch: Some("develop".to_string()),
        });
        let spec = entry.resolve("boost").unwrap();
        assert_eq!(spec.url, "github.com/example/boost");
        assert_eq!(spec.branch.as_deref(), Some("develop"));
    }

    #[test]
    fn abbrev_short_input() {
        assert_eq!(abbrev("abc"), "abc");
        assert_eq!(abbrev("0123456789abcdef"), "0123456");
    }
}
