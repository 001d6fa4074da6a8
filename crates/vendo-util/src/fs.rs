use std::path::{Path, PathBuf};

/// Walk up from `start` looking for a file named `filename`.
/// Returns the path to the directory containing the file, or `None`.
pub fn find_ancestor_with(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(filename);
        if candidate.is_file() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Directory under the dependency root where a named dependency is vendored.
pub fn dep_dir(deps_root: &Path, name: &str) -> PathBuf {
    deps_root.join(name)
}

/// Whether `path` looks like a materialized git work tree.
///
/// A plain directory without `.git` (e.g. a half-deleted checkout) is treated
/// as absent so the caller re-clones instead of running git against it.
pub fn is_git_work_tree(path: &Path) -> bool {
    path.join(".git").exists()
}
