/// Transport used to materialize clone URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// Authenticated transport: `git@host:path.git`.
    #[default]
    Ssh,
    /// Anonymous transport: `https://host/path.git`.
    Https,
}

/// Rewrite a manifest repository location into a cloneable URL.
///
/// Manifests declare repositories without a transport scheme
/// (`github.com/org/repo`); the protocol toggle decides how they are cloned.
/// Inputs that already carry a scheme, an `git@` remote, or a local
/// filesystem path are passed through untouched so tests and mirrors can
/// point at local repositories.
pub fn clone_url(raw: &str, protocol: Protocol) -> String {
    if raw.contains("://") || raw.starts_with("git@") || raw.starts_with('/') || raw.starts_with('.')
    {
        return raw.to_string();
    }

    let trimmed = raw.trim_end_matches('/');
    let suffix = if trimmed.ends_with(".git") { "" } else { ".git" };
    match protocol {
        Protocol::Ssh => match trimmed.split_once('/') {
            Some((host, path)) => format!("git@{host}:{path}{suffix}"),
            None => trimmed.to_string(),
        },
        Protocol::Https => format!("https://{trimmed}{suffix}"),
    }
}
