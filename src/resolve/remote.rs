//! Repository-root discovery for import paths no rule covers.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ResolveError;

/// The import-path prefix that names a repository, and where it is
/// cloned from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoRoot {
    pub root: String,
    pub repo: String,
}

/// Generic fallback of the resolver. May do I/O; called without any
/// lock held.
pub trait RepoRootLookup: Send + Sync {
    fn repo_root(&self, import_path: &str) -> Result<RepoRoot, ResolveError>;
}

/// Never looks anything up. Paths that reach it fall back to using the
/// import path as clone URL and unit.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoRemoteLookup;

impl RepoRootLookup for NoRemoteLookup {
    fn repo_root(&self, import_path: &str) -> Result<RepoRoot, ResolveError> {
        Err(ResolveError::Remote {
            path: import_path.to_owned(),
            message: "remote lookups are disabled".to_owned(),
        })
    }
}

static GO_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+name=["']go-import["']\s+content=["']([^"']+)["']"#).unwrap()
});

/// Find the `<meta name="go-import" content="prefix vcs repo">` tag whose
/// prefix covers `import_path`.
pub fn parse_go_import_meta(html: &str, import_path: &str) -> Option<RepoRoot> {
    GO_IMPORT.captures_iter(html).find_map(|caps| {
        let content = caps.get(1)?.as_str();
        let mut fields = content.split_whitespace();
        let (root, _vcs, repo) = (fields.next()?, fields.next()?, fields.next()?);
        let covers = import_path
            .strip_prefix(root)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
        covers.then(|| RepoRoot {
            root: root.to_owned(),
            repo: repo.to_owned(),
        })
    })
}

/// Rewrite the `root` prefix of `import_path` to the host and path of
/// `clone_url`, so units of custom-domain packages match how their
/// repository names them.
pub fn replace_import_path_repo_root(import_path: &str, root: &str, clone_url: &str) -> String {
    let Some(i) = clone_url.find("://") else {
        return import_path.to_owned();
    };
    let host_path = &clone_url[i + "://".len()..];
    let new_root = host_path.strip_suffix(".git").unwrap_or(host_path);
    import_path.replacen(root, new_root, 1)
}

#[cfg(feature = "remote")]
pub use go_get::GoGetLookup;

#[cfg(feature = "remote")]
mod go_get {
    use std::time::Duration;

    use super::{RepoRoot, RepoRootLookup, parse_go_import_meta};
    use crate::error::ResolveError;

    /// Fetches `https://<import path>?go-get=1` and reads its go-import
    /// meta tag, the way `go get` discovers custom import paths.
    #[derive(Debug)]
    pub struct GoGetLookup {
        agent: ureq::Agent,
    }

    impl GoGetLookup {
        pub fn new(timeout: Duration) -> Self {
            Self {
                agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            }
        }
    }

    impl Default for GoGetLookup {
        fn default() -> Self {
            Self::new(Duration::from_secs(10))
        }
    }

    impl RepoRootLookup for GoGetLookup {
        fn repo_root(&self, import_path: &str) -> Result<RepoRoot, ResolveError> {
            let remote = |message: String| ResolveError::Remote {
                path: import_path.to_owned(),
                message,
            };
            let url = format!("https://{import_path}?go-get=1");
            tracing::debug!(%url, "fetching go-import meta");
            let body = self
                .agent
                .get(&url)
                .call()
                .map_err(|e| remote(e.to_string()))?
                .into_string()
                .map_err(|e| remote(e.to_string()))?;
            parse_go_import_meta(&body, import_path)
                .ok_or_else(|| remote("no go-import meta tag covers the path".to_owned()))
        }
    }
}
