//! The ordered rule table for import paths that need no lookup.
//!
//! Rules are tried in order and the first whose matcher accepts the path
//! decides the result, including the decision that a path has no target.

use super::ResolvedTarget;
use crate::error::ResolveError;

const GO_REPO: &str = "https://github.com/golang/go";

/// First elements of the Go repository's packages, `cmd` included.
/// `builtin` is where universe objects are keyed.
const STDLIB_ROOTS: &[&str] = &[
    "archive", "bufio", "builtin", "bytes", "cmd", "compress", "container", "context", "crypto",
    "database", "debug", "embed", "encoding", "errors", "expvar", "flag", "fmt", "go", "hash",
    "html", "image", "index", "internal", "io", "iter", "log", "maps", "math", "mime", "net",
    "os", "path", "plugin", "reflect", "regexp", "runtime", "slices", "sort", "strconv",
    "strings", "sync", "syscall", "testing", "text", "time", "unicode", "unique", "unsafe",
    "weak",
];

/// Which import paths a rule applies to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Matcher {
    /// Exactly this path.
    Exact(&'static str),
    /// This path or anything below it.
    Root(&'static str),
    /// Standard library: the first element is a Go repository root.
    Stdlib,
}

impl Matcher {
    pub fn matches(self, import_path: &str) -> bool {
        match self {
            Matcher::Exact(path) => import_path == path,
            Matcher::Root(root) => has_root(import_path, root),
            Matcher::Stdlib => {
                let first = import_path.split('/').next().unwrap_or_default();
                STDLIB_ROOTS.contains(&first)
            }
        }
    }
}

/// How a matched path becomes a target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rewrite {
    /// Resolves to nothing; callers drop the item.
    NoTarget,
    /// The Go repository at the configured version.
    Stdlib,
    /// `host/owner/repo/...` clones from `https://host/owner/repo`.
    HostRepo,
    /// The matched root moved to `to`, which is also the repository.
    Alias { to: &'static str },
    /// `root/<repo>/...` moved to `to/<repo>/...`.
    RepoAlias { to: &'static str },
    /// `gopkg.in/pkg.vN` or `gopkg.in/user/pkg.vN`.
    GopkgIn,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub name: &'static str,
    pub matcher: Matcher,
    pub rewrite: Rewrite,
}

impl Rule {
    pub const fn new(name: &'static str, matcher: Matcher, rewrite: Rewrite) -> Self {
        Self {
            name,
            matcher,
            rewrite,
        }
    }

    #[inline]
    pub fn matches(&self, import_path: &str) -> bool {
        self.matcher.matches(import_path)
    }

    /// Apply the rewrite to a path this rule matched. `Ok(None)` means no
    /// target.
    pub fn apply(
        &self,
        import_path: &str,
        go_version: &str,
    ) -> Result<Option<ResolvedTarget>, ResolveError> {
        let target = match self.rewrite {
            Rewrite::NoTarget => return Ok(None),
            Rewrite::Stdlib => {
                let mut target = ResolvedTarget::new(GO_REPO, import_path);
                target.to_version_string = go_version.to_owned();
                target
            }
            Rewrite::HostRepo => {
                let parts: Vec<&str> = import_path.splitn(4, '/').collect();
                if parts.len() < 3 {
                    return Err(invalid(import_path, "expected host/owner/repo"));
                }
                ResolvedTarget::new(format!("https://{}", parts[..3].join("/")), import_path)
            }
            Rewrite::Alias { to } => {
                let root = self.root();
                ResolvedTarget::new(format!("https://{to}"), import_path.replacen(root, to, 1))
            }
            Rewrite::RepoAlias { to } => {
                let root = self.root();
                let rest = import_path[root.len()..].trim_start_matches('/');
                let repo = rest.split('/').next().unwrap_or_default();
                if repo.is_empty() {
                    return Err(invalid(import_path, "expected a repository after the host"));
                }
                ResolvedTarget::new(
                    format!("https://{to}/{repo}"),
                    format!("{to}/{rest}"),
                )
            }
            Rewrite::GopkgIn => {
                let repo = gopkg_in_repo(import_path)
                    .ok_or_else(|| invalid(import_path, "expected gopkg.in/[user/]pkg.vN"))?;
                ResolvedTarget::new(format!("https://{repo}"), import_path)
            }
        };
        Ok(Some(target))
    }

    fn root(&self) -> &'static str {
        match self.matcher {
            Matcher::Exact(path) | Matcher::Root(path) => path,
            Matcher::Stdlib => "",
        }
    }
}

/// The rules every resolver starts with.
pub fn default_rules() -> Vec<Rule> {
    use Matcher::*;
    use Rewrite::*;
    vec![
        // cgo's pseudo-package
        Rule::new("cgo", Exact("C"), NoTarget),
        Rule::new("stdlib", Matcher::Stdlib, Rewrite::Stdlib),
        Rule::new("github", Root("github.com"), HostRepo),
        Rule::new("bitbucket", Root("bitbucket.org"), HostRepo),
        Rule::new(
            "grpc",
            Root("google.golang.org/grpc"),
            Alias {
                to: "github.com/grpc/grpc-go",
            },
        ),
        Rule::new(
            "gcloud",
            Root("cloud.google.com/go"),
            Alias {
                to: "github.com/GoogleCloudPlatform/gcloud-golang",
            },
        ),
        Rule::new(
            "gcloud-legacy",
            Root("google.golang.org/cloud"),
            Alias {
                to: "github.com/GoogleCloudPlatform/gcloud-golang",
            },
        ),
        Rule::new(
            "google-api",
            Root("google.golang.org/api"),
            Alias {
                to: "github.com/google/google-api-go-client",
            },
        ),
        Rule::new(
            "appengine",
            Root("google.golang.org/appengine"),
            Alias {
                to: "github.com/golang/appengine",
            },
        ),
        Rule::new("code-google", Root("code.google.com/p"), HostRepo),
        Rule::new(
            "golang-x",
            Root("golang.org/x"),
            RepoAlias {
                to: "github.com/golang",
            },
        ),
        Rule::new(
            "kubernetes",
            Root("k8s.io"),
            RepoAlias {
                to: "github.com/kubernetes",
            },
        ),
        Rule::new(
            "sourcegraph",
            Root("sourcegraph.com/sourcegraph"),
            RepoAlias {
                to: "github.com/sourcegraph",
            },
        ),
        Rule::new("gopkg-in", Root("gopkg.in"), GopkgIn),
    ]
}

fn has_root(import_path: &str, root: &str) -> bool {
    import_path
        .strip_prefix(root)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// `gopkg.in/pkg.v3/sub` → `gopkg.in/pkg.v3`,
/// `gopkg.in/user/pkg.v2` → `gopkg.in/user/pkg.v2`.
fn gopkg_in_repo(import_path: &str) -> Option<String> {
    let mut elems = import_path.split('/').skip(1);
    let first = elems.next()?;
    if is_versioned(first) {
        return Some(format!("gopkg.in/{first}"));
    }
    let second = elems.next()?;
    is_versioned(second).then(|| format!("gopkg.in/{first}/{second}"))
}

fn is_versioned(elem: &str) -> bool {
    elem.rsplit_once(".v").is_some_and(|(name, version)| {
        !name.is_empty() && !version.is_empty() && version.bytes().all(|b| b.is_ascii_digit())
    })
}

fn invalid(import_path: &str, reason: &'static str) -> ResolveError {
    ResolveError::InvalidImportPath {
        path: import_path.to_owned(),
        reason,
    }
}
