//! Import-path resolution: from an import path to the repository and unit
//! that define it.
//!
//! [`ImportResolver::resolve`] tries, in order:
//!
//! 1. the run's [`ResolveCache`];
//! 2. rejection of xtest (`_test`) packages;
//! 3. the local tree, through a [`BuildContext`] and [`TreeLayout`]; local
//!    targets have an empty clone URL;
//! 4. the [`default_rules`] table;
//! 5. a [`RepoRootLookup`], falling back to the import path itself.

mod cache;
mod context;
mod remote;
mod rules;

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use cache::ResolveCache;
pub(crate) use context::slash_path;
pub use context::{BuildContext, GopathContext, MapContext, TreeLayout};
#[cfg(feature = "remote")]
pub use remote::GoGetLookup;
pub use remote::{
    NoRemoteLookup, RepoRoot, RepoRootLookup, parse_go_import_meta, replace_import_path_repo_root,
};
pub use rules::{Matcher, Rewrite, Rule, default_rules};

use crate::config::GraphConfig;
use crate::error::ResolveError;

/// Unit type of every Go target.
pub const GO_PACKAGE_UNIT_TYPE: &str = "GoPackage";

/// Global coordinates of an imported package.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedTarget {
    /// Empty for packages inside the tree being graphed.
    #[serde(rename = "ToRepoCloneURL")]
    pub to_repo_clone_url: String,
    #[serde(rename = "ToUnit")]
    pub to_unit: String,
    #[serde(rename = "ToUnitType")]
    pub to_unit_type: String,
    #[serde(rename = "ToVersionString", default, skip_serializing_if = "String::is_empty")]
    pub to_version_string: String,
    #[serde(rename = "ToRevSpec", default, skip_serializing_if = "String::is_empty")]
    pub to_rev_spec: String,
}

impl ResolvedTarget {
    pub fn new(clone_url: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            to_repo_clone_url: clone_url.into(),
            to_unit: unit.into(),
            to_unit_type: GO_PACKAGE_UNIT_TYPE.to_owned(),
            ..Self::default()
        }
    }

    /// A package of the tree being graphed.
    pub fn local(unit: impl Into<String>) -> Self {
        Self::new(String::new(), unit)
    }

    #[inline]
    pub fn is_local(&self) -> bool {
        self.to_repo_clone_url.is_empty()
    }
}

/// Resolves import paths for one graph run. Safe to share across threads.
pub struct ImportResolver {
    layout: TreeLayout,
    context: Arc<dyn BuildContext>,
    remote: Arc<dyn RepoRootLookup>,
    rules: Vec<Rule>,
    cache: ResolveCache,
    go_version: String,
}

impl ImportResolver {
    pub fn new(layout: TreeLayout, context: Arc<dyn BuildContext>) -> Self {
        Self {
            layout,
            context,
            remote: Arc::new(NoRemoteLookup),
            rules: default_rules(),
            cache: ResolveCache::new(),
            go_version: String::new(),
        }
    }

    /// A filesystem-backed resolver for the tree at `root`. With the
    /// `remote` feature, unknown hosts are looked up over HTTP.
    pub fn from_config(root: &Path, config: &GraphConfig) -> Self {
        let resolver = Self::new(
            TreeLayout::from_config(root, config),
            Arc::new(GopathContext::from_config(config)),
        )
        .with_go_version(config.stdlib_version());
        #[cfg(feature = "remote")]
        let resolver = resolver.with_remote(Arc::new(GoGetLookup::default()));
        resolver
    }

    pub fn with_remote(mut self, remote: Arc<dyn RepoRootLookup>) -> Self {
        self.remote = remote;
        self
    }

    /// Version string reported for standard-library targets.
    pub fn with_go_version(mut self, go_version: impl Into<String>) -> Self {
        self.go_version = go_version.into();
        self
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    #[inline]
    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    #[inline]
    pub fn cache(&self) -> &ResolveCache {
        &self.cache
    }

    /// Coordinates of `import_path`. `Ok(None)` means the path has no
    /// target and items referring to it should be dropped.
    pub fn resolve(&self, import_path: &str) -> Result<Option<ResolvedTarget>, ResolveError> {
        if let Some(hit) = self.cache.get(import_path) {
            tracing::trace!(import_path, "resolve cache hit");
            return Ok(Some(hit));
        }
        if import_path.ends_with("_test") {
            return Err(ResolveError::XTestPackage(import_path.to_owned()));
        }

        let Some(target) = self.resolve_uncached(import_path)? else {
            return Ok(None);
        };
        Ok(Some(self.cache.insert(import_path, target)))
    }

    fn resolve_uncached(&self, import_path: &str) -> Result<Option<ResolvedTarget>, ResolveError> {
        if let Some(unit) = self.local_unit(import_path) {
            tracing::trace!(import_path, %unit, "import is local to the tree");
            return Ok(Some(ResolvedTarget::local(unit)));
        }
        if let Some(rule) = self.rules.iter().find(|rule| rule.matches(import_path)) {
            tracing::trace!(import_path, rule = rule.name, "resolved by rule");
            return rule.apply(import_path, &self.go_version);
        }
        Ok(Some(self.remote_target(import_path)))
    }

    fn local_unit(&self, import_path: &str) -> Option<String> {
        let dir = self
            .context
            .find_package_dir(import_path, self.layout.root())?;
        self.layout.unit_for(&dir, import_path)
    }

    fn remote_target(&self, import_path: &str) -> ResolvedTarget {
        match self.remote.repo_root(import_path) {
            Ok(root) => {
                let repo = root.repo.trim_end_matches('/');
                let clone_url = repo.strip_suffix(".git").unwrap_or(repo);
                ResolvedTarget::new(
                    clone_url,
                    replace_import_path_repo_root(import_path, &root.root, clone_url),
                )
            }
            Err(err) => {
                tracing::warn!(import_path, %err, "unable to find repository; using import path");
                ResolvedTarget::new(import_path, import_path)
            }
        }
    }
}

impl std::fmt::Debug for ImportResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportResolver")
            .field("layout", &self.layout)
            .field("rules", &self.rules.len())
            .field("cached", &self.cache.len())
            .field("go_version", &self.go_version)
            .finish()
    }
}
