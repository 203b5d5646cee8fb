//! Where import paths live on disk.
//!
//! A [`BuildContext`] answers "which directory holds this import path",
//! and a [`TreeLayout`] answers "is that directory part of the tree being
//! graphed, and under which unit name".

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use walkdir::WalkDir;

use crate::config::GraphConfig;

/// Finds the directory of an imported package.
pub trait BuildContext: Send + Sync {
    /// Directory of `import_path` when imported from `src_dir`, or `None`
    /// if it is not on the local filesystem.
    fn find_package_dir(&self, import_path: &str, src_dir: &Path) -> Option<PathBuf>;
}

/// GOROOT and GOPATH lookup, plus `vendor/` directories above the
/// importing directory.
#[derive(Clone, Debug, Default)]
pub struct GopathContext {
    goroot: Option<PathBuf>,
    gopaths: Vec<PathBuf>,
}

impl GopathContext {
    pub fn new(goroot: Option<PathBuf>, gopaths: Vec<PathBuf>) -> Self {
        Self { goroot, gopaths }
    }

    /// The process' `GOROOT`/`GOPATH`, overridden by the config's GOROOT
    /// and extended with its GOPATH entries.
    pub fn from_config(config: &GraphConfig) -> Self {
        let goroot = config
            .goroot_dir()
            .or_else(|| std::env::var_os("GOROOT").map(PathBuf::from));
        let mut gopaths: Vec<PathBuf> = std::env::var_os("GOPATH")
            .map(|paths| std::env::split_paths(&paths).collect())
            .unwrap_or_default();
        for dir in config.gopath_dirs() {
            if !gopaths.contains(&dir) {
                gopaths.push(dir);
            }
        }
        Self::new(goroot, gopaths)
    }
}

impl BuildContext for GopathContext {
    fn find_package_dir(&self, import_path: &str, src_dir: &Path) -> Option<PathBuf> {
        let vendored = src_dir
            .ancestors()
            .map(|dir| dir.join("vendor").join(import_path));
        let roots = self
            .goroot
            .iter()
            .chain(self.gopaths.iter())
            .map(|root| root.join("src").join(import_path));
        vendored.chain(roots).find(|dir| dir.is_dir())
    }
}

/// A fixed import path → directory table.
#[derive(Clone, Debug, Default)]
pub struct MapContext {
    dirs: IndexMap<String, PathBuf>,
}

impl MapContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, import_path: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.insert(import_path, dir);
        self
    }

    pub fn insert(&mut self, import_path: impl Into<String>, dir: impl Into<PathBuf>) {
        self.dirs.insert(import_path.into(), dir.into());
    }
}

impl BuildContext for MapContext {
    fn find_package_dir(&self, import_path: &str, _src_dir: &Path) -> Option<PathBuf> {
        self.dirs.get(import_path).cloned()
    }
}

/// The tree being graphed and the vendor roots inside or beside it.
///
/// A vendor root is laid out like a GOPATH `src` directory: a package's
/// directory relative to the root is its import path.
#[derive(Clone, Debug)]
pub struct TreeLayout {
    root: PathBuf,
    vendor_roots: Vec<PathBuf>,
}

impl TreeLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            vendor_roots: Vec::new(),
        }
    }

    /// Add a vendor root; relative paths are taken from the tree root.
    pub fn with_vendor_root(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = self.root.join(dir);
        if !self.vendor_roots.contains(&dir) {
            self.vendor_roots.push(dir);
        }
        self
    }

    /// Configured vendor dirs, the `src` of every configured GOPATH
    /// entry, and whatever [`discover_vendor_roots`] finds.
    ///
    /// [`discover_vendor_roots`]: Self::discover_vendor_roots
    pub fn from_config(root: impl Into<PathBuf>, config: &GraphConfig) -> Self {
        let mut layout = Self::new(root);
        for dir in &config.vendor_dirs {
            layout = layout.with_vendor_root(dir);
        }
        for dir in config.gopath_dirs() {
            layout = layout.with_vendor_root(dir.join("src"));
        }
        for dir in Self::discover_vendor_roots(&layout.root) {
            layout = layout.with_vendor_root(dir);
        }
        layout
    }

    /// GOPATH-style vendor roots in the top levels of `root`
    /// (`vendor/src`, `Godeps/_workspace/src`).
    pub fn discover_vendor_roots(root: &Path) -> Vec<PathBuf> {
        let candidates = [Path::new("vendor/src"), Path::new("Godeps/_workspace/src")];
        WalkDir::new(root)
            .max_depth(3)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir())
            .filter(|entry| {
                entry
                    .path()
                    .strip_prefix(root)
                    .is_ok_and(|rel| candidates.contains(&rel))
            })
            .map(|entry| entry.into_path())
            .collect()
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn vendor_roots(&self) -> &[PathBuf] {
        &self.vendor_roots
    }

    /// The unit name of the package in `dir`, or `None` if `dir` is
    /// outside the tree.
    ///
    /// Vendored packages are named relative to their vendor root, so keys
    /// pointing into them match how the vendored unit was graphed.
    pub fn unit_for(&self, dir: &Path, import_path: &str) -> Option<String> {
        for vendor_root in &self.vendor_roots {
            if let Ok(rel) = dir.strip_prefix(vendor_root) {
                return Some(slash_path(rel));
            }
        }
        if !dir.starts_with(&self.root) {
            return None;
        }
        let unit = match import_path.rfind("vendor/") {
            Some(i) if i == 0 || import_path[..i].ends_with('/') => &import_path[i + "vendor/".len()..],
            _ => import_path,
        };
        Some(unit.to_owned())
    }
}

/// `rel` with `/` separators on every platform.
pub(crate) fn slash_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_for_tree_and_vendor() {
        let layout = TreeLayout::new("/src/proj").with_vendor_root("Godeps/_workspace/src");

        assert_eq!(
            layout.unit_for(Path::new("/src/proj/pkg/a"), "example.com/proj/pkg/a"),
            Some("example.com/proj/pkg/a".to_string())
        );
        assert_eq!(
            layout.unit_for(
                Path::new("/src/proj/Godeps/_workspace/src/github.com/x/y"),
                "github.com/x/y"
            ),
            Some("github.com/x/y".to_string())
        );
        assert_eq!(
            layout.unit_for(
                Path::new("/src/proj/vendor/github.com/x/y"),
                "example.com/proj/vendor/github.com/x/y"
            ),
            Some("github.com/x/y".to_string())
        );
        assert_eq!(layout.unit_for(Path::new("/elsewhere/y"), "github.com/x/y"), None);
    }

    #[test]
    fn test_vendor_segment_must_be_whole() {
        let layout = TreeLayout::new("/src/proj");
        assert_eq!(
            layout.unit_for(Path::new("/src/proj/notvendor/z"), "example.com/notvendor/z"),
            Some("example.com/notvendor/z".to_string())
        );
    }

    #[test]
    fn test_gopath_context_prefers_vendor() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let gopath = root.join("gopath");
        let tree = gopath.join("src/example.com/proj");
        std::fs::create_dir_all(tree.join("vendor/github.com/x/y")).unwrap();
        std::fs::create_dir_all(gopath.join("src/github.com/x/y")).unwrap();
        std::fs::create_dir_all(gopath.join("src/github.com/x/z")).unwrap();

        let context = GopathContext::new(None, vec![gopath.clone()]);
        assert_eq!(
            context.find_package_dir("github.com/x/y", &tree),
            Some(tree.join("vendor/github.com/x/y"))
        );
        assert_eq!(
            context.find_package_dir("github.com/x/z", &tree),
            Some(gopath.join("src/github.com/x/z"))
        );
        assert_eq!(context.find_package_dir("github.com/x/w", &tree), None);
    }

    #[test]
    fn test_discover_vendor_roots() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("Godeps/_workspace/src/github.com")).unwrap();
        std::fs::create_dir_all(tmp.path().join("cmd/tool")).unwrap();

        let roots = TreeLayout::discover_vendor_roots(tmp.path());
        assert_eq!(roots, vec![tmp.path().join("Godeps/_workspace/src")]);
    }
}
