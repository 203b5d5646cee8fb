//! Per-unit configuration.
//!
//! A unit's JSON `Config` map deserializes into [`GraphConfig`];
//! [`GraphConfig::apply`] then validates it and normalizes its paths
//! against the tree root.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::graph::{GraphOptions, ScopeLabelMode};

/// GOVERSION values the toolchain knows how to run.
pub const VALID_GO_VERSIONS: &[&str] = &["", "1.3", "1.2", "1.1", "1"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Go root for the filesystem build context.
    #[serde(rename = "GOROOT")]
    pub goroot: String,
    /// Colon-separated GOPATH entries added to the process' GOPATH.
    #[serde(rename = "GOPATH")]
    pub gopath: String,
    #[serde(rename = "GOVERSION")]
    pub go_version: String,
    #[serde(rename = "IncludeDocs")]
    pub include_docs: bool,
    #[serde(rename = "ScopeLabels")]
    pub scope_labels: ScopeLabelMode,
    /// Extra vendor roots, relative to the tree root.
    #[serde(rename = "VendorDirs")]
    pub vendor_dirs: Vec<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            goroot: String::new(),
            gopath: String::new(),
            go_version: String::new(),
            include_docs: true,
            scope_labels: ScopeLabelMode::default(),
            vendor_dirs: Vec::new(),
        }
    }
}

impl GraphConfig {
    /// Read a unit's `Config` value; `null` yields the defaults.
    pub fn from_unit_config(config: &serde_json::Value) -> Result<Self, ConfigError> {
        if config.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(config.clone())?)
    }

    /// Validate GOVERSION and make GOROOT and GOPATH absolute under
    /// `root`, de-duplicating GOPATH entries.
    pub fn apply(mut self, root: &Path) -> Result<Self, ConfigError> {
        if !VALID_GO_VERSIONS.contains(&self.go_version.as_str()) {
            return Err(ConfigError::InvalidGoVersion(self.go_version));
        }
        if !self.goroot.is_empty() {
            self.goroot = absolutize(root, &self.goroot).to_string_lossy().into_owned();
        }
        if !self.gopath.is_empty() {
            let mut dirs: Vec<String> = Vec::new();
            for dir in self.gopath.split(':').filter(|d| !d.is_empty()) {
                let dir = absolutize(root, dir).to_string_lossy().into_owned();
                if !dirs.contains(&dir) {
                    dirs.push(dir);
                }
            }
            self.gopath = dirs.join(":");
        }
        tracing::debug!(goroot = %self.goroot, gopath = %self.gopath, go_version = %self.go_version, "applied config");
        Ok(self)
    }

    pub fn goroot_dir(&self) -> Option<PathBuf> {
        (!self.goroot.is_empty()).then(|| PathBuf::from(&self.goroot))
    }

    pub fn gopath_dirs(&self) -> Vec<PathBuf> {
        self.gopath
            .split(':')
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .collect()
    }

    /// `go<GOVERSION>`, or empty when no version is configured.
    pub fn stdlib_version(&self) -> String {
        if self.go_version.is_empty() {
            String::new()
        } else {
            format!("go{}", self.go_version)
        }
    }

    pub fn graph_options(&self) -> GraphOptions {
        GraphOptions {
            include_docs: self.include_docs,
            scope_labels: self.scope_labels,
        }
    }
}

/// `path` joined onto `root` if relative, with `.` and `..` resolved
/// lexically.
fn absolutize(root: &Path, path: &str) -> PathBuf {
    let joined = root.join(path);
    let mut clean = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                clean.pop();
            }
            other => clean.push(other),
        }
    }
    clean
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_from_null_and_empty() {
        let config = GraphConfig::from_unit_config(&serde_json::Value::Null).unwrap();
        assert!(config.include_docs);
        assert_eq!(config.scope_labels, ScopeLabelMode::Deterministic);
        assert_eq!(GraphConfig::from_unit_config(&json!({})).unwrap(), config);
    }

    #[test]
    fn test_keys_and_normalization() {
        let config = GraphConfig::from_unit_config(&json!({
            "GOROOT": "go/../goroot",
            "GOPATH": "deps:/abs/gopath:deps",
            "GOVERSION": "1.3",
            "IncludeDocs": false,
            "ScopeLabels": "Random",
            "VendorDirs": ["third_party"]
        }))
        .unwrap()
        .apply(Path::new("/tree"))
        .unwrap();

        assert_eq!(config.goroot, "/tree/goroot");
        assert_eq!(config.gopath, "/tree/deps:/abs/gopath");
        assert_eq!(
            config.gopath_dirs(),
            vec![PathBuf::from("/tree/deps"), PathBuf::from("/abs/gopath")]
        );
        assert_eq!(config.stdlib_version(), "go1.3");
        let options = config.graph_options();
        assert!(!options.include_docs);
        assert_eq!(options.scope_labels, ScopeLabelMode::Random);
        assert_eq!(config.vendor_dirs, vec!["third_party".to_string()]);
    }

    #[test]
    fn test_invalid_go_version() {
        let config = GraphConfig {
            go_version: "1.4".into(),
            ..GraphConfig::default()
        };
        assert!(matches!(
            config.apply(Path::new("/tree")),
            Err(ConfigError::InvalidGoVersion(v)) if v == "1.4"
        ));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let err = GraphConfig::from_unit_config(&json!({ "IncludeDocs": "yes" })).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert_eq!(GraphConfig::default().stdlib_version(), "");
    }
}
