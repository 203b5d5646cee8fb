//! Error types.
//!
//! Failures come in three tiers. Malformed input (an object with no
//! enclosing scope, a selector with no recorded selection) is logged and
//! skipped and never becomes an `Err`. Resolution failures are per item
//! ([`ResolveError`], wrapped in [`ConvertError`] when converting).
//! Broken invariants abort the package being graphed ([`GraphError`]).

use thiserror::Error;

use crate::hir::ObjectId;

/// Fatal for the package being graphed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("package `{path}` has no files")]
    EmptyPackage { path: String },

    #[error("def key `{key}` assigned to both {first:?} and {second:?}")]
    DuplicateDefKey {
        key: String,
        first: Option<ObjectId>,
        second: ObjectId,
    },

    #[error("object `{name}` has unhandled kind `{kind}`")]
    UnhandledObjectKind { name: String, kind: &'static str },
}

/// Why an import path could not be mapped to global coordinates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("invalid import path `{path}`: {reason}")]
    InvalidImportPath { path: String, reason: &'static str },

    #[error("xtest package `{0}` cannot be resolved")]
    XTestPackage(String),

    #[error("repository root lookup for `{path}` failed: {message}")]
    Remote { path: String, message: String },
}

/// A single def, ref or doc that could not be made global.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot convert {item} `{name}`: {source}")]
pub struct ConvertError {
    pub item: &'static str,
    pub name: String,
    #[source]
    pub source: ResolveError,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GOVERSION `{0}` is not supported (valid: \"\", \"1.3\", \"1.2\", \"1.1\", \"1\")")]
    InvalidGoVersion(String),

    #[error("malformed unit config: {0}")]
    Json(#[from] serde_json::Error),
}
