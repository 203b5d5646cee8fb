//! # gograph-base
//!
//! Core library for building symbol graphs of type-checked Go packages and
//! resolving their imports to global coordinates.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! session   → one graph run: owns the caches, graphs packages in parallel
//!   ↓
//! globalize → package-local defs/refs/docs to globally keyed records
//!   ↓
//! graph     → scope indexing, path assignment, def/ref/doc emission
//! resolve   → import path → (repository, unit)
//!   ↓
//! hir       → type-checked program: objects, types, scopes, per-package info
//! syntax    → Go syntax tree arena and walker
//!   ↓
//! base      → Primitives (FileId, Pos, Span)
//! ```
//!
//! Parsing and type checking happen elsewhere. Collaborators lower their
//! results into [`hir::Program`] with [`hir::ProgramBuilder`], then run a
//! [`GraphSession`] over it.

// ============================================================================
// FOUNDATION
// ============================================================================

/// Foundation types: FileId, Pos, Span
pub mod base;

/// Go syntax tree consumed by the grapher
pub mod syntax;

/// Type-checked program: objects, types, scopes and per-package tables
pub mod hir;

// ============================================================================
// GRAPHING
// ============================================================================

pub mod config;
pub mod error;
pub mod globalize;
pub mod graph;
pub mod resolve;
pub mod session;

// Re-export commonly needed items
pub use config::GraphConfig;
pub use error::{ConfigError, ConvertError, GraphError, ResolveError};
pub use globalize::{GlobalOutput, ItemPolicy};
pub use graph::{Def, DefKey, DefKind, Doc, DocFormat, GraphOptions, Output, Ref};
pub use resolve::{ImportResolver, ResolvedTarget};
pub use session::GraphSession;

// Re-export foundation types
pub use base::{FileId, Pos, Span, TextRange, TextSize};
