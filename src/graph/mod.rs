//! Symbol graph construction for one type-checked package.
//!
//! [`Grapher`] walks a package's files and emits an [`Output`]: a [`Def`]
//! for every declaring identifier, a [`Ref`] for every identifier that
//! resolves to an object, and [`Doc`]s for documented declarations.
//! Def identity comes from [`PathAssigner`], which derives a path for
//! each object from the scopes enclosing it.

mod cache;
mod docs;
mod grapher;
mod html;
mod output;
mod paths;
mod scope_index;
mod structs;

pub use cache::{DefInfo, DefKeyCache, KeyedDef};
pub use grapher::{GraphOptions, GraphState, Grapher};
pub use html::comment_to_html;
pub use output::{BUILTIN_PACKAGE, Def, DefKey, DefKind, Doc, DocFormat, Output, Ref};
pub use paths::{DefPath, PathAssigner, ScopeLabelMode};
pub use scope_index::ScopeIndex;
