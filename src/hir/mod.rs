//! The type-checked program the grapher consumes.
//!
//! This is the Rust-side shape of a `go/types` result: objects, types and
//! scopes live in arenas on [`Program`] and are addressed by integer ids,
//! so every map the grapher keeps is keyed by id rather than by name.
//! [`TypeInfo`] carries the per-package identifier tables (defs, uses,
//! implicits, selections, scopes) exactly as `types.Info` does.
//!
//! Collaborators construct all of this through [`ProgramBuilder`].

mod builder;
mod ids;
mod input;
mod objects;
mod program;
mod scope;
mod source;
mod types;

pub use builder::ProgramBuilder;
pub use ids::{ObjectId, PackageId, ScopeId, TypeId};
pub use input::{PackageInfo, Selection, SelectionKind, TypeInfo};
pub use objects::{Object, ObjectKind, is_exported};
pub use program::{Package, Program};
pub use scope::Scope;
pub use source::{SourceFile, SourceMap};
pub use types::{ChanDir, Type};
