//! The Go syntax tree the grapher consumes.
//!
//! Nothing here parses Go. A collaborator (usually a driver around the Go
//! toolchain) lowers its parse into this arena, and the grapher walks it.
//! Only the node shapes the grapher distinguishes get their own
//! [`NodeKind`] variant; everything else is [`NodeKind::Other`] with its
//! children kept in source order.

mod ast;
mod comments;
mod walk;

pub use ast::{Ast, DeclToken, Node, NodeId, NodeKind};
pub use comments::CommentGroup;
pub use walk::{Visitor, Walk, walk};
