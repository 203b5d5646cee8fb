//! Pre-order traversal with per-node descend control.

use super::{Ast, NodeId};

/// What [`walk`] does after visiting a node.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Walk {
    /// Continue into the node's children.
    Children,
    /// The visitor handled the subtree itself (or wants it ignored).
    Skip,
}

pub trait Visitor {
    fn visit(&mut self, ast: &Ast, node: NodeId) -> Walk;
}

/// Visit `node` and, unless the visitor says [`Walk::Skip`], its children.
///
/// A visitor that skips may still call `walk` on selected children, which
/// is how partial traversals (label statements, struct type specs) are
/// expressed.
pub fn walk<V: Visitor + ?Sized>(visitor: &mut V, ast: &Ast, node: NodeId) {
    if visitor.visit(ast, node) == Walk::Children {
        for child in ast.children(node) {
            walk(visitor, ast, child);
        }
    }
}
