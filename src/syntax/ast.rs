//! Arena-allocated Go AST.

use std::fmt;

use smol_str::SmolStr;

use super::CommentGroup;
use crate::base::{FileId, TextRange};

/// Handle for one node in an [`Ast`] arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// The keyword of a `GenDecl`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DeclToken {
    Import,
    Const,
    Type,
    Var,
}

/// Node shapes, mirroring `go/ast` for the nodes the grapher inspects.
///
/// Child fields are listed in the order `ast.Walk` visits them, which is
/// also the order [`NodeKind::children`] returns them in.
#[derive(Clone, Debug)]
pub enum NodeKind {
    File {
        name: NodeId,
        decls: Vec<NodeId>,
        doc: Option<CommentGroup>,
        /// Every comment group in the file, attached or not.
        comments: Vec<CommentGroup>,
    },
    Ident {
        name: SmolStr,
    },
    BasicLit {
        value: SmolStr,
    },
    GenDecl {
        token: DeclToken,
        specs: Vec<NodeId>,
        doc: Option<CommentGroup>,
    },
    ImportSpec {
        name: Option<NodeId>,
        path: NodeId,
        doc: Option<CommentGroup>,
        comment: Option<CommentGroup>,
    },
    ValueSpec {
        names: Vec<NodeId>,
        ty: Option<NodeId>,
        values: Vec<NodeId>,
        doc: Option<CommentGroup>,
        comment: Option<CommentGroup>,
    },
    TypeSpec {
        name: NodeId,
        ty: NodeId,
        doc: Option<CommentGroup>,
        comment: Option<CommentGroup>,
    },
    FuncDecl {
        recv: Option<NodeId>,
        name: NodeId,
        ty: NodeId,
        body: Option<NodeId>,
        doc: Option<CommentGroup>,
    },
    FuncLit {
        ty: NodeId,
        body: NodeId,
    },
    FuncType {
        params: NodeId,
        results: Option<NodeId>,
    },
    FieldList {
        fields: Vec<NodeId>,
    },
    Field {
        names: Vec<NodeId>,
        ty: NodeId,
        doc: Option<CommentGroup>,
        comment: Option<CommentGroup>,
    },
    StructType {
        fields: NodeId,
    },
    InterfaceType {
        methods: NodeId,
    },
    StarExpr {
        x: NodeId,
    },
    SelectorExpr {
        x: NodeId,
        sel: NodeId,
    },
    CompositeLit {
        ty: Option<NodeId>,
        elts: Vec<NodeId>,
    },
    BlockStmt {
        stmts: Vec<NodeId>,
    },
    DeclStmt {
        decl: NodeId,
    },
    AssignStmt {
        lhs: Vec<NodeId>,
        rhs: Vec<NodeId>,
        define: bool,
    },
    RangeStmt {
        key: Option<NodeId>,
        value: Option<NodeId>,
        x: NodeId,
        body: NodeId,
    },
    LabeledStmt {
        label: NodeId,
        stmt: NodeId,
    },
    BranchStmt {
        token: SmolStr,
        label: Option<NodeId>,
    },
    /// Any other expression or statement (`CallExpr`, `IfStmt`, ...).
    Other {
        label: SmolStr,
        children: Vec<NodeId>,
    },
}

impl NodeKind {
    /// Children in `ast.Walk` order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            NodeKind::File { name, decls, .. } => {
                out.push(*name);
                out.extend(decls);
            }
            NodeKind::Ident { .. } | NodeKind::BasicLit { .. } => {}
            NodeKind::GenDecl { specs, .. } => out.extend(specs),
            NodeKind::ImportSpec { name, path, .. } => {
                out.extend(name);
                out.push(*path);
            }
            NodeKind::ValueSpec { names, ty, values, .. } => {
                out.extend(names);
                out.extend(ty);
                out.extend(values);
            }
            NodeKind::TypeSpec { name, ty, .. } => out.extend([*name, *ty]),
            NodeKind::FuncDecl { recv, name, ty, body, .. } => {
                out.extend(recv);
                out.extend([*name, *ty]);
                out.extend(body);
            }
            NodeKind::FuncLit { ty, body } => out.extend([*ty, *body]),
            NodeKind::FuncType { params, results } => {
                out.push(*params);
                out.extend(results);
            }
            NodeKind::FieldList { fields } => out.extend(fields),
            NodeKind::Field { names, ty, .. } => {
                out.extend(names);
                out.push(*ty);
            }
            NodeKind::StructType { fields } => out.push(*fields),
            NodeKind::InterfaceType { methods } => out.push(*methods),
            NodeKind::StarExpr { x } => out.push(*x),
            NodeKind::SelectorExpr { x, sel } => out.extend([*x, *sel]),
            NodeKind::CompositeLit { ty, elts } => {
                out.extend(ty);
                out.extend(elts);
            }
            NodeKind::BlockStmt { stmts } => out.extend(stmts),
            NodeKind::DeclStmt { decl } => out.push(*decl),
            NodeKind::AssignStmt { lhs, rhs, .. } => {
                out.extend(lhs);
                out.extend(rhs);
            }
            NodeKind::RangeStmt { key, value, x, body } => {
                out.extend(key);
                out.extend(value);
                out.extend([*x, *body]);
            }
            NodeKind::LabeledStmt { label, stmt } => out.extend([*label, *stmt]),
            NodeKind::BranchStmt { label, .. } => out.extend(label),
            NodeKind::Other { children, .. } => out.extend(children),
        }
        out
    }

    /// The `go/ast` type name of this node, for logs.
    pub fn name(&self) -> &str {
        match self {
            NodeKind::File { .. } => "File",
            NodeKind::Ident { .. } => "Ident",
            NodeKind::BasicLit { .. } => "BasicLit",
            NodeKind::GenDecl { .. } => "GenDecl",
            NodeKind::ImportSpec { .. } => "ImportSpec",
            NodeKind::ValueSpec { .. } => "ValueSpec",
            NodeKind::TypeSpec { .. } => "TypeSpec",
            NodeKind::FuncDecl { .. } => "FuncDecl",
            NodeKind::FuncLit { .. } => "FuncLit",
            NodeKind::FuncType { .. } => "FuncType",
            NodeKind::FieldList { .. } => "FieldList",
            NodeKind::Field { .. } => "Field",
            NodeKind::StructType { .. } => "StructType",
            NodeKind::InterfaceType { .. } => "InterfaceType",
            NodeKind::StarExpr { .. } => "StarExpr",
            NodeKind::SelectorExpr { .. } => "SelectorExpr",
            NodeKind::CompositeLit { .. } => "CompositeLit",
            NodeKind::BlockStmt { .. } => "BlockStmt",
            NodeKind::DeclStmt { .. } => "DeclStmt",
            NodeKind::AssignStmt { .. } => "AssignStmt",
            NodeKind::RangeStmt { .. } => "RangeStmt",
            NodeKind::LabeledStmt { .. } => "LabeledStmt",
            NodeKind::BranchStmt { .. } => "BranchStmt",
            NodeKind::Other { label, .. } => label.as_str(),
        }
    }
}

/// One arena slot.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub file: FileId,
    pub range: TextRange,
    pub parent: Option<NodeId>,
}

/// The node arena for every file of a program.
///
/// Nodes are allocated bottom-up: a parent is allocated after its
/// children, and allocating it links each child back to it.
#[derive(Clone, Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node and adopt its children.
    pub fn alloc(&mut self, file: FileId, range: TextRange, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        for child in kind.children() {
            if let Some(slot) = self.nodes.get_mut(child.index()) {
                slot.parent = Some(id);
            }
        }
        self.nodes.push(Node {
            kind,
            file,
            range,
            parent: None,
        });
        id
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    #[inline]
    pub fn file(&self, id: NodeId) -> FileId {
        self.node(id).file
    }

    #[inline]
    pub fn range(&self, id: NodeId) -> TextRange {
        self.node(id).range
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    /// The name of an `Ident` node, `None` for any other node.
    pub fn ident_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Ident { name } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Ancestors of `id`, innermost first, not including `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&n| self.parent(n))
    }

    /// `root` and all nodes below it, in pre-order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut children = self.children(id);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::new(i as u32), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
