//! Shared helpers for building checked programs in integration tests.

#![allow(dead_code)]

use gograph::base::{FileId, Span, TextRange, TextSize};
use gograph::error::GraphError;
use gograph::graph::{DefKeyCache, GraphOptions, Grapher, Output};
use gograph::hir::{
    Object, ObjectId, ObjectKind, PackageId, PackageInfo, Program, ProgramBuilder, ScopeId,
    TypeId,
};
use gograph::syntax::{CommentGroup, NodeId, NodeKind};

/// One package with one file, built up node by node.
pub struct Fixture {
    pub b: ProgramBuilder,
    pub pkg: PackageId,
    pub file: FileId,
}

impl Fixture {
    pub fn new(import_path: &str, pkg_name: &str, file_name: &str, src: &str) -> Self {
        let mut b = ProgramBuilder::new();
        let pkg = b.package(import_path, pkg_name);
        let file = b.file(pkg, file_name, src);
        Self { b, pkg, file }
    }

    pub fn pkg_scope(&self) -> ScopeId {
        self.b.package_scope(self.pkg)
    }

    pub fn file_scope(&self) -> ScopeId {
        self.b.file_scope(self.file)
    }

    /// An object of this package positioned at the `nth` occurrence of
    /// its name, bound in `scope` when given.
    pub fn object(
        &mut self,
        name: &str,
        nth: usize,
        kind: ObjectKind,
        ty: Option<TypeId>,
        scope: Option<ScopeId>,
    ) -> ObjectId {
        let mut obj = Object::new(name, kind)
            .in_package(self.pkg)
            .at(self.b.pos(self.file, name, nth));
        if let Some(ty) = ty {
            obj = obj.typed(ty);
        }
        let obj = self.b.object(obj);
        if let Some(scope) = scope {
            self.b.declare(scope, obj);
        }
        obj
    }

    pub fn var(&mut self, name: &str, nth: usize, ty: TypeId, scope: ScopeId) -> ObjectId {
        self.object(name, nth, ObjectKind::Var, Some(ty), Some(scope))
    }

    pub fn field(&mut self, name: &str, nth: usize, ty: TypeId) -> ObjectId {
        self.object(name, nth, ObjectKind::Field { embedded: false }, Some(ty), None)
    }

    pub fn def(&mut self, name: &str, nth: usize, obj: ObjectId) -> NodeId {
        self.b.def_ident(self.file, name, nth, obj)
    }

    pub fn use_(&mut self, name: &str, nth: usize, obj: ObjectId) -> NodeId {
        self.b.use_ident(self.file, name, nth, obj)
    }

    pub fn ident(&mut self, name: &str, nth: usize) -> NodeId {
        self.b.ident(self.file, name, nth)
    }

    pub fn wrap(&mut self, kind: NodeKind) -> NodeId {
        self.b.wrap(kind)
    }

    /// A node spanning the `nth` occurrence of `needle`.
    pub fn node_at(&mut self, needle: &str, nth: usize, kind: NodeKind) -> NodeId {
        let range = self.b.find(self.file, needle, nth);
        self.b.node(self.file, range, kind)
    }

    /// `func name() {...}` declaring its own scope; returns the decl.
    ///
    /// The func type runs from the `func` keyword to the end of the
    /// parameters, so the function's scope node encloses its name.
    pub fn func_decl(
        &mut self,
        name_ident: NodeId,
        func_scope: ScopeId,
        params_at: (&str, usize),
        stmts: Vec<NodeId>,
        doc: Option<CommentGroup>,
    ) -> NodeId {
        let params = self.node_at(params_at.0, params_at.1, NodeKind::FieldList { fields: vec![] });
        let ast = self.b.program().ast();
        let name_start = ast.range(name_ident).start();
        let params_end = ast.range(params).end();
        let src = self.b.program().sources().text(self.file);
        let func_start = src[..u32::from(name_start) as usize]
            .rfind("func")
            .map_or(name_start, |i| TextSize::from(i as u32));
        let func_type = self.b.node(
            self.file,
            TextRange::new(func_start, params_end),
            NodeKind::FuncType {
                params,
                results: None,
            },
        );
        self.b.scope_node(func_type, func_scope);
        let body = if stmts.is_empty() {
            let end = self.b.program().ast().range(func_type).end();
            let range = TextRange::new(end, end);
            self.b.node(self.file, range, NodeKind::BlockStmt { stmts })
        } else {
            self.wrap(NodeKind::BlockStmt { stmts })
        };
        self.wrap(NodeKind::FuncDecl {
            recv: None,
            name: name_ident,
            ty: func_type,
            body: Some(body),
            doc,
        })
    }

    /// `var <name> <ty>` as a statement.
    pub fn var_stmt(&mut self, name: NodeId, ty: NodeId) -> NodeId {
        let spec = self.wrap(NodeKind::ValueSpec {
            names: vec![name],
            ty: Some(ty),
            values: vec![],
            doc: None,
            comment: None,
        });
        let decl = self.wrap(NodeKind::GenDecl {
            token: gograph::syntax::DeclToken::Var,
            specs: vec![spec],
            doc: None,
        });
        self.wrap(NodeKind::DeclStmt { decl })
    }

    /// `_ = <expr>`.
    pub fn blank_assign(&mut self, blank_nth: usize, expr: NodeId) -> NodeId {
        let blank = self.ident("_", blank_nth);
        self.wrap(NodeKind::AssignStmt {
            lhs: vec![blank],
            rhs: vec![expr],
            define: false,
        })
    }

    pub fn comment(&self, text: &str, nth: usize) -> CommentGroup {
        self.b.comment(self.file, text, nth)
    }

    pub fn span(&self, needle: &str, nth: usize) -> Span {
        self.b.find(self.file, needle, nth).into()
    }

    pub fn finish(
        mut self,
        decls: Vec<NodeId>,
        doc: Option<CommentGroup>,
        comments: Vec<CommentGroup>,
    ) -> (Program, Vec<PackageInfo>) {
        let name = self.package_name_ident();
        self.b.finish_file(self.file, name, decls, doc, comments);
        self.b.build()
    }

    fn package_name_ident(&mut self) -> NodeId {
        let src = self.b.program().sources().text(self.file);
        let start = src.find("package ").map_or(0, |i| i + "package ".len());
        let len = src[start..]
            .find(|c: char| c.is_whitespace())
            .unwrap_or(src.len() - start);
        let name = src[start..start + len].to_owned();
        let range = TextRange::new(
            TextSize::from(start as u32),
            TextSize::from((start + len) as u32),
        );
        self.b
            .node(self.file, range, NodeKind::Ident { name: name.into() })
    }
}

pub fn try_graph(program: &Program, info: &PackageInfo) -> Result<Output, GraphError> {
    let cache = DefKeyCache::new();
    Grapher::new(program, info, &cache, GraphOptions::default()).graph()
}

pub fn graph(program: &Program, info: &PackageInfo) -> Output {
    try_graph(program, info).expect("package should graph")
}

/// Key path of the def the single ref at `span` points to.
pub fn ref_path(output: &Output, file: &str, span: Span) -> Vec<String> {
    let refs: Vec<_> = output.refs_at(file, span).collect();
    assert_eq!(refs.len(), 1, "expected one ref at {span:?}, got {refs:?}");
    refs[0].def.path.clone()
}
