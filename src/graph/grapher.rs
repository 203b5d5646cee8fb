//! The per-package graph builder.
//!
//! A [`Grapher`] is created for one package, runs once and is consumed:
//!
//! ```text
//! Init ──> Scanning ──> Emitting ──> Done
//!  │          │             │
//!  │          │             └─ walk every file; defs, refs, then docs
//!  │          └─ index scopes, assign paths
//!  └─ reject packages without files
//! ```

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::cache::{DefInfo, DefKeyCache, KeyedDef};
use super::paths::{PathAssigner, ScopeLabelMode};
use super::structs::declaring_receiver;
use super::{Def, DefKey, DefKind, Output, Ref};
use crate::base::{FileId, Span};
use crate::error::GraphError;
use crate::hir::{ObjectId, ObjectKind, PackageInfo, Program, Type, TypeId};
use crate::syntax::{Ast, NodeId, NodeKind, Visitor, Walk, walk};

/// Knobs for one graph run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GraphOptions {
    pub include_docs: bool,
    pub scope_labels: ScopeLabelMode,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            include_docs: true,
            scope_labels: ScopeLabelMode::Deterministic,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GraphState {
    Init,
    Scanning,
    Emitting,
    Done,
}

/// Builds the [`Output`] of one package.
pub struct Grapher<'a> {
    pub(super) program: &'a Program,
    pub(super) pkg: &'a PackageInfo,
    def_keys: &'a DefKeyCache,
    options: GraphOptions,
    state: GraphState,
    pub(super) paths: PathAssigner<'a>,
    /// Struct type each field object was last selected through.
    sel_recvs: FxHashMap<ObjectId, TypeId>,
    /// Named struct whose fields are being declared.
    struct_name: Option<SmolStr>,
    pub(super) output: Output,
    /// Def key string → object that claimed it (`None` for the package).
    emitted: FxHashMap<String, Option<ObjectId>>,
    implicit_spans: FxHashSet<(FileId, Span)>,
    fatal: Option<GraphError>,
}

impl<'a> Grapher<'a> {
    pub fn new(
        program: &'a Program,
        pkg: &'a PackageInfo,
        def_keys: &'a DefKeyCache,
        options: GraphOptions,
    ) -> Self {
        Self {
            program,
            pkg,
            def_keys,
            options,
            state: GraphState::Init,
            paths: PathAssigner::new(program, pkg, options.scope_labels),
            sel_recvs: FxHashMap::default(),
            struct_name: None,
            output: Output::default(),
            emitted: FxHashMap::default(),
            implicit_spans: FxHashSet::default(),
            fatal: None,
        }
    }

    #[inline]
    pub fn state(&self) -> GraphState {
        self.state
    }

    /// Import path of the package being graphed.
    pub(super) fn unit(&self) -> &'a str {
        &self.program.package(self.pkg.pkg).path
    }

    fn transition(&mut self, next: GraphState) {
        tracing::debug!(pkg = self.unit(), from = ?self.state, to = ?next, "grapher state");
        self.state = next;
    }

    /// Run all stages and return the package's graph.
    pub fn graph(mut self) -> Result<Output, GraphError> {
        if self.pkg.files.is_empty() {
            tracing::warn!(pkg = self.unit(), "package has no files");
            return Err(GraphError::EmptyPackage {
                path: self.unit().to_owned(),
            });
        }

        self.transition(GraphState::Scanning);
        self.paths.assign_package();

        self.transition(GraphState::Emitting);
        self.emit_package_def();
        let (program, pkg) = (self.program, self.pkg);
        for &file in &pkg.files {
            walk(&mut self, program.ast(), file);
            if let Some(err) = self.fatal.take() {
                return Err(err);
            }
        }
        if self.options.include_docs {
            self.emit_docs();
        }

        self.transition(GraphState::Done);
        tracing::debug!(
            pkg = self.unit(),
            defs = self.output.defs.len(),
            refs = self.output.refs.len(),
            docs = self.output.docs.len(),
            "graphed package"
        );
        Ok(self.output)
    }

    fn fail(&mut self, err: GraphError) {
        tracing::error!(pkg = self.unit(), %err, "aborting package");
        self.fatal.get_or_insert(err);
    }

    // ========================================================================
    // DEF KEYS
    // ========================================================================

    /// Key and visibility of `obj`, cached across the run.
    pub(super) fn def_info(&self, obj: ObjectId) -> Option<Arc<KeyedDef>> {
        let cache = self.def_keys;
        cache.get_or_compute(self.pkg.pkg, obj, || self.make_def_info(obj))
    }

    fn make_def_info(&self, obj: ObjectId) -> Option<KeyedDef> {
        let program = self.program;
        let object = program.object(obj);
        let builtin = |name: &str| KeyedDef {
            key: DefKey::builtin(name),
            info: DefInfo {
                exported: true,
                pkg_scope: false,
            },
        };

        match &object.kind {
            ObjectKind::Builtin => return Some(builtin(&object.name)),
            ObjectKind::Nil => return Some(builtin("nil")),
            ObjectKind::TypeName => {
                let basic = object
                    .ty
                    .is_some_and(|ty| matches!(program.ty(ty), Type::Basic { .. }));
                if basic || (object.pkg.is_none() && object.name == "error") {
                    return Some(builtin(&object.name));
                }
            }
            ObjectKind::Package { imported } => {
                return Some(KeyedDef {
                    key: DefKey::package(program.package(*imported).path.as_str()),
                    info: DefInfo {
                        exported: true,
                        pkg_scope: false,
                    },
                });
            }
            _ => {}
        }
        let Some(pkg) = object.pkg else {
            return Some(builtin(&object.name));
        };

        let mut path = self.object_path(obj)?;
        let package = program.package(pkg);
        if package.name == "main" {
            // several main packages can share an import path
            if let Some(pos) = object.pos {
                path.insert(0, program.sources().base_name(pos.file).to_owned());
            }
        }

        let exported = self.paths.exported(obj).unwrap_or_else(|| {
            object.is_exported() && object.parent.is_none_or(|parent| parent == package.scope)
        });
        Some(KeyedDef {
            key: DefKey::new(package.path.as_str(), path),
            info: DefInfo {
                exported,
                pkg_scope: self.paths.pkg_scope(obj).unwrap_or(false),
            },
        })
    }

    /// Full path for objects of this package; a short one for others,
    /// whose own graph already placed them.
    fn object_path(&self, obj: ObjectId) -> Option<Vec<String>> {
        let program = self.program;
        let object = program.object(obj);
        if object.pkg == Some(self.pkg.pkg) {
            return self.paths.local_path(obj);
        }

        let name = object.name.to_string();
        let owner = match object.kind {
            ObjectKind::Func { .. } => program
                .method_receiver(obj)
                .and_then(|recv| program.object(recv).ty),
            ObjectKind::Field { .. } => self.sel_recvs.get(&obj).copied(),
            _ => None,
        };
        let owner_name = owner.and_then(|ty| match program.ty(program.deref(ty)) {
            Type::Named { obj, .. } => Some(program.object(*obj).name.to_string()),
            _ => None,
        });
        Some(match owner_name {
            Some(owner) => vec![owner, name],
            None => vec![name],
        })
    }

    // ========================================================================
    // EMISSION
    // ========================================================================

    fn emit_package_def(&mut self) {
        let program = self.program;
        let package = program.package(self.pkg.pkg);
        let first_file = self.pkg.files[0];
        let key = DefKey::package(package.path.as_str());
        self.emitted.insert(key.to_string(), None);
        self.output.defs.push(Def {
            name: package.name.to_string(),
            def_key: key,
            file: program.sources().dir(program.ast().file(first_file)),
            ident_span: Span::default(),
            decl_span: Span::default(),
            exported: true,
            package_scope: false,
            kind: DefKind::Package,
            receiver: None,
            field_of_struct: None,
            type_string: String::new(),
            underlying_type_string: String::new(),
        });
    }

    fn emit_ref(&mut self, node: NodeId, obj: ObjectId, is_def: bool) {
        let Some(entry) = self.def_info(obj) else {
            tracing::warn!(name = %self.program.object(obj).name, "no def key; dropping ref");
            return;
        };
        let program = self.program;
        let ast = program.ast();
        self.output.refs.push(Ref {
            unit: self.unit().to_owned(),
            file: self.file_name(ast.file(node)),
            span: ast.range(node).into(),
            def: entry.key.clone(),
            is_def,
        });
    }

    /// Emit the def `name` declares, if it declares one.
    fn new_def(&mut self, decl: NodeId, name: NodeId) {
        let program = self.program;
        let ast = program.ast();
        match ast.ident_name(name) {
            Some(ident) if ident != "_" => {}
            _ => return,
        }
        let Some(&obj) = self.pkg.info.defs.get(&name) else {
            return;
        };
        let object = program.object(obj);
        let kind = match def_kind(program, obj) {
            Ok(Some(kind)) => kind,
            // import names are refs only
            Ok(None) => return,
            Err(err) => return self.fail(err),
        };
        let Some(entry) = self.def_info(obj) else {
            tracing::warn!(name = %object.name, "no def key; dropping def");
            return;
        };

        let key_string = entry.key.to_string();
        match self.emitted.get(&key_string) {
            Some(&Some(prev)) if prev == obj => return,
            Some(&prev) => {
                return self.fail(GraphError::DuplicateDefKey {
                    key: key_string,
                    first: prev,
                    second: obj,
                });
            }
            None => {
                self.emitted.insert(key_string, Some(obj));
            }
        }

        let unit = self.unit();
        let receiver = program
            .method_receiver(obj)
            .and_then(|recv| program.object(recv).ty)
            .map(|ty| program.type_string(ty).replacen(&format!("{unit}."), "", 1));
        let field_of_struct = match kind {
            DefKind::Field => self.struct_name.as_ref().map(SmolStr::to_string),
            _ => None,
        };
        let (type_string, underlying_type_string) = match object.ty {
            Some(ty) => (
                program.type_string(ty),
                program.type_string(program.underlying(ty)),
            ),
            None => (String::new(), String::new()),
        };

        self.output.defs.push(Def {
            name: object.name.to_string(),
            def_key: entry.key.clone(),
            file: self.file_name(ast.file(name)),
            ident_span: ast.range(name).into(),
            decl_span: ast.range(decl).into(),
            exported: entry.info.exported,
            package_scope: entry.info.pkg_scope,
            kind,
            receiver,
            field_of_struct,
            type_string,
            underlying_type_string,
        });
    }

    pub(super) fn file_name(&self, file: FileId) -> String {
        self.program.sources().name(file).to_owned()
    }
}

/// The def kind of a declared object; `None` for import names.
fn def_kind(program: &Program, obj: ObjectId) -> Result<Option<DefKind>, GraphError> {
    let object = program.object(obj);
    Ok(Some(match object.kind {
        ObjectKind::Package { .. } => return Ok(None),
        ObjectKind::Const => DefKind::Const,
        ObjectKind::TypeName => DefKind::Type,
        ObjectKind::Var => DefKind::Var,
        ObjectKind::Field { .. } => DefKind::Field,
        ObjectKind::Func { .. } if program.method_receiver(obj).is_some() => DefKind::Method,
        ObjectKind::Func { .. } => DefKind::Func,
        ObjectKind::Builtin | ObjectKind::Nil => {
            return Err(GraphError::UnhandledObjectKind {
                name: object.name.to_string(),
                kind: object.kind.name(),
            });
        }
    }))
}

impl Visitor for Grapher<'_> {
    fn visit(&mut self, ast: &Ast, node: NodeId) -> Walk {
        if self.fatal.is_some() {
            return Walk::Skip;
        }
        let pkg = self.pkg;
        let info = &pkg.info;
        match ast.kind(node) {
            NodeKind::File { name, .. } => {
                // the package clause refers to the package def
                self.output.refs.push(Ref {
                    unit: self.unit().to_owned(),
                    file: self.file_name(ast.file(node)),
                    span: ast.range(*name).into(),
                    def: DefKey::package(self.unit()),
                    is_def: false,
                });
            }
            NodeKind::ImportSpec { .. } => {
                if let Some(&obj) = info.implicits.get(&node) {
                    self.emit_ref(node, obj, false);
                    self.implicit_spans
                        .insert((ast.file(node), ast.range(node).into()));
                }
            }
            NodeKind::TypeSpec { name, ty, .. } => {
                self.new_def(node, *name);
                if let NodeKind::StructType { .. } = ast.kind(*ty) {
                    walk(self, ast, *name);
                    let name = ast.ident_name(*name).map(SmolStr::new);
                    let outer = std::mem::replace(&mut self.struct_name, name);
                    walk(self, ast, *ty);
                    self.struct_name = outer;
                    return Walk::Skip;
                }
            }
            NodeKind::Field { names, ty, .. } => {
                // embedded fields are declared by their type name
                self.new_def(node, *ty);
                if let NodeKind::StarExpr { x } = ast.kind(*ty) {
                    self.new_def(node, *x);
                }
                for &name in names {
                    self.new_def(node, name);
                }
            }
            NodeKind::FuncDecl { name, .. } => self.new_def(node, *name),
            NodeKind::ValueSpec { names, .. } => {
                for &name in names {
                    self.new_def(node, name);
                }
            }
            NodeKind::AssignStmt { lhs, .. } => {
                for &name in lhs {
                    self.new_def(node, name);
                }
            }
            NodeKind::RangeStmt { key, value, .. } => {
                for name in key.iter().chain(value.iter()) {
                    self.new_def(node, *name);
                }
            }
            NodeKind::SelectorExpr { .. } => {
                if let Some(sel) = info.selections.get(&node) {
                    let recv = declaring_receiver(self.program, sel);
                    self.sel_recvs.insert(sel.obj, recv);
                }
            }
            NodeKind::Ident { name } => {
                if name == "_" {
                    return Walk::Children;
                }
                let Some(obj) = info.object_of(node) else {
                    return Walk::Children;
                };
                if self
                    .implicit_spans
                    .contains(&(ast.file(node), ast.range(node).into()))
                {
                    return Walk::Children;
                }
                let is_def = info.is_def(node)
                    && !matches!(self.program.object(obj).kind, ObjectKind::Package { .. });
                self.emit_ref(node, obj, is_def);
            }
            NodeKind::LabeledStmt { stmt, .. } => {
                walk(self, ast, *stmt);
                return Walk::Skip;
            }
            NodeKind::BranchStmt { .. } => return Walk::Skip,
            _ => {}
        }
        Walk::Children
    }
}
