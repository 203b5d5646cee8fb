//! Def path assignment.
//!
//! Every object declared in the graphed package gets a path: the labels
//! of the scopes enclosing its declaration followed by its name. File
//! and package scopes contribute nothing, a function scope contributes
//! the function's name and any other block contributes
//! `$<file><child index>`. Paths only depend on where a declaration sits
//! syntactically, so two runs over the same package agree.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::ScopeIndex;
use crate::base::Pos;
use crate::hir::{
    ObjectId, ObjectKind, PackageId, PackageInfo, Program, ScopeId, Type, TypeInfo, is_exported,
};
use crate::syntax::{NodeId, NodeKind};

/// Components of a def path.
pub type DefPath = Vec<String>;

/// How scopes without an introducing node are labelled.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeLabelMode {
    /// `ERROR0`, `ERROR1`, ... in traversal order.
    #[default]
    Deterministic,
    /// `ERROR<random>`; differs from run to run.
    Random,
}

/// Assigns paths for one package. Built per graph run and dropped with it.
#[derive(Debug)]
pub struct PathAssigner<'a> {
    pub(super) program: &'a Program,
    info: &'a TypeInfo,
    pkg: PackageId,
    index: ScopeIndex,
    mode: ScopeLabelMode,
    fallback_labels: u32,
    pub(super) paths: FxHashMap<ObjectId, DefPath>,
    scope_paths: FxHashMap<ScopeId, DefPath>,
    exported: FxHashMap<ObjectId, bool>,
    pkg_scope: FxHashMap<ObjectId, bool>,
}

impl<'a> PathAssigner<'a> {
    pub fn new(program: &'a Program, pkg: &'a PackageInfo, mode: ScopeLabelMode) -> Self {
        Self {
            program,
            info: &pkg.info,
            pkg: pkg.pkg,
            index: ScopeIndex::build(program, &pkg.info),
            mode,
            fallback_labels: 0,
            paths: FxHashMap::default(),
            scope_paths: FxHashMap::default(),
            exported: FxHashMap::default(),
            pkg_scope: FxHashMap::default(),
        }
    }

    /// Assign paths to everything reachable from the package scope.
    pub fn assign_package(&mut self) {
        let scope = self.program.package(self.pkg).scope;
        self.assign_paths(scope, Vec::new(), true);
    }

    /// Assign paths to the bindings of `scope` under `prefix`, then to
    /// its child scopes.
    pub fn assign_paths(&mut self, scope: ScopeId, prefix: DefPath, pkg_scope: bool) {
        let program = self.program;
        self.scope_paths.insert(scope, prefix.clone());

        for (name, obj) in program.scope(scope).names() {
            if self.paths.contains_key(&obj) {
                continue;
            }
            let mut path = prefix.clone();
            path.push(name.to_owned());
            self.record(obj, path.clone(), is_exported(name) && pkg_scope, pkg_scope);

            let object = program.object(obj);
            let Some(ty) = object.ty else {
                continue;
            };
            match object.kind {
                ObjectKind::TypeName => {
                    self.assign_method_paths(ty, &path, pkg_scope);
                    let underlying = program.deref(program.underlying(ty));
                    if let Type::Struct { fields } = program.ty(underlying) {
                        self.assign_struct_field_paths(fields, &path, pkg_scope);
                    }
                }
                ObjectKind::Var => {
                    // only anonymous struct types; named ones own their fields
                    if let Type::Struct { fields } = program.ty(program.deref(ty)) {
                        self.assign_struct_field_paths(fields, &path, pkg_scope);
                    }
                }
                _ => {}
            }
        }

        let mut seen = FxHashSet::default();
        for (i, &child) in program.scope(scope).children().iter().enumerate() {
            let mut child_prefix = self.scope_path(&prefix, child);
            if !child_prefix.is_empty() {
                let joined = child_prefix.join("/");
                if seen.contains(&joined) {
                    if let Some(last) = child_prefix.last_mut() {
                        last.push_str(&format!("${i}"));
                    }
                }
                seen.insert(joined);
            }
            self.assign_paths(child, child_prefix, false);
        }
    }

    pub(super) fn record(&mut self, obj: ObjectId, path: DefPath, exported: bool, pkg_scope: bool) {
        self.paths.insert(obj, path);
        self.exported.insert(obj, exported);
        self.pkg_scope.insert(obj, pkg_scope);
    }

    fn scope_path(&mut self, prefix: &[String], scope: ScopeId) -> DefPath {
        if let Some(path) = self.scope_paths.get(&scope) {
            return path.clone();
        }
        let mut path = prefix.to_vec();
        path.extend(self.scope_label(scope));
        self.scope_paths.insert(scope, path.clone());
        path
    }

    fn scope_label(&mut self, scope: ScopeId) -> Vec<String> {
        let program = self.program;
        let ast = program.ast();
        let sources = program.sources();
        let Some(node) = self.index.node(scope) else {
            return vec![self.fallback_label()];
        };

        match ast.kind(node) {
            NodeKind::File { .. } => return Vec::new(),
            NodeKind::FuncType { .. } => {
                if let Some(name) = self.index.func_name(scope) {
                    if name != "init" {
                        return vec![name.to_owned()];
                    }
                }
                let decl = ast.parent(node).map(|parent| ast.kind(parent));
                if let Some(NodeKind::FuncDecl { recv, name, .. }) = decl {
                    let mut label = Vec::new();
                    if let Some(recv_name) = recv.and_then(|recv| self.receiver_type_name(recv)) {
                        label.push(recv_name.to_owned());
                    }
                    let func_name = ast.ident_name(*name).unwrap_or_default();
                    if func_name == "init" {
                        let pos = Pos::new(ast.file(*name), ast.range(*name).start());
                        label.push(format!("{func_name}{}", self.uniq_id(pos)));
                    } else {
                        label.push(func_name.to_owned());
                    }
                    return label;
                }
            }
            _ => {}
        }

        let Some(parent) = program.scope(scope).parent() else {
            return vec![self.fallback_label()];
        };
        let mut label = Vec::new();
        if let Some(parent_node) = self.index.node(parent) {
            if matches!(ast.kind(parent_node), NodeKind::File { .. }) {
                label.push(format!("${}", sources.stripped_name(ast.file(parent_node))));
            }
        }
        let i = program.scope(parent).child_index(scope).unwrap_or_default();
        label.push(format!("${}{i}", sources.stripped_name(ast.file(node))));
        label
    }

    /// Type name of the first receiver field, looking through `*T` and
    /// type parameter lists.
    fn receiver_type_name(&self, recv: NodeId) -> Option<&'a str> {
        let ast = self.program.ast();
        let NodeKind::FieldList { fields } = ast.kind(recv) else {
            return None;
        };
        let NodeKind::Field { ty, .. } = ast.kind(*fields.first()?) else {
            return None;
        };
        let mut ty = *ty;
        loop {
            match ast.kind(ty) {
                NodeKind::StarExpr { x } => ty = *x,
                NodeKind::Ident { name } => return Some(name.as_str()),
                NodeKind::Other { children, .. } => ty = *children.first()?,
                _ => return None,
            }
        }
    }

    fn fallback_label(&mut self) -> String {
        let n = match self.mode {
            ScopeLabelMode::Deterministic => {
                let n = self.fallback_labels;
                self.fallback_labels += 1;
                n
            }
            ScopeLabelMode::Random => uuid::Uuid::new_v4().as_fields().0,
        };
        tracing::debug!(label = n, "scope has no node; using fallback label");
        format!("ERROR{n}")
    }

    /// `$<stripped file name><byte offset>`.
    pub fn uniq_id(&self, pos: Pos) -> String {
        format!(
            "${}{}",
            self.program.sources().stripped_name(pos.file),
            pos.byte()
        )
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    #[inline]
    pub fn package(&self) -> PackageId {
        self.pkg
    }

    pub fn path(&self, obj: ObjectId) -> Option<&DefPath> {
        self.paths.get(&obj)
    }

    pub fn scope_path_of(&self, scope: ScopeId) -> Option<&DefPath> {
        self.scope_paths.get(&scope)
    }

    pub fn exported(&self, obj: ObjectId) -> Option<bool> {
        self.exported.get(&obj).copied()
    }

    pub fn pkg_scope(&self, obj: ObjectId) -> Option<bool> {
        self.pkg_scope.get(&obj).copied()
    }

    /// Path of an object of this package, placing objects that no scope
    /// walk reached (fields of struct literals in expressions, say) under
    /// the outermost scope-owning node around their position.
    pub fn local_path(&self, obj: ObjectId) -> Option<DefPath> {
        if let Some(path) = self.paths.get(&obj) {
            return Some(path.clone());
        }
        let object = self.program.object(obj);
        let scope = object
            .pos
            .and_then(|pos| self.outermost_scope_at(pos))
            .or(object.parent);
        let Some(scope) = scope else {
            tracing::warn!(name = %object.name, ?obj, "no enclosing scope; dropping object");
            return None;
        };
        let Some(prefix) = self.scope_paths.get(&scope) else {
            tracing::warn!(name = %object.name, ?scope, "enclosing scope has no path; dropping object");
            return None;
        };
        let mut path = prefix.clone();
        path.push(match object.pos {
            Some(pos) => format!("{}{}", object.name, self.uniq_id(pos)),
            None => object.name.to_string(),
        });
        Some(path)
    }

    /// Scope of the widest scope-owning node around `pos`. For anything
    /// inside a file that is the file scope.
    fn outermost_scope_at(&self, pos: Pos) -> Option<ScopeId> {
        let ast = self.program.ast();
        self.info
            .scopes
            .iter()
            .filter(|&(&node, _)| {
                ast.file(node) == pos.file && ast.range(node).contains_inclusive(pos.offset)
            })
            .max_by_key(|&(&node, _)| (ast.range(node).len(), std::cmp::Reverse(node)))
            .map(|(_, &scope)| scope)
    }
}
