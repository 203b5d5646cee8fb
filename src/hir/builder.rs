//! Construction API for checked programs.
//!
//! The grapher never sees Go source; whoever drives the Go toolchain
//! lowers its `go/ast` + `go/types` result through this builder. Tests use
//! it the same way, which is why it can locate identifiers by searching
//! the registered file text instead of requiring raw offsets.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::{
    Object, ObjectId, ObjectKind, Package, PackageId, PackageInfo, Program, Scope, ScopeId,
    Selection, SourceMap, Type, TypeId, TypeInfo,
};
use crate::base::{FileId, Pos, TextRange, TextSize};
use crate::syntax::{Ast, CommentGroup, NodeId, NodeKind};

const BASIC_TYPES: &[&str] = &[
    "bool", "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16", "uint32",
    "uint64", "uintptr", "float32", "float64", "complex64", "complex128", "string", "byte",
    "rune",
];

const BUILTIN_FUNCS: &[&str] = &[
    "append", "cap", "close", "complex", "copy", "delete", "imag", "len", "make", "new", "panic",
    "print", "println", "real", "recover",
];

/// Incrementally assembles a [`Program`] and one [`PackageInfo`] per
/// package.
///
/// `new` pre-populates the universe scope with Go's predeclared types,
/// constants, `nil` and builtin functions.
#[derive(Debug)]
pub struct ProgramBuilder {
    program: Program,
    infos: IndexMap<PackageId, PackageInfo>,
    file_scopes: FxHashMap<FileId, ScopeId>,
    file_packages: FxHashMap<FileId, PackageId>,
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            program: Program {
                sources: SourceMap::new(),
                ast: Ast::new(),
                objects: Vec::new(),
                types: Vec::new(),
                scopes: vec![Scope::new(None)],
                packages: Vec::new(),
                universe: ScopeId::new(0),
            },
            infos: IndexMap::new(),
            file_scopes: FxHashMap::default(),
            file_packages: FxHashMap::default(),
        };
        builder.populate_universe();
        builder
    }

    fn populate_universe(&mut self) {
        let universe = self.program.universe;
        for &name in BASIC_TYPES {
            let ty = self.ty(Type::Basic { name: name.into() });
            let obj = self.object(Object::new(name, ObjectKind::TypeName).typed(ty));
            self.declare(universe, obj);
        }

        // type error interface { Error() string }
        let string = self.basic("string");
        let result = self.object(Object::new("", ObjectKind::Var).typed(string));
        let sig = self.ty(Type::Signature {
            recv: None,
            params: Vec::new(),
            results: vec![result],
            variadic: false,
        });
        let method = self.object(Object::new("Error", ObjectKind::Func { scope: None }).typed(sig));
        let iface = self.ty(Type::Interface {
            methods: vec![method],
            embedded: Vec::new(),
        });
        let error = self.object(Object::new("error", ObjectKind::TypeName));
        let named = self.named(error);
        self.set_underlying(named, iface);
        self.declare(universe, error);

        let bool_ty = self.basic("bool");
        let int_ty = self.basic("int");
        for (name, ty) in [("true", bool_ty), ("false", bool_ty), ("iota", int_ty)] {
            let obj = self.object(Object::new(name, ObjectKind::Const).typed(ty));
            self.declare(universe, obj);
        }
        for &name in BUILTIN_FUNCS {
            let obj = self.object(Object::new(name, ObjectKind::Builtin));
            self.declare(universe, obj);
        }
        let nil = self.object(Object::new("nil", ObjectKind::Nil));
        self.declare(universe, nil);
    }

    // ========================================================================
    // PACKAGES AND FILES
    // ========================================================================

    #[inline]
    pub fn universe(&self) -> ScopeId {
        self.program.universe
    }

    /// A predeclared object such as `len`, `nil` or `string`.
    pub fn universe_object(&self, name: &str) -> Option<ObjectId> {
        self.program.scope(self.program.universe).lookup(name)
    }

    /// The type a predeclared type name denotes (`"string"`, `"error"`).
    ///
    /// # Panics
    /// Panics if `name` is not a predeclared type.
    pub fn universe_type(&self, name: &str) -> TypeId {
        self.universe_object(name)
            .and_then(|obj| self.program.object(obj).ty)
            .unwrap_or_else(|| panic!("`{name}` is not a predeclared type"))
    }

    /// Shorthand for [`universe_type`](Self::universe_type) on basic types.
    pub fn basic(&self, name: &str) -> TypeId {
        self.universe_type(name)
    }

    /// Declare a package and its package scope.
    pub fn package(&mut self, path: &str, name: &str) -> PackageId {
        let scope = self.new_scope(self.program.universe);
        let id = PackageId::new(self.program.packages.len() as u32);
        self.program.packages.push(Package {
            path: path.into(),
            name: name.into(),
            scope,
        });
        self.infos.insert(id, PackageInfo::new(id));
        id
    }

    pub fn package_scope(&self, pkg: PackageId) -> ScopeId {
        self.program.package(pkg).scope
    }

    /// Register a file of `pkg` and create its file scope.
    pub fn file(&mut self, pkg: PackageId, name: &str, text: &str) -> FileId {
        let file = self.program.sources.add(name, text);
        let scope = self.new_scope(self.package_scope(pkg));
        self.file_scopes.insert(file, scope);
        self.file_packages.insert(file, pkg);
        file
    }

    /// # Panics
    /// Panics if `file` was not registered with [`file`](Self::file).
    pub fn file_scope(&self, file: FileId) -> ScopeId {
        *self
            .file_scopes
            .get(&file)
            .unwrap_or_else(|| panic!("{file:?} is not a registered file"))
    }

    // ========================================================================
    // LOCATING TEXT
    // ========================================================================

    /// Range of the `nth` (0-based) occurrence of `needle` in `file`.
    ///
    /// Identifier-shaped needles only match whole words, so looking for
    /// `a` does not stop inside `bar`.
    pub fn try_find(&self, file: FileId, needle: &str, nth: usize) -> Option<TextRange> {
        if needle.is_empty() {
            return None;
        }
        let text = self.program.sources.text(file);
        let whole_word = is_identifier(needle);
        let mut seen = 0;
        for (start, _) in text.match_indices(needle) {
            let end = start + needle.len();
            if whole_word {
                let before = text[..start].chars().next_back();
                let after = text[end..].chars().next();
                if before.is_some_and(is_ident_char) || after.is_some_and(is_ident_char) {
                    continue;
                }
            }
            if seen == nth {
                return Some(TextRange::new(
                    TextSize::from(start as u32),
                    TextSize::from(end as u32),
                ));
            }
            seen += 1;
        }
        None
    }

    /// # Panics
    /// Panics if the occurrence does not exist.
    pub fn find(&self, file: FileId, needle: &str, nth: usize) -> TextRange {
        self.try_find(file, needle, nth).unwrap_or_else(|| {
            panic!(
                "occurrence {nth} of {needle:?} not found in {}",
                self.program.sources.name(file)
            )
        })
    }

    /// Start position of an occurrence, for object positions.
    pub fn pos(&self, file: FileId, needle: &str, nth: usize) -> Pos {
        Pos::new(file, self.find(file, needle, nth).start())
    }

    // ========================================================================
    // SYNTAX
    // ========================================================================

    pub fn node(&mut self, file: FileId, range: TextRange, kind: NodeKind) -> NodeId {
        self.program.ast.alloc(file, range, kind)
    }

    /// Allocate a node whose range covers all of its children.
    ///
    /// # Panics
    /// Panics if `kind` has no children.
    pub fn wrap(&mut self, kind: NodeKind) -> NodeId {
        let ast = &self.program.ast;
        let children = kind.children();
        let first = *children
            .first()
            .unwrap_or_else(|| panic!("cannot infer a range for a childless {}", kind.name()));
        let range = children
            .iter()
            .map(|&c| ast.range(c))
            .fold(ast.range(first), TextRange::cover);
        let file = ast.file(first);
        self.node(file, range, kind)
    }

    /// An `Ident` node for the `nth` whole-word occurrence of `name`.
    pub fn ident(&mut self, file: FileId, name: &str, nth: usize) -> NodeId {
        let range = self.find(file, name, nth);
        self.node(file, range, NodeKind::Ident { name: name.into() })
    }

    /// Like [`ident`](Self::ident), also recording the identifier as the
    /// defining occurrence of `obj`.
    pub fn def_ident(&mut self, file: FileId, name: &str, nth: usize, obj: ObjectId) -> NodeId {
        let ident = self.ident(file, name, nth);
        self.define(ident, obj);
        ident
    }

    /// Like [`ident`](Self::ident), also recording a use of `obj`.
    pub fn use_ident(&mut self, file: FileId, name: &str, nth: usize, obj: ObjectId) -> NodeId {
        let ident = self.ident(file, name, nth);
        self.record_use(ident, obj);
        ident
    }

    /// A comment group for a verbatim comment found in the file text.
    ///
    /// Multi-line `//` comments are split into one token per line.
    pub fn comment(&self, file: FileId, text: &str, nth: usize) -> CommentGroup {
        let range = self.find(file, text, nth);
        let list = if text.starts_with("/*") {
            vec![SmolStr::new(text)]
        } else {
            text.lines().map(|l| SmolStr::new(l.trim())).collect()
        };
        CommentGroup::new(file, range, list)
    }

    /// Allocate the `File` node spanning the whole text, record it as a
    /// file of its package and map it to its file scope.
    pub fn finish_file(
        &mut self,
        file: FileId,
        name: NodeId,
        decls: Vec<NodeId>,
        doc: Option<CommentGroup>,
        comments: Vec<CommentGroup>,
    ) -> NodeId {
        let len = self.program.sources.text(file).len() as u32;
        let range = TextRange::new(TextSize::from(0), TextSize::from(len));
        let node = self.node(
            file,
            range,
            NodeKind::File {
                name,
                decls,
                doc,
                comments,
            },
        );
        let scope = self.file_scope(file);
        let info = self.package_info_mut(file);
        info.files.push(node);
        info.info.scopes.insert(node, scope);
        node
    }

    // ========================================================================
    // SEMANTICS
    // ========================================================================

    pub fn object(&mut self, obj: Object) -> ObjectId {
        let id = ObjectId::new(self.program.objects.len() as u32);
        self.program.objects.push(obj);
        id
    }

    /// Create a child scope of `parent`.
    pub fn new_scope(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId::new(self.program.scopes.len() as u32);
        self.program.scopes.push(Scope::new(Some(parent)));
        self.program.scopes[parent.index()].children.push(id);
        id
    }

    /// Bind `obj` in `scope` under its own name.
    pub fn declare(&mut self, scope: ScopeId, obj: ObjectId) {
        let name = self.program.objects[obj.index()].name.clone();
        self.program.objects[obj.index()].parent = Some(scope);
        self.program.scopes[scope.index()].names.insert(name, obj);
    }

    pub fn ty(&mut self, ty: Type) -> TypeId {
        let id = TypeId::new(self.program.types.len() as u32);
        self.program.types.push(ty);
        id
    }

    /// Create the named type of type name `obj` and attach it to `obj`.
    /// The underlying type is set later, since it may refer back to it.
    pub fn named(&mut self, obj: ObjectId) -> TypeId {
        let ty = self.ty(Type::Named {
            obj,
            underlying: None,
            methods: Vec::new(),
        });
        self.set_type(obj, ty);
        ty
    }

    pub fn set_type(&mut self, obj: ObjectId, ty: TypeId) {
        self.program.objects[obj.index()].ty = Some(ty);
    }

    pub fn set_underlying(&mut self, named: TypeId, ty: TypeId) {
        if let Type::Named { underlying, .. } = &mut self.program.types[named.index()] {
            *underlying = Some(ty);
        }
    }

    pub fn add_method(&mut self, named: TypeId, method: ObjectId) {
        if let Type::Named { methods, .. } = &mut self.program.types[named.index()] {
            methods.push(method);
        }
    }

    /// Record `ident` as the defining occurrence of `obj`.
    pub fn define(&mut self, ident: NodeId, obj: ObjectId) {
        self.package_info_mut_for(ident).defs.insert(ident, obj);
    }

    /// Record `ident` as a use of `obj`.
    pub fn record_use(&mut self, ident: NodeId, obj: ObjectId) {
        self.package_info_mut_for(ident).uses.insert(ident, obj);
    }

    /// Record the implicit object of `node` (an unnamed import spec).
    pub fn implicit(&mut self, node: NodeId, obj: ObjectId) {
        self.package_info_mut_for(node).implicits.insert(node, obj);
    }

    /// Record the selection of a `SelectorExpr` node.
    pub fn select(&mut self, selector: NodeId, selection: Selection) {
        self.package_info_mut_for(selector)
            .selections
            .insert(selector, selection);
    }

    /// Record `node` as the node introducing `scope`.
    pub fn scope_node(&mut self, node: NodeId, scope: ScopeId) {
        self.package_info_mut_for(node).scopes.insert(node, scope);
    }

    /// The partially built program, for inspection while building.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Finish, returning the program and the per-package tables in
    /// package creation order.
    pub fn build(self) -> (Program, Vec<PackageInfo>) {
        (self.program, self.infos.into_values().collect())
    }

    fn package_info_mut_for(&mut self, node: NodeId) -> &mut TypeInfo {
        let file = self.program.ast.file(node);
        &mut self.package_info_mut(file).info
    }

    /// # Panics
    /// Panics if `file` was not registered with [`file`](Self::file).
    fn package_info_mut(&mut self, file: FileId) -> &mut PackageInfo {
        let pkg = *self
            .file_packages
            .get(&file)
            .unwrap_or_else(|| panic!("{file:?} is not a registered file"));
        &mut self.infos[&pkg]
    }
}

fn is_ident_char(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_continue(c)
}

/// Whether `s` is a Go identifier (letter or `_`, then letters/digits).
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || unicode_ident::is_xid_start(c))
        && chars.all(is_ident_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universe_is_populated() {
        let b = ProgramBuilder::new();
        for name in ["string", "error", "len", "nil", "true", "iota"] {
            assert!(b.universe_object(name).is_some(), "missing {name}");
        }
        let program = b.program();
        let nil = b.universe_object("nil").unwrap();
        assert_eq!(program.object(nil).kind, ObjectKind::Nil);
        assert_eq!(program.type_string(b.universe_type("error")), "error");
    }

    #[test]
    fn test_find_matches_whole_words() {
        let mut b = ProgramBuilder::new();
        let pkg = b.package("p", "p");
        let file = b.file(pkg, "p.go", "package p\nvar bar, a = 1, 2\n_ = a.bar");

        let first_a = b.find(file, "a", 0);
        assert_eq!(u32::from(first_a.start()), 19);
        let second_a = b.find(file, "a", 1);
        assert_eq!(u32::from(second_a.start()), 32);
        assert!(b.try_find(file, "a", 2).is_none());
        assert_eq!(u32::from(b.find(file, "a.bar", 0).start()), 32);
    }

    #[test]
    fn test_scopes_and_declarations() {
        let mut b = ProgramBuilder::new();
        let pkg = b.package("example.com/p", "p");
        let file = b.file(pkg, "p.go", "package p\nvar X int\n");
        let pkg_scope = b.package_scope(pkg);
        let file_scope = b.file_scope(file);
        let int = b.basic("int");
        let x = b.object(
            Object::new("X", ObjectKind::Var)
                .in_package(pkg)
                .typed(int)
                .at(b.pos(file, "X", 0)),
        );
        b.declare(pkg_scope, x);
        let name = b.ident(file, "p", 0);
        b.finish_file(file, name, Vec::new(), None, Vec::new());
        let (program, infos) = b.build();

        assert_eq!(program.scope(pkg_scope).lookup("X"), Some(x));
        assert_eq!(program.scope(file_scope).parent(), Some(pkg_scope));
        assert_eq!(program.object(x).parent, Some(pkg_scope));
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].files.len(), 1);
        assert_eq!(infos[0].info.scopes.get(&infos[0].files[0]), Some(&file_scope));
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("foo_1"));
        assert!(is_identifier("_"));
        assert!(is_identifier("δx"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a.b"));
        assert!(!is_identifier(""));
    }
}
