//! Semantic objects.

use smol_str::SmolStr;

use super::{PackageId, ScopeId, TypeId};
use crate::base::Pos;

/// The closed set of object kinds a Go type checker produces.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ObjectKind {
    /// A package name introduced by an import (`PkgName`).
    Package { imported: PackageId },
    Const,
    TypeName,
    Var,
    /// A struct field. `embedded` is set for anonymous fields.
    Field { embedded: bool },
    /// A function or method; `scope` is the function's own scope, absent
    /// for functions without a body seen by the checker.
    Func { scope: Option<ScopeId> },
    /// A universe builtin function (`len`, `append`, ...).
    Builtin,
    Nil,
}

impl ObjectKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Package { .. } => "package",
            ObjectKind::Const => "const",
            ObjectKind::TypeName => "type",
            ObjectKind::Var => "var",
            ObjectKind::Field { .. } => "field",
            ObjectKind::Func { .. } => "func",
            ObjectKind::Builtin => "builtin",
            ObjectKind::Nil => "nil",
        }
    }
}

/// One declared entity.
#[derive(Clone, Debug)]
pub struct Object {
    pub name: SmolStr,
    pub kind: ObjectKind,
    /// Owning package; `None` for universe objects.
    pub pkg: Option<PackageId>,
    /// Scope the object is bound in. Fields and methods have none.
    pub parent: Option<ScopeId>,
    pub pos: Option<Pos>,
    pub ty: Option<TypeId>,
}

impl Object {
    pub fn new(name: impl Into<SmolStr>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            pkg: None,
            parent: None,
            pos: None,
            ty: None,
        }
    }

    pub fn in_package(mut self, pkg: PackageId) -> Self {
        self.pkg = Some(pkg);
        self
    }

    pub fn at(mut self, pos: Pos) -> Self {
        self.pos = Some(pos);
        self
    }

    pub fn typed(mut self, ty: TypeId) -> Self {
        self.ty = Some(ty);
        self
    }

    #[inline]
    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }
}

/// Go's `token.IsExported`: the first character is an uppercase letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
