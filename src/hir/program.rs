//! The checked program: every arena in one place.

use smol_str::SmolStr;

use super::types::TypeWriter;
use super::{Object, ObjectId, PackageId, Scope, ScopeId, SourceMap, Type, TypeId};
use crate::syntax::Ast;

/// A package known to the program, graphed or merely imported.
#[derive(Clone, Debug)]
pub struct Package {
    pub path: SmolStr,
    pub name: SmolStr,
    pub scope: ScopeId,
}

/// Sources, syntax and semantic arenas of one checked program.
///
/// A `Program` is immutable once built and is shared by reference across
/// graphing threads.
#[derive(Clone, Debug)]
pub struct Program {
    pub(crate) sources: SourceMap,
    pub(crate) ast: Ast,
    pub(crate) objects: Vec<Object>,
    pub(crate) types: Vec<Type>,
    pub(crate) scopes: Vec<Scope>,
    pub(crate) packages: Vec<Package>,
    pub(crate) universe: ScopeId,
}

impl Program {
    #[inline]
    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    #[inline]
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    #[inline]
    pub fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id.index()]
    }

    #[inline]
    pub fn ty(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    #[inline]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    #[inline]
    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.index()]
    }

    #[inline]
    pub fn universe(&self) -> ScopeId {
        self.universe
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &Object)> + '_ {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, obj)| (ObjectId::new(i as u32), obj))
    }

    pub fn packages(&self) -> impl Iterator<Item = (PackageId, &Package)> + '_ {
        self.packages
            .iter()
            .enumerate()
            .map(|(i, pkg)| (PackageId::new(i as u32), pkg))
    }

    /// Follow named types to their underlying type.
    pub fn underlying(&self, mut ty: TypeId) -> TypeId {
        while let Type::Named {
            underlying: Some(next),
            ..
        } = self.ty(ty)
        {
            if *next == ty {
                break;
            }
            ty = *next;
        }
        ty
    }

    /// Strip one level of pointer indirection.
    pub fn deref(&self, ty: TypeId) -> TypeId {
        match self.ty(ty) {
            Type::Pointer { elem } => *elem,
            _ => ty,
        }
    }

    /// Fields of the struct `ty` denotes, looking through names.
    pub fn struct_fields(&self, ty: TypeId) -> Option<&[ObjectId]> {
        match self.ty(self.underlying(ty)) {
            Type::Struct { fields } => Some(fields),
            _ => None,
        }
    }

    /// The receiver variable of a method object, if it is one.
    pub fn method_receiver(&self, func: ObjectId) -> Option<ObjectId> {
        match self.ty(self.object(func).ty?) {
            Type::Signature { recv, .. } => *recv,
            _ => None,
        }
    }

    /// Go type string of `ty`, package-qualified.
    pub fn type_string(&self, ty: TypeId) -> String {
        let mut writer = TypeWriter::new(self);
        writer.write_type(ty);
        writer.finish()
    }
}
