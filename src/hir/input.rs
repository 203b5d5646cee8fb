//! Per-package type-checking tables.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use super::{ObjectId, PackageId, ScopeId, TypeId};
use crate::syntax::NodeId;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SelectionKind {
    FieldVal,
    MethodVal,
    MethodExpr,
}

/// The checker's record of one selector expression `x.f`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Selection {
    pub kind: SelectionKind,
    /// Static type of `x`.
    pub recv: TypeId,
    /// The selected field or method.
    pub obj: ObjectId,
    /// Path of field indices from `recv` to `obj`; every entry but the
    /// last names an embedded field.
    pub index: Vec<usize>,
    pub indirect: bool,
}

/// Identifier tables for one package, the equivalent of `types.Info`.
#[derive(Clone, Debug, Default)]
pub struct TypeInfo {
    /// Defining identifiers.
    pub defs: FxHashMap<NodeId, ObjectId>,
    /// Using identifiers.
    pub uses: FxHashMap<NodeId, ObjectId>,
    /// Objects with no identifier of their own, keyed by the node that
    /// introduces them (unnamed import specs).
    pub implicits: FxHashMap<NodeId, ObjectId>,
    /// Selector expressions, keyed by the `SelectorExpr` node.
    pub selections: FxHashMap<NodeId, Selection>,
    /// Scope-introducing nodes, in the order the checker recorded them.
    pub scopes: IndexMap<NodeId, ScopeId>,
}

impl TypeInfo {
    /// The object an identifier defines or uses.
    pub fn object_of(&self, ident: NodeId) -> Option<ObjectId> {
        self.defs.get(&ident).or_else(|| self.uses.get(&ident)).copied()
    }

    #[inline]
    pub fn is_def(&self, ident: NodeId) -> bool {
        self.defs.contains_key(&ident)
    }
}

/// One checked package: its `File` nodes and identifier tables.
#[derive(Clone, Debug)]
pub struct PackageInfo {
    pub pkg: PackageId,
    pub files: Vec<NodeId>,
    pub info: TypeInfo,
}

impl PackageInfo {
    pub fn new(pkg: PackageId) -> Self {
        Self {
            pkg,
            files: Vec::new(),
            info: TypeInfo::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_of_prefers_defs() {
        let mut info = TypeInfo::default();
        let ident = NodeId::new(1);
        info.defs.insert(ident, ObjectId::new(10));
        info.uses.insert(NodeId::new(2), ObjectId::new(10));

        assert_eq!(info.object_of(ident), Some(ObjectId::new(10)));
        assert_eq!(info.object_of(NodeId::new(2)), Some(ObjectId::new(10)));
        assert_eq!(info.object_of(NodeId::new(3)), None);
        assert!(info.is_def(ident));
        assert!(!info.is_def(NodeId::new(2)));
    }
}
