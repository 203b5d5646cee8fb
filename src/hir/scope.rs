//! Lexical scopes.

use std::collections::BTreeMap;

use smol_str::SmolStr;

use super::{ObjectId, ScopeId};

/// A lexical scope: its bindings, its parent and its children.
///
/// Names iterate in sorted order, like `types.Scope.Names()`. Children
/// keep the order the checker created them in, which is source order.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    pub(crate) parent: Option<ScopeId>,
    pub(crate) children: Vec<ScopeId>,
    pub(crate) names: BTreeMap<SmolStr, ObjectId>,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>) -> Self {
        Self {
            parent,
            ..Self::default()
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    /// Look up a name bound directly in this scope.
    pub fn lookup(&self, name: &str) -> Option<ObjectId> {
        self.names.get(name).copied()
    }

    /// Bindings in sorted name order.
    pub fn names(&self) -> impl Iterator<Item = (&str, ObjectId)> + '_ {
        self.names.iter().map(|(name, &obj)| (name.as_str(), obj))
    }

    /// Position of `child` among this scope's children.
    pub fn child_index(&self, child: ScopeId) -> Option<usize> {
        self.children.iter().position(|&c| c == child)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_sorted() {
        let mut scope = Scope::new(None);
        scope.names.insert("b".into(), ObjectId::new(1));
        scope.names.insert("B".into(), ObjectId::new(2));
        scope.names.insert("a".into(), ObjectId::new(3));

        let names: Vec<_> = scope.names().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["B", "a", "b"]);
        assert_eq!(scope.lookup("a"), Some(ObjectId::new(3)));
        assert_eq!(scope.lookup("c"), None);
    }

    #[test]
    fn test_child_index() {
        let mut scope = Scope::new(Some(ScopeId::new(0)));
        scope.children = vec![ScopeId::new(4), ScopeId::new(2)];
        assert_eq!(scope.child_index(ScopeId::new(2)), Some(1));
        assert_eq!(scope.child_index(ScopeId::new(9)), None);
        assert_eq!(scope.parent(), Some(ScopeId::new(0)));
    }
}
