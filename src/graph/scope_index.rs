//! One pass over a package's tables to index its scopes.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::hir::{ObjectKind, Program, ScopeId, TypeInfo};
use crate::syntax::NodeId;

/// Scope → introducing node, and function scope → declared name.
///
/// A scope missing from `scope_nodes` is not an error: the checker
/// creates some scopes with no syntax of their own, and those get a
/// fallback label when paths are assigned.
#[derive(Debug, Default)]
pub struct ScopeIndex {
    scope_nodes: FxHashMap<ScopeId, NodeId>,
    func_names: FxHashMap<ScopeId, SmolStr>,
}

impl ScopeIndex {
    pub fn build(program: &Program, info: &TypeInfo) -> Self {
        let mut index = Self::default();
        for (&ident, &obj) in &info.defs {
            if let ObjectKind::Func { scope: Some(scope) } = program.object(obj).kind {
                if let Some(name) = program.ast().ident_name(ident) {
                    index.func_names.insert(scope, name.into());
                }
            }
        }
        for (&node, &scope) in &info.scopes {
            index.scope_nodes.insert(scope, node);
        }
        index
    }

    #[inline]
    pub fn node(&self, scope: ScopeId) -> Option<NodeId> {
        self.scope_nodes.get(&scope).copied()
    }

    #[inline]
    pub fn func_name(&self, scope: ScopeId) -> Option<&str> {
        self.func_names.get(&scope).map(SmolStr::as_str)
    }
}
