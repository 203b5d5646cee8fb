//! Method and struct field paths, and selector receivers.

use super::PathAssigner;
use crate::hir::{ObjectId, ObjectKind, Program, Selection, Type, TypeId};

impl PathAssigner<'_> {
    /// Give every method of `named` (declared methods, and explicit
    /// methods of an interface underlying type) the path
    /// `prefix + method`, then descend into each method body.
    pub(super) fn assign_method_paths(&mut self, named: TypeId, prefix: &[String], pkg_scope: bool) {
        let program = self.program;
        if let Type::Named { methods, .. } = program.ty(named) {
            for &method in methods {
                self.assign_method(method, prefix, pkg_scope);
            }
        }
        if let Type::Interface { methods, .. } = program.ty(program.underlying(named)) {
            for &method in methods {
                self.assign_method(method, prefix, pkg_scope);
            }
        }
    }

    fn assign_method(&mut self, method: ObjectId, prefix: &[String], pkg_scope: bool) {
        if self.paths.contains_key(&method) {
            return;
        }
        let object = self.program.object(method);
        let mut path = prefix.to_vec();
        path.push(object.name.to_string());
        self.record(method, path.clone(), object.is_exported(), pkg_scope);
        if let ObjectKind::Func { scope: Some(scope) } = object.kind {
            self.assign_paths(scope, path, false);
        }
    }

    /// Give every field the path `prefix + field`, descending into fields
    /// whose type is itself an anonymous struct.
    pub(super) fn assign_struct_field_paths(
        &mut self,
        fields: &[ObjectId],
        prefix: &[String],
        pkg_scope: bool,
    ) {
        let program = self.program;
        for &field in fields {
            if self.paths.contains_key(&field) {
                continue;
            }
            let object = program.object(field);
            let mut path = prefix.to_vec();
            path.push(object.name.to_string());
            self.record(field, path.clone(), object.is_exported(), pkg_scope);
            if let Some(ty) = object.ty {
                if let Type::Struct { fields: nested } = program.ty(program.deref(ty)) {
                    self.assign_struct_field_paths(nested, &path, pkg_scope);
                }
            }
        }
    }
}

/// The type that actually declares the member a selection picks.
///
/// Walks the embedded hops of `sel.index` (all but the last entry) from
/// the static receiver, dereferencing a pointer at each step. For `b.a`
/// where `B` embeds `A` this yields `A`, not `B`.
pub(crate) fn declaring_receiver(program: &Program, sel: &Selection) -> TypeId {
    let mut recv = sel.recv;
    let hops = sel.index.len().saturating_sub(1);
    for &i in &sel.index[..hops] {
        let Some(fields) = program.struct_fields(program.deref(recv)) else {
            break;
        };
        let Some(ty) = fields.get(i).and_then(|&f| program.object(f).ty) else {
            break;
        };
        recv = ty;
    }
    recv
}
