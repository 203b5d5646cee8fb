//! Go types and their canonical string form.

use std::fmt::Write;

use super::{ObjectId, Program, TypeId};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// A Go type. Composite types refer to their parts by [`TypeId`]; struct
/// fields, interface methods and signature parameters are objects.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Type {
    Basic {
        name: smol_str::SmolStr,
    },
    Named {
        obj: ObjectId,
        underlying: Option<TypeId>,
        methods: Vec<ObjectId>,
    },
    Pointer {
        elem: TypeId,
    },
    Slice {
        elem: TypeId,
    },
    Array {
        len: u64,
        elem: TypeId,
    },
    Map {
        key: TypeId,
        value: TypeId,
    },
    Chan {
        dir: ChanDir,
        elem: TypeId,
    },
    Struct {
        fields: Vec<ObjectId>,
    },
    Interface {
        methods: Vec<ObjectId>,
        embedded: Vec<TypeId>,
    },
    Signature {
        recv: Option<ObjectId>,
        params: Vec<ObjectId>,
        results: Vec<ObjectId>,
        variadic: bool,
    },
}

/// Renders types the way `types.TypeString(t, nil)` does: named types
/// are qualified with their full package path.
pub(crate) struct TypeWriter<'a> {
    program: &'a Program,
    out: String,
}

impl<'a> TypeWriter<'a> {
    pub(crate) fn new(program: &'a Program) -> Self {
        Self {
            program,
            out: String::new(),
        }
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }

    pub(crate) fn write_type(&mut self, ty: TypeId) {
        let program = self.program;
        match program.ty(ty) {
            Type::Basic { name } => self.out.push_str(name),
            Type::Named { obj, .. } => {
                let obj = program.object(*obj);
                if let Some(pkg) = obj.pkg {
                    self.out.push_str(&program.package(pkg).path);
                    self.out.push('.');
                }
                self.out.push_str(&obj.name);
            }
            Type::Pointer { elem } => {
                self.out.push('*');
                self.write_type(*elem);
            }
            Type::Slice { elem } => {
                self.out.push_str("[]");
                self.write_type(*elem);
            }
            Type::Array { len, elem } => {
                let _ = write!(self.out, "[{len}]");
                self.write_type(*elem);
            }
            Type::Map { key, value } => {
                self.out.push_str("map[");
                self.write_type(*key);
                self.out.push(']');
                self.write_type(*value);
            }
            Type::Chan { dir, elem } => {
                self.out.push_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.write_type(*elem);
            }
            Type::Struct { fields } => {
                self.out.push_str("struct{");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str("; ");
                    }
                    let field = program.object(*field);
                    let embedded = matches!(
                        field.kind,
                        super::ObjectKind::Field { embedded: true }
                    );
                    if !embedded {
                        self.out.push_str(&field.name);
                        self.out.push(' ');
                    }
                    self.write_object_type(field.ty);
                }
                self.out.push('}');
            }
            Type::Interface { methods, embedded } => {
                self.out.push_str("interface{");
                let mut first = true;
                for method in methods {
                    if !first {
                        self.out.push_str("; ");
                    }
                    first = false;
                    let method = program.object(*method);
                    self.out.push_str(&method.name);
                    if let Some(sig) = method.ty {
                        self.write_signature(sig);
                    }
                }
                for embed in embedded {
                    if !first {
                        self.out.push_str("; ");
                    }
                    first = false;
                    self.write_type(*embed);
                }
                self.out.push('}');
            }
            Type::Signature { .. } => {
                self.out.push_str("func");
                self.write_signature(ty);
            }
        }
    }

    fn write_object_type(&mut self, ty: Option<TypeId>) {
        match ty {
            Some(ty) => self.write_type(ty),
            None => self.out.push_str("invalid type"),
        }
    }

    /// `(params) results` without the leading `func`.
    fn write_signature(&mut self, sig: TypeId) {
        let program = self.program;
        let Type::Signature {
            params,
            results,
            variadic,
            ..
        } = program.ty(sig)
        else {
            return;
        };
        self.write_tuple(params, *variadic);
        match results.as_slice() {
            [] => {}
            [only] if program.object(*only).name.is_empty() => {
                self.out.push(' ');
                let ty = program.object(*only).ty;
                self.write_object_type(ty);
            }
            _ => {
                self.out.push(' ');
                self.write_tuple(results, false);
            }
        }
    }

    fn write_tuple(&mut self, vars: &[ObjectId], variadic: bool) {
        let program = self.program;
        self.out.push('(');
        for (i, var) in vars.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            let var = program.object(*var);
            if !var.name.is_empty() {
                self.out.push_str(&var.name);
                self.out.push(' ');
            }
            let last = i + 1 == vars.len();
            match var.ty {
                Some(ty) if variadic && last => {
                    self.out.push_str("...");
                    match program.ty(ty) {
                        Type::Slice { elem } => self.write_type(*elem),
                        _ => self.write_type(ty),
                    }
                }
                other => self.write_object_type(other),
            }
        }
        self.out.push(')');
    }
}
