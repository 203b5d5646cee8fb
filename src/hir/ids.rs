//! Arena handles for semantic entities.
//!
//! Each handle is a `u32` index into one of [`Program`](super::Program)'s
//! arenas. Handles are what "object identity" means throughout the
//! crate: two objects with the same name in different scopes have
//! different ids, and all grapher state is keyed by them.

use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl From<u32> for $name {
            #[inline]
            fn from(id: u32) -> Self {
                Self(id)
            }
        }
    };
}

arena_id!(
    /// A declared entity: package name, const, type name, var, field,
    /// func, method or universe builtin.
    ObjectId
);

arena_id!(
    /// A lexical scope.
    ScopeId
);

arena_id!(
    /// A type.
    TypeId
);

arena_id!(
    /// A package (its import path, name and package scope).
    PackageId
);
