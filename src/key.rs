//! Class identity keys.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a class (a Rust type) inside a registry.
///
/// Wraps the type's [`TypeId`] together with its name for diagnostics.
/// Equality and hashing use the `TypeId` only, so a key built from a value at
/// runtime compares equal to one built statically for the same type.
#[derive(Clone, Copy)]
pub struct ClassKey {
    id: TypeId,
    name: &'static str,
}

impl ClassKey {
    /// Key for the type `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Key for the runtime type of `value`.
    ///
    /// This is the instance-to-class resolution step: the resulting key
    /// compares equal to `ClassKey::of::<T>()` for the concrete `T` behind
    /// the reference, even through a trait object.
    pub fn of_val(value: &dyn Any) -> Self {
        Self {
            id: value.type_id(),
            // The concrete type name is not recoverable from `dyn Any`;
            // lookups only use the TypeId.
            name: "<runtime>",
        }
    }

    /// The underlying `TypeId`.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// The type name, when known statically.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ClassKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClassKey {}

impl Hash for ClassKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassKey").field(&self.name).finish()
    }
}
