//! Reflection facility interface and reflection-augmented operations.
//!
//! The registry core never inspects types itself. When a registry is created
//! with [`use_reflection`](crate::RegistryConfig::use_reflection), it asks an
//! external [`ReflectionProvider`] for parameter and return type descriptors
//! and stores them as a side-channel next to the caller's metadata. A missing
//! provider downgrades the registry to its base operations with a warning.

use std::any::Any;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::key::ClassKey;
use crate::registry::RegistryHandle;
use crate::store::{ClassEntry, MethodEntry};

/// Structural type token describing one parameter or return type.
///
/// A name plus optional nested descriptors for generic arguments. Keeping
/// this opaque decouples the registry from any particular reflection scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    /// Descriptor with a bare name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Descriptor with nested type arguments.
    pub fn with_args(name: impl Into<String>, args: Vec<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Descriptor named after the Rust type `T`.
    pub fn of<T: ?Sized>() -> Self {
        Self::new(std::any::type_name::<T>())
    }
}

/// Reflection side-channel for a class: its constructor parameter types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectedClass {
    pub param_types: Vec<TypeDescriptor>,
}

/// Reflection side-channel for a method: parameter types and return type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectedMethod {
    pub param_types: Vec<TypeDescriptor>,
    pub return_type: Option<TypeDescriptor>,
}

/// External facility answering type queries for classes and methods.
///
/// The two methods correspond to the two fixed queries the registry makes:
/// parameter types (of the constructor when `method` is `None`, of the named
/// method otherwise) and a method's return type. `None` means the facility
/// has no information for that target; the registry records that as empty
/// parameters or an absent return type rather than failing.
pub trait ReflectionProvider: Send + Sync {
    fn param_types(&self, target: ClassKey, method: Option<&str>) -> Option<Vec<TypeDescriptor>>;

    fn return_type(&self, target: ClassKey, method: &str) -> Option<TypeDescriptor>;
}

static INSTALLED: RwLock<Option<Arc<dyn ReflectionProvider>>> = RwLock::new(None);

/// Install a process-wide reflection provider.
///
/// [`MetadataFactory::create`](crate::MetadataFactory::create) probes this
/// when a registry requests reflection. Registries created before
/// installation keep their base operations.
pub fn install(provider: Arc<dyn ReflectionProvider>) {
    *INSTALLED.write() = Some(provider);
}

/// The currently installed process-wide provider, if any.
pub fn installed() -> Option<Arc<dyn ReflectionProvider>> {
    INSTALLED.read().clone()
}

/// Remove the process-wide provider. Intended for test isolation.
pub fn uninstall() {
    *INSTALLED.write() = None;
}

/// Reflection-augmented operations of a registry handle.
///
/// Obtained from [`RegistryHandle::reflect`]; only present when the registry
/// was created with reflection enabled and a provider was found. Attachments
/// made here follow the same merge policy as the base operations.
pub struct Reflector<'a, C, M> {
    handle: &'a RegistryHandle<C, M>,
    provider: Arc<dyn ReflectionProvider>,
}

impl<'a, C, M> Reflector<'a, C, M>
where
    C: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    pub(crate) fn new(handle: &'a RegistryHandle<C, M>, provider: Arc<dyn ReflectionProvider>) -> Self {
        Self { handle, provider }
    }

    /// Attach class metadata augmented with constructor parameter types.
    pub fn attach_class<T: Any>(&self, metadata: C) -> Result<(), RegistryError> {
        self.attach_class_key(ClassKey::of::<T>(), metadata)
    }

    /// Key-based form of [`attach_class`](Self::attach_class).
    pub fn attach_class_key(&self, class: ClassKey, metadata: C) -> Result<(), RegistryError> {
        let param_types = self.provider.param_types(class, None).unwrap_or_default();
        let entry = ClassEntry {
            value: metadata,
            reflected: Some(ReflectedClass { param_types }),
        };
        self.handle.attach_class_entry(class, entry)
    }

    /// Attach method metadata augmented with parameter and return types.
    pub fn attach_method<T: Any>(&self, method: &str, metadata: M) -> Result<(), RegistryError> {
        self.attach_method_key(ClassKey::of::<T>(), method, metadata)
    }

    /// Key-based form of [`attach_method`](Self::attach_method).
    pub fn attach_method_key(
        &self,
        class: ClassKey,
        method: &str,
        metadata: M,
    ) -> Result<(), RegistryError> {
        let param_types = self.provider.param_types(class, Some(method)).unwrap_or_default();
        let return_type = self.provider.return_type(class, method);
        let entry = MethodEntry {
            value: metadata,
            reflected: Some(ReflectedMethod {
                param_types,
                return_type,
            }),
        };
        self.handle.attach_method_entry(class, method, entry)
    }

    /// Constructor parameter types recorded for a class, one list per stored
    /// entry in attachment order. Entries without a reflection side-channel
    /// contribute an empty list.
    pub fn class_param_types<T: Any>(&self) -> Result<Vec<Vec<TypeDescriptor>>, RegistryError>
    where
        C: Clone,
    {
        self.class_param_types_key(ClassKey::of::<T>())
    }

    /// Key-based form of [`class_param_types`](Self::class_param_types).
    pub fn class_param_types_key(
        &self,
        class: ClassKey,
    ) -> Result<Vec<Vec<TypeDescriptor>>, RegistryError>
    where
        C: Clone,
    {
        Ok(self
            .handle
            .class_entries_key(class)?
            .into_iter()
            .map(|entry| entry.reflected.map(|r| r.param_types).unwrap_or_default())
            .collect())
    }

    /// Parameter types recorded for a method, one list per stored entry.
    pub fn method_param_types<T: Any>(
        &self,
        method: &str,
    ) -> Result<Vec<Vec<TypeDescriptor>>, RegistryError>
    where
        M: Clone,
    {
        self.method_param_types_key(ClassKey::of::<T>(), method)
    }

    /// Key-based form of [`method_param_types`](Self::method_param_types).
    pub fn method_param_types_key(
        &self,
        class: ClassKey,
        method: &str,
    ) -> Result<Vec<Vec<TypeDescriptor>>, RegistryError>
    where
        M: Clone,
    {
        Ok(self
            .handle
            .method_entries_key(class, method)?
            .into_iter()
            .map(|entry| entry.reflected.map(|r| r.param_types).unwrap_or_default())
            .collect())
    }

    /// Return types recorded for a method, one per stored entry. `None` where
    /// the entry has no side-channel or the facility had no information.
    pub fn method_return_type<T: Any>(
        &self,
        method: &str,
    ) -> Result<Vec<Option<TypeDescriptor>>, RegistryError>
    where
        M: Clone,
    {
        self.method_return_type_key(ClassKey::of::<T>(), method)
    }

    /// Key-based form of [`method_return_type`](Self::method_return_type).
    pub fn method_return_type_key(
        &self,
        class: ClassKey,
        method: &str,
    ) -> Result<Vec<Option<TypeDescriptor>>, RegistryError>
    where
        M: Clone,
    {
        Ok(self
            .handle
            .method_entries_key(class, method)?
            .into_iter()
            .map(|entry| entry.reflected.and_then(|r| r.return_type))
            .collect())
    }
}

#[cfg(test)]
#[path = "reflect_tests.rs"]
mod tests;
