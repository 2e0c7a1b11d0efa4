//! Registry engine: the factory and the bound operation set.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::key::ClassKey;
use crate::reflect::{self, ReflectionProvider, Reflector};
use crate::store::{ClassEntry, MethodEntry, RegistryRecord, RegistryStore};

/// Factory for creating typed metadata registries.
///
/// `C` is the metadata shape attached to classes, `M` the shape attached to
/// methods. The factory guarantees the backing record exists before handing
/// out a handle; creation is idempotent by ID.
pub struct MetadataFactory;

impl MetadataFactory {
    /// Create a registry in the process-wide store.
    ///
    /// When `config.use_reflection` is set, the globally installed
    /// [`ReflectionProvider`](crate::reflect::ReflectionProvider) is probed;
    /// if none is installed the handle falls back to the base operations and
    /// a warning is logged.
    pub fn create<C, M>(config: RegistryConfig) -> Result<RegistryHandle<C, M>, RegistryError>
    where
        C: Send + Sync + 'static,
        M: Send + Sync + 'static,
    {
        let reflection = if config.use_reflection {
            reflect::installed()
        } else {
            None
        };
        Self::create_in(RegistryStore::global(), reflection, config)
    }

    /// Create a registry in an explicit store, with an explicit optional
    /// reflection collaborator.
    pub fn create_in<C, M>(
        store: Arc<RegistryStore>,
        reflection: Option<Arc<dyn ReflectionProvider>>,
        config: RegistryConfig,
    ) -> Result<RegistryHandle<C, M>, RegistryError>
    where
        C: Send + Sync + 'static,
        M: Send + Sync + 'static,
    {
        let id = config.id.clone().unwrap_or_else(generate_id);

        if !store.has(&id) {
            debug!(registry_id = %id, "creating metadata registry record");
        }
        store.ensure::<C, M>(&id)?;

        let reflection = match (config.use_reflection, reflection) {
            (true, Some(provider)) => Some(provider),
            (true, None) => {
                warn!(
                    registry_id = %id,
                    "reflection requested but no ReflectionProvider is available; \
                     falling back to base operations"
                );
                None
            }
            (false, _) => None,
        };

        Ok(RegistryHandle {
            store,
            id,
            merge: config.merge,
            reflection,
            _meta: PhantomData,
        })
    }
}

fn generate_id() -> String {
    format!("registry-{}", Uuid::new_v4())
}

/// Operation set of one registry, closed over its ID.
///
/// The handle holds the registry ID, not the record: every operation
/// re-resolves the record from the store, so it fails with
/// [`RegistryError::NotFound`] if the record was removed out from under it.
///
/// Attachments to the same class or method land in the order the attach
/// operations are called; the engine never reorders them.
pub struct RegistryHandle<C, M> {
    store: Arc<RegistryStore>,
    id: String,
    merge: bool,
    reflection: Option<Arc<dyn ReflectionProvider>>,
    _meta: PhantomData<fn() -> (C, M)>,
}

impl<C, M> Clone for RegistryHandle<C, M> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            id: self.id.clone(),
            merge: self.merge,
            reflection: self.reflection.clone(),
            _meta: PhantomData,
        }
    }
}

impl<C, M> fmt::Debug for RegistryHandle<C, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryHandle")
            .field("id", &self.id)
            .field("merge", &self.merge)
            .field("reflection", &self.reflection.is_some())
            .finish()
    }
}

impl<C, M> RegistryHandle<C, M>
where
    C: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    /// The registry's ID.
    pub fn registry_id(&self) -> &str {
        &self.id
    }

    /// Reflection-augmented operations, when available.
    ///
    /// `None` when the registry was created without reflection or when no
    /// provider was found at creation time.
    pub fn reflect(&self) -> Option<Reflector<'_, C, M>> {
        self.reflection
            .as_ref()
            .map(|provider| Reflector::new(self, provider.clone()))
    }

    fn record(&self) -> Result<Arc<RegistryRecord<C, M>>, RegistryError> {
        self.store.record::<C, M>(&self.id)
    }

    /// Attach metadata to the class `T` under the registry's merge policy.
    pub fn attach_class<T: Any>(&self, metadata: C) -> Result<(), RegistryError> {
        self.attach_class_key(ClassKey::of::<T>(), metadata)
    }

    /// Key-based form of [`attach_class`](Self::attach_class).
    pub fn attach_class_key(&self, class: ClassKey, metadata: C) -> Result<(), RegistryError> {
        self.attach_class_entry(class, ClassEntry::plain(metadata))
    }

    pub(crate) fn attach_class_entry(
        &self,
        class: ClassKey,
        entry: ClassEntry<C>,
    ) -> Result<(), RegistryError> {
        self.record()?.attach_class(class, entry, self.merge);
        Ok(())
    }

    /// Attach metadata to a method of the class `T`.
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
        self.attach_method_entry(class, method, MethodEntry::plain(metadata))
    }

    pub(crate) fn attach_method_entry(
        &self,
        class: ClassKey,
        method: &str,
        entry: MethodEntry<M>,
    ) -> Result<(), RegistryError> {
        self.record()?.attach_method(class, method, entry, self.merge);
        Ok(())
    }

    /// Metadata stored for the class `T`, empty if none.
    pub fn class_metadata<T: Any>(&self) -> Result<Vec<C>, RegistryError>
    where
        C: Clone,
    {
        self.class_metadata_key(ClassKey::of::<T>())
    }

    /// Key-based form of [`class_metadata`](Self::class_metadata).
    pub fn class_metadata_key(&self, class: ClassKey) -> Result<Vec<C>, RegistryError>
    where
        C: Clone,
    {
        Ok(self
            .class_entries_key(class)?
            .into_iter()
            .map(|entry| entry.value)
            .collect())
    }

    /// Metadata stored for the runtime class of `instance`.
    ///
    /// Always equal to [`class_metadata`](Self::class_metadata) for the
    /// instance's concrete type.
    pub fn instance_metadata(&self, instance: &dyn Any) -> Result<Vec<C>, RegistryError>
    where
        C: Clone,
    {
        self.class_metadata_key(ClassKey::of_val(instance))
    }

    /// Stored class entries including their reflection side-channels.
    pub fn class_entries<T: Any>(&self) -> Result<Vec<ClassEntry<C>>, RegistryError>
    where
        C: Clone,
    {
        self.class_entries_key(ClassKey::of::<T>())
    }

    /// Key-based form of [`class_entries`](Self::class_entries).
    pub fn class_entries_key(&self, class: ClassKey) -> Result<Vec<ClassEntry<C>>, RegistryError>
    where
        C: Clone,
    {
        Ok(self.record()?.class_entries(class))
    }

    /// Metadata stored for a method of the class `T`, empty if none.
    pub fn method_metadata<T: Any>(&self, method: &str) -> Result<Vec<M>, RegistryError>
    where
        M: Clone,
    {
        self.method_metadata_key(ClassKey::of::<T>(), method)
    }

    /// Key-based form of [`method_metadata`](Self::method_metadata).
    pub fn method_metadata_key(
        &self,
        class: ClassKey,
        method: &str,
    ) -> Result<Vec<M>, RegistryError>
    where
        M: Clone,
    {
        Ok(self
            .method_entries_key(class, method)?
            .into_iter()
            .map(|entry| entry.value)
            .collect())
    }

    /// Stored method entries including their reflection side-channels.
    pub fn method_entries<T: Any>(&self, method: &str) -> Result<Vec<MethodEntry<M>>, RegistryError>
    where
        M: Clone,
    {
        self.method_entries_key(ClassKey::of::<T>(), method)
    }

    /// Key-based form of [`method_entries`](Self::method_entries).
    pub fn method_entries_key(
        &self,
        class: ClassKey,
        method: &str,
    ) -> Result<Vec<MethodEntry<M>>, RegistryError>
    where
        M: Clone,
    {
        Ok(self.record()?.method_entries(class, method))
    }

    /// Snapshot of all class metadata in this registry.
    pub fn all_class_metadata(&self) -> Result<HashMap<ClassKey, Vec<C>>, RegistryError>
    where
        C: Clone,
    {
        Ok(self
            .record()?
            .all_classes()
            .into_iter()
            .map(|(class, entries)| {
                (class, entries.into_iter().map(|entry| entry.value).collect())
            })
            .collect())
    }

    /// Snapshot of all method metadata in this registry.
    pub fn all_method_metadata(
        &self,
    ) -> Result<HashMap<ClassKey, HashMap<String, Vec<M>>>, RegistryError>
    where
        M: Clone,
    {
        Ok(self
            .record()?
            .all_methods()
            .into_iter()
            .map(|(class, methods)| {
                let methods = methods
                    .into_iter()
                    .map(|(name, entries)| {
                        (name, entries.into_iter().map(|entry| entry.value).collect())
                    })
                    .collect();
                (class, methods)
            })
            .collect())
    }

    /// True iff the class `T` has stored metadata.
    pub fn has_class_metadata<T: Any>(&self) -> Result<bool, RegistryError> {
        self.has_class_metadata_key(ClassKey::of::<T>())
    }

    /// Key-based form of [`has_class_metadata`](Self::has_class_metadata).
    pub fn has_class_metadata_key(&self, class: ClassKey) -> Result<bool, RegistryError> {
        Ok(self.record()?.has_class(class))
    }

    /// True iff the runtime class of `instance` has stored metadata.
    pub fn has_instance_metadata(&self, instance: &dyn Any) -> Result<bool, RegistryError> {
        self.has_class_metadata_key(ClassKey::of_val(instance))
    }

    /// True iff the method has stored metadata.
    pub fn has_method_metadata<T: Any>(&self, method: &str) -> Result<bool, RegistryError> {
        self.has_method_metadata_key(ClassKey::of::<T>(), method)
    }

    /// Key-based form of [`has_method_metadata`](Self::has_method_metadata).
    pub fn has_method_metadata_key(
        &self,
        class: ClassKey,
        method: &str,
    ) -> Result<bool, RegistryError> {
        Ok(self.record()?.has_method(class, method))
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
