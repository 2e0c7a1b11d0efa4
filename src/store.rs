//! Process-wide registry store and per-registry records.
//!
//! The [`RegistryStore`] is the sole owner of all registry records. It only
//! exposes storage primitives; record creation is driven by the factory in
//! [`crate::registry`]. Records are stored type-erased so registries with
//! different metadata shapes can share one store.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::error::RegistryError;
use crate::key::ClassKey;
use crate::reflect::{ReflectedClass, ReflectedMethod};

/// One stored class metadata entry.
///
/// `reflected` is the side-channel filled in by reflection-augmented
/// attachment; plain attachments leave it `None`. The caller's original
/// metadata shape in `value` is never altered.
#[derive(Debug, Clone)]
pub struct ClassEntry<C> {
    pub value: C,
    pub reflected: Option<ReflectedClass>,
}

impl<C> ClassEntry<C> {
    /// Entry without reflection information.
    pub fn plain(value: C) -> Self {
        Self {
            value,
            reflected: None,
        }
    }
}

/// One stored method metadata entry.
#[derive(Debug, Clone)]
pub struct MethodEntry<M> {
    pub value: M,
    pub reflected: Option<ReflectedMethod>,
}

impl<M> MethodEntry<M> {
    /// Entry without reflection information.
    pub fn plain(value: M) -> Self {
        Self {
            value,
            reflected: None,
        }
    }
}

/// Backing record of a single registry.
///
/// Holds class metadata keyed by class identity and method metadata keyed by
/// owning class identity and method name. Each metadata list preserves
/// attachment order, oldest first. Both maps sit behind their own `RwLock` so
/// an attach (a read-modify-write of one list) is atomic under threads.
pub struct RegistryRecord<C, M> {
    classes: RwLock<HashMap<ClassKey, Vec<ClassEntry<C>>>>,
    methods: RwLock<HashMap<ClassKey, HashMap<String, Vec<MethodEntry<M>>>>>,
}

impl<C, M> RegistryRecord<C, M> {
    /// Create an empty record.
    pub fn new() -> Self {
        Self {
            classes: RwLock::new(HashMap::new()),
            methods: RwLock::new(HashMap::new()),
        }
    }

    /// Attach a class metadata entry under the registry's merge policy.
    ///
    /// With `merge` the entry is appended (newest last); without it the
    /// stored list is replaced by a one-element list holding only this entry.
    pub fn attach_class(&self, class: ClassKey, entry: ClassEntry<C>, merge: bool) {
        let mut classes = self.classes.write();
        let list = classes.entry(class).or_default();
        if !merge {
            list.clear();
        }
        list.push(entry);
    }

    /// Attach a method metadata entry under the registry's merge policy.
    pub fn attach_method(
        &self,
        class: ClassKey,
        method: impl Into<String>,
        entry: MethodEntry<M>,
        merge: bool,
    ) {
        let mut methods = self.methods.write();
        let list = methods.entry(class).or_default().entry(method.into()).or_default();
        if !merge {
            list.clear();
        }
        list.push(entry);
    }

    /// Stored entries for a class, empty if none.
    pub fn class_entries(&self, class: ClassKey) -> Vec<ClassEntry<C>>
    where
        C: Clone,
    {
        self.classes.read().get(&class).cloned().unwrap_or_default()
    }

    /// Stored entries for a method, empty if none.
    pub fn method_entries(&self, class: ClassKey, method: &str) -> Vec<MethodEntry<M>>
    where
        M: Clone,
    {
        self.methods
            .read()
            .get(&class)
            .and_then(|methods| methods.get(method))
            .cloned()
            .unwrap_or_default()
    }

    /// True iff the class has at least one stored entry.
    pub fn has_class(&self, class: ClassKey) -> bool {
        self.classes.read().get(&class).is_some_and(|list| !list.is_empty())
    }

    /// True iff the method has at least one stored entry.
    pub fn has_method(&self, class: ClassKey, method: &str) -> bool {
        self.methods
            .read()
            .get(&class)
            .and_then(|methods| methods.get(method))
            .is_some_and(|list| !list.is_empty())
    }

    /// Snapshot of the full class mapping.
    pub fn all_classes(&self) -> HashMap<ClassKey, Vec<ClassEntry<C>>>
    where
        C: Clone,
    {
        self.classes.read().clone()
    }

    /// Snapshot of the full method mapping.
    pub fn all_methods(&self) -> HashMap<ClassKey, HashMap<String, Vec<MethodEntry<M>>>>
    where
        M: Clone,
    {
        self.methods.read().clone()
    }
}

impl<C, M> Default for RegistryRecord<C, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, M> fmt::Debug for RegistryRecord<C, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryRecord")
            .field("classes", &self.classes.read().len())
            .field("methods", &self.methods.read().len())
            .finish()
    }
}

/// Table of registry records, addressable by ID.
///
/// Mutating one registry's record never affects another's; records never
/// share storage. The store itself never creates records on lookup —
/// [`get`](Self::get) on an unknown ID is a hard failure.
pub struct RegistryStore {
    records: DashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl RegistryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// The process-wide store used by [`MetadataFactory::create`].
    ///
    /// [`MetadataFactory::create`]: crate::MetadataFactory::create
    pub fn global() -> Arc<RegistryStore> {
        static GLOBAL: OnceLock<Arc<RegistryStore>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(RegistryStore::new())).clone()
    }

    /// Register a record under an ID, replacing any existing one.
    pub fn set<C, M>(&self, id: impl Into<String>, record: Arc<RegistryRecord<C, M>>)
    where
        C: Send + Sync + 'static,
        M: Send + Sync + 'static,
    {
        self.records.insert(id.into(), record);
    }

    /// Check whether a record exists for an ID.
    pub fn has(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Get the type-erased record for an ID.
    pub fn get(&self, id: &str) -> Result<Arc<dyn Any + Send + Sync>, RegistryError> {
        self.records
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Get the record for an ID with its metadata types restored.
    pub fn record<C, M>(&self, id: &str) -> Result<Arc<RegistryRecord<C, M>>, RegistryError>
    where
        C: Send + Sync + 'static,
        M: Send + Sync + 'static,
    {
        downcast_record(self.get(id)?, id)
    }

    /// Get the record for an ID, creating an empty one if absent.
    ///
    /// Creation is idempotent by ID: an existing record is returned as-is,
    /// or rejected with [`RegistryError::TypeMismatch`] when it was created
    /// under different metadata types.
    pub fn ensure<C, M>(&self, id: &str) -> Result<Arc<RegistryRecord<C, M>>, RegistryError>
    where
        C: Send + Sync + 'static,
        M: Send + Sync + 'static,
    {
        let record = self
            .records
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(RegistryRecord::<C, M>::new()) as Arc<dyn Any + Send + Sync>)
            .value()
            .clone();
        downcast_record(record, id)
    }

    /// Remove all records. Intended for test isolation.
    pub fn clear(&self) {
        self.records.clear();
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast_record<C, M>(
    record: Arc<dyn Any + Send + Sync>,
    id: &str,
) -> Result<Arc<RegistryRecord<C, M>>, RegistryError>
where
    C: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    record
        .downcast::<RegistryRecord<C, M>>()
        .map_err(|_| RegistryError::TypeMismatch {
            id: id.to_string(),
            expected: std::any::type_name::<RegistryRecord<C, M>>(),
        })
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
