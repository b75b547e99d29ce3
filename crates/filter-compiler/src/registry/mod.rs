//! Per-model filter metadata: which fields are filterable and how.
//!
//! Models are registered once at startup and looked up by name at compile
//! time. [`FilterRegistry`] can be used on its own; the free functions in
//! this module operate on one process-wide instance.

pub mod descriptor;

use crate::{
    error::{FilterError, Result},
    resolver::ModelResolver,
};
use descriptor::FieldDescriptor;
use lazy_static::lazy_static;
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, PoisonError, RwLock},
};
use tracing::debug;

/// The table a filter-model reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageModel {
    pub table: String,
    pub primary_key: String,
}

impl StorageModel {
    pub fn new(table: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            primary_key: primary_key.into(),
        }
    }
}

/// A Rust type that acts as a filter-model.
pub trait Filterable {
    const MODEL_NAME: &'static str;
}

#[derive(Debug, Clone, Default)]
pub struct ModelFilterMetadata {
    /// `None` when the filter-model is itself the storage model.
    pub model: Option<StorageModel>,
    fields: BTreeMap<String, FieldDescriptor>,
}

impl ModelFilterMetadata {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(name, desc)| (name.as_str(), desc))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct FilterRegistry {
    models: HashMap<String, Arc<ModelFilterMetadata>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `model` to its backing storage model.
    pub fn bind_model(&mut self, model: &str, storage: StorageModel) {
        debug!(model, table = %storage.table, "binding filter model");
        Arc::make_mut(self.entry(model)).model = Some(storage);
    }

    /// Registers `field` on `model`. A later registration of the same field
    /// replaces the earlier one; other fields are kept.
    pub fn register_field(&mut self, model: &str, field: &str, descriptor: FieldDescriptor) {
        debug!(model, field, kind = descriptor.kind(), "registering filterable field");
        Arc::make_mut(self.entry(model))
            .fields
            .insert(field.to_string(), descriptor);
    }

    pub fn metadata(&self, model: &str) -> Option<Arc<ModelFilterMetadata>> {
        self.models.get(model).cloned()
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    pub fn model_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds a resolver over a snapshot of `model`'s metadata.
    pub fn resolver(&self, model: &str) -> Result<ModelResolver> {
        let metadata = self
            .metadata(model)
            .ok_or_else(|| FilterError::MissingModelMetadata(model.to_string()))?;
        Ok(ModelResolver::new(model, metadata))
    }

    fn entry(&mut self, model: &str) -> &mut Arc<ModelFilterMetadata> {
        self.models.entry(model.to_string()).or_default()
    }
}

lazy_static! {
    static ref GLOBAL_REGISTRY: RwLock<FilterRegistry> = RwLock::new(FilterRegistry::new());
}

/// Runs `f` with exclusive access to the process-wide registry.
pub fn update_global<R>(f: impl FnOnce(&mut FilterRegistry) -> R) -> R {
    let mut registry = GLOBAL_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    f(&mut registry)
}

/// Runs `f` with shared access to the process-wide registry.
pub fn read_global<R>(f: impl FnOnce(&FilterRegistry) -> R) -> R {
    let registry = GLOBAL_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    f(&registry)
}

pub fn register_model<M: Filterable>(storage: StorageModel) {
    update_global(|registry| registry.bind_model(M::MODEL_NAME, storage));
}

pub fn register_field<M: Filterable>(field: &str, descriptor: FieldDescriptor) {
    update_global(|registry| registry.register_field(M::MODEL_NAME, field, descriptor));
}

/// Snapshot of a model's metadata in the process-wide registry.
pub fn metadata_for(model: &str) -> Option<Arc<ModelFilterMetadata>> {
    read_global(|registry| registry.metadata(model))
}
