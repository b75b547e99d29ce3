//! Declarative model definitions loaded from JSON.
//!
//! ```json
//! {
//!   "models": [{
//!     "name": "users",
//!     "table": "app_users",
//!     "fields": [
//!       { "kind": "plain", "name": "email", "operators": ["eq", "like"] },
//!       { "kind": "relation", "name": "tag", "match": "id",
//!         "table": "tags", "key": "user_id", "value": "name" }
//!     ]
//!   }]
//! }
//! ```
//!
//! Custom fields carry code and are registered through the Rust API.

use crate::{
    operator::FieldOp,
    registry::{
        FilterRegistry, StorageModel,
        descriptor::{FieldDescriptor, PlainField, RelationField},
        update_global,
    },
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, str::FromStr};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model {0:?} is defined more than once")]
    DuplicateModel(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub table: String,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

fn default_primary_key() -> String {
    "id".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldConfig {
    Plain {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        operators: Vec<FieldOp>,
    },
    Relation {
        name: String,
        #[serde(rename = "match")]
        match_field: String,
        table: String,
        key: String,
        value: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        operators: Vec<FieldOp>,
    },
}

impl FieldConfig {
    pub fn name(&self) -> &str {
        match self {
            FieldConfig::Plain { name, .. } | FieldConfig::Relation { name, .. } => name,
        }
    }

    pub fn descriptor(&self) -> FieldDescriptor {
        match self {
            FieldConfig::Plain {
                column, operators, ..
            } => FieldDescriptor::Plain(PlainField {
                column: column.clone(),
                operators: operators.clone(),
            }),
            FieldConfig::Relation {
                match_field,
                table,
                key,
                value,
                operators,
                ..
            } => FieldDescriptor::Relation(
                RelationField::new(match_field, table, key, value)
                    .with_operators(operators.iter().copied()),
            ),
        }
    }
}

impl FilterConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        raw.parse()
    }

    pub fn model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Binds every model and registers its fields, in definition order.
    pub fn register_into(&self, registry: &mut FilterRegistry) {
        for model in &self.models {
            registry.bind_model(
                &model.name,
                StorageModel::new(&model.table, &model.primary_key),
            );
            for field in &model.fields {
                registry.register_field(&model.name, field.name(), field.descriptor());
            }
        }
        info!(models = self.models.len(), "registered filter models");
    }

    pub fn register_global(&self) {
        update_global(|registry| self.register_into(registry));
    }

    pub fn to_registry(&self) -> FilterRegistry {
        let mut registry = FilterRegistry::new();
        self.register_into(&mut registry);
        registry
    }

    fn validate(self) -> Result<Self, ConfigError> {
        for (i, model) in self.models.iter().enumerate() {
            if self.models[..i].iter().any(|m| m.name == model.name) {
                return Err(ConfigError::DuplicateModel(model.name.clone()));
            }
        }
        Ok(self)
    }
}

impl FromStr for FilterConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: FilterConfig = serde_json::from_str(s)?;
        config.validate()
    }
}
