//! Turns a field name from a document into something operations can be
//! applied to.
//!
//! [`ModelResolver`] resolves through a model's registered descriptors. Any
//! `Fn(&str) -> Option<B::Expr>` is also a resolver, which is handy for
//! ad-hoc compilation without a registry.

use crate::{
    backend::{Argument, Backend},
    error::{FilterError, Result},
    operator::FieldOp,
    registry::{
        ModelFilterMetadata, StorageModel,
        descriptor::{CustomField, FieldDescriptor, PlainField, RelationField},
        metadata_for,
    },
};
use serde_json::Value;
use std::sync::Arc;

pub trait Resolver<B: Backend> {
    fn resolve<'a>(&'a self, backend: &B, field: &'a str) -> Result<FieldOperand<'a, B>>;
}

impl<B, F> Resolver<B> for F
where
    B: Backend,
    F: Fn(&str) -> Option<B::Expr>,
{
    fn resolve<'a>(&'a self, _backend: &B, field: &'a str) -> Result<FieldOperand<'a, B>> {
        let operand = self(field).ok_or_else(|| FilterError::MissingFieldInfo(field.to_string()))?;
        Ok(FieldOperand::Plain {
            field,
            operand,
            plain: None,
        })
    }
}

/// A resolved field, ready to have one operation applied to it.
pub enum FieldOperand<'a, B: Backend> {
    Plain {
        field: &'a str,
        operand: B::Expr,
        /// The registered descriptor; ad-hoc resolvers have none and permit
        /// every operation.
        plain: Option<&'a PlainField>,
    },
    Relation {
        field: &'a str,
        /// The backing model's match column.
        local: B::Expr,
        relation: &'a RelationField,
    },
    Custom {
        field: &'a str,
        /// The backing model's primary key.
        primary: B::Expr,
        custom: &'a CustomField,
    },
}

impl<'a, B: Backend> FieldOperand<'a, B> {
    pub fn field(&self) -> &'a str {
        match self {
            FieldOperand::Plain { field, .. }
            | FieldOperand::Relation { field, .. }
            | FieldOperand::Custom { field, .. } => *field,
        }
    }

    /// `field <op> rhs` for one of the comparison operations.
    pub fn compare(self, backend: &B, op: FieldOp, rhs: B::Expr) -> Result<B::Expr> {
        self.apply(backend, op, Argument::Operand(rhs))
    }

    /// `field in values` / `field has values`.
    pub fn membership(self, backend: &B, op: FieldOp, values: &Value) -> Result<B::Expr> {
        self.apply(backend, op, Argument::Raw(values.clone()))
    }

    /// The field's operand on its own, for `$ref` and order keys. Only plain
    /// fields have one; `purpose` names the use in the error.
    pub fn into_operand(self, purpose: &str) -> Result<B::Expr> {
        match self {
            FieldOperand::Plain { operand, .. } => Ok(operand),
            FieldOperand::Relation { field, .. } | FieldOperand::Custom { field, .. } => {
                Err(unsupported(field, purpose))
            }
        }
    }

    pub fn apply(self, backend: &B, op: FieldOp, arg: Argument<B::Expr>) -> Result<B::Expr> {
        match self {
            FieldOperand::Plain {
                field,
                operand,
                plain,
            } => {
                if plain.is_some_and(|plain| !plain.permits(op)) {
                    return Err(unsupported(field, op.as_str()));
                }
                Ok(apply_direct(backend, operand, op, arg))
            }
            FieldOperand::Relation {
                field,
                local,
                relation,
            } => {
                if !relation.permits(op) {
                    return Err(unsupported(field, op.as_str()));
                }
                let value = backend.column(Some(&relation.table), &relation.value);
                let filter = apply_direct(backend, value, op, arg);
                let subquery = backend.subquery(&relation.table, &relation.key, filter);
                Ok(backend.in_subquery(local, subquery))
            }
            FieldOperand::Custom {
                field,
                primary,
                custom,
            } => {
                if !custom.supports(op) {
                    return Err(unsupported(field, op.as_str()));
                }
                let compiler =
                    custom
                        .compiler::<B::Expr>(op)
                        .ok_or_else(|| FilterError::BackendMismatch {
                            field: field.to_string(),
                        })?;
                Ok(compiler(primary, op, arg))
            }
        }
    }
}

fn apply_direct<B: Backend>(
    backend: &B,
    operand: B::Expr,
    op: FieldOp,
    arg: Argument<B::Expr>,
) -> B::Expr {
    match arg {
        Argument::Operand(rhs) => backend.compare(op, operand, rhs),
        Argument::Raw(values) => backend.membership(op, operand, &values),
    }
}

fn unsupported(field: &str, operator: &str) -> FilterError {
    FilterError::UnsupportedFieldOperator {
        field: field.to_string(),
        operator: operator.to_string(),
    }
}

/// Resolves field names through one model's registered descriptors.
#[derive(Debug, Clone)]
pub struct ModelResolver {
    model: String,
    metadata: Arc<ModelFilterMetadata>,
}

impl ModelResolver {
    pub fn new(model: impl Into<String>, metadata: Arc<ModelFilterMetadata>) -> Self {
        Self {
            model: model.into(),
            metadata,
        }
    }

    /// Resolver over the process-wide registry's snapshot of `model`.
    pub fn for_model(model: &str) -> Result<Self> {
        let metadata =
            metadata_for(model).ok_or_else(|| FilterError::MissingModelMetadata(model.to_string()))?;
        Ok(Self::new(model, metadata))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn metadata(&self) -> &ModelFilterMetadata {
        &self.metadata
    }

    fn storage(&self) -> Result<&StorageModel> {
        self.metadata
            .model
            .as_ref()
            .ok_or_else(|| FilterError::MissingModelMetadata(self.model.clone()))
    }
}

impl<B: Backend> Resolver<B> for ModelResolver {
    fn resolve<'a>(&'a self, backend: &B, field: &'a str) -> Result<FieldOperand<'a, B>> {
        let descriptor = self
            .metadata
            .field(field)
            .ok_or_else(|| FilterError::MissingFieldInfo(field.to_string()))?;

        let operand = match descriptor {
            FieldDescriptor::Plain(plain) => {
                let table = self.metadata.model.as_ref().map(|m| m.table.as_str());
                let column = plain.column.as_deref().unwrap_or(field);
                FieldOperand::Plain {
                    field,
                    operand: backend.column(table, column),
                    plain: Some(plain),
                }
            }
            FieldDescriptor::Relation(relation) => {
                let storage = self.storage()?;
                FieldOperand::Relation {
                    field,
                    local: backend.column(Some(&storage.table), &relation.match_field),
                    relation,
                }
            }
            FieldDescriptor::Custom(custom) => {
                let storage = self.storage()?;
                FieldOperand::Custom {
                    field,
                    primary: backend.column(Some(&storage.table), &storage.primary_key),
                    custom,
                }
            }
        };
        Ok(operand)
    }
}
