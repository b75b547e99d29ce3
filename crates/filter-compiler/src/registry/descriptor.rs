//! How a filterable field name turns into predicates.

use crate::{backend::Argument, operator::FieldOp};
use std::{any::Any, collections::HashMap, fmt, sync::Arc};

#[derive(Debug, Clone)]
pub enum FieldDescriptor {
    Plain(PlainField),
    Relation(RelationField),
    Custom(CustomField),
}

impl FieldDescriptor {
    /// A plain field stored in a column of the same name.
    pub fn plain() -> Self {
        FieldDescriptor::Plain(PlainField::default())
    }

    /// A plain field stored in `column`.
    pub fn column(column: impl Into<String>) -> Self {
        FieldDescriptor::Plain(PlainField {
            column: Some(column.into()),
            operators: Vec::new(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldDescriptor::Plain(_) => "plain",
            FieldDescriptor::Relation(_) => "relation",
            FieldDescriptor::Custom(_) => "custom",
        }
    }
}

/// A field backed directly by a column of the storage model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlainField {
    /// Backing column when it differs from the field name.
    pub column: Option<String>,
    /// Permitted operations; empty permits all.
    pub operators: Vec<FieldOp>,
}

impl PlainField {
    pub fn permits(&self, op: FieldOp) -> bool {
        permits(&self.operators, op)
    }
}

/// A field whose values live in another table:
/// `match_field IN (SELECT key FROM table WHERE value <op> ...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationField {
    /// Column of the backing model matched against the subquery.
    pub match_field: String,
    pub table: String,
    /// Column of `table` selected by the subquery.
    pub key: String,
    /// Column of `table` the requested operation is applied to.
    pub value: String,
    /// Permitted operations; empty permits all.
    pub operators: Vec<FieldOp>,
}

impl RelationField {
    pub fn new(
        match_field: impl Into<String>,
        table: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            match_field: match_field.into(),
            table: table.into(),
            key: key.into(),
            value: value.into(),
            operators: Vec::new(),
        }
    }

    pub fn with_operators(mut self, operators: impl IntoIterator<Item = FieldOp>) -> Self {
        self.operators = operators.into_iter().collect();
        self
    }

    pub fn permits(&self, op: FieldOp) -> bool {
        permits(&self.operators, op)
    }
}

fn permits(whitelist: &[FieldOp], op: FieldOp) -> bool {
    whitelist.is_empty() || whitelist.contains(&op)
}

/// Signature of a custom field compiler: receives the backing model's
/// primary-key operand, the requested operation and its argument.
pub type CompilerFn<E> = dyn Fn(E, FieldOp, Argument<E>) -> E + Send + Sync;

struct Compiler<E: 'static>(Box<CompilerFn<E>>);

/// A field compiled by user code, one compiler per supported operation.
///
/// Compilers are stored type-erased so the registry stays independent of
/// the backend; they are recovered by expression type at compile time.
#[derive(Clone, Default)]
pub struct CustomField {
    compilers: HashMap<FieldOp, Arc<dyn Any + Send + Sync>>,
}

impl CustomField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `compiler` for `op`, replacing any previous one.
    pub fn on<E, F>(mut self, op: FieldOp, compiler: F) -> Self
    where
        E: 'static,
        F: Fn(E, FieldOp, Argument<E>) -> E + Send + Sync + 'static,
    {
        self.compilers
            .insert(op, Arc::new(Compiler::<E>(Box::new(compiler))));
        self
    }

    pub fn supports(&self, op: FieldOp) -> bool {
        self.compilers.contains_key(&op)
    }

    /// Supported operations in a stable order.
    pub fn operations(&self) -> Vec<FieldOp> {
        let mut ops: Vec<FieldOp> = self.compilers.keys().copied().collect();
        ops.sort_by_key(|op| op.as_str());
        ops
    }

    /// The compiler for `op` if one is registered for expression type `E`.
    pub(crate) fn compiler<E: 'static>(&self, op: FieldOp) -> Option<&CompilerFn<E>> {
        self.compilers
            .get(&op)
            .and_then(|c| c.downcast_ref::<Compiler<E>>())
            .map(|c| c.0.as_ref())
    }
}

impl fmt::Debug for CustomField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomField")
            .field("operations", &self.operations())
            .finish()
    }
}
