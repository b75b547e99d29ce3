//! Compiles JSON filter and sort documents into predicate and sort trees
//! for a pluggable query-building [`Backend`].
//!
//! A filter document is a nested mapping such as
//!
//! ```json
//! { "$and": [ { "$in": { "a": [1, 2] } }, { "$like": { "b": "test%" } } ] }
//! ```
//!
//! Keys starting with `$` are operators, any other key is a field name
//! compared for equality. Field names are resolved through the
//! [`FilterRegistry`](registry::FilterRegistry), where each filterable field
//! is declared as a plain column, a relation subquery or a custom compiler.

pub mod backend;
pub mod compiler;
pub mod config;
pub mod error;
pub mod operator;
pub mod registry;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{Argument, Backend};
pub use compiler::{
    order::{compile_order, compile_order_for, compile_order_for_model},
    predicate::{PredicateCompiler, compile_query, compile_where_for, compile_where_for_model},
    select::{
        COUNT_COLUMN, CompiledSelect, SelectQuery, compile_select, compile_select_for,
        compile_select_for_model,
    },
};
pub use config::{ConfigError, FilterConfig};
pub use error::{FilterError, Result};
pub use operator::{FieldOp, Operator, SortDirection};
pub use registry::{
    Filterable, FilterRegistry, ModelFilterMetadata, StorageModel,
    descriptor::{CustomField, FieldDescriptor, PlainField, RelationField},
};
pub use resolver::{FieldOperand, ModelResolver, Resolver};
