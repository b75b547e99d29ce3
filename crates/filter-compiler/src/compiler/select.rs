//! Compiles a whole select request (`where`, `orderBy`, paging, columns)
//! for one model.

use crate::{
    backend::Backend,
    compiler::{order::compile_order, predicate::compile_query},
    error::Result,
    registry::Filterable,
    resolver::{ModelResolver, Resolver},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// The column list that turns a select into a row count.
pub const COUNT_COLUMN: &str = "count(*)";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectQuery {
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(rename = "orderBy", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

impl SelectQuery {
    /// True when the request asks for `count(*)` and nothing else.
    pub fn is_count_only(&self) -> bool {
        matches!(self.columns.as_deref(), Some([column]) if column == COUNT_COLUMN)
    }
}

pub struct CompiledSelect<B: Backend> {
    pub filter: Option<B::Expr>,
    pub order: Option<Vec<B::Sort>>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub count_only: bool,
}

impl<B: Backend> fmt::Debug for CompiledSelect<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSelect")
            .field("filter", &self.filter)
            .field("order", &self.order)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("count_only", &self.count_only)
            .finish()
    }
}

pub fn compile_select<B, R>(
    backend: &B,
    resolver: &R,
    query: &SelectQuery,
) -> Result<CompiledSelect<B>>
where
    B: Backend,
    R: Resolver<B>,
{
    Ok(CompiledSelect {
        filter: compile_query(backend, resolver, query.filter.as_ref())?,
        order: compile_order(backend, resolver, query.order_by.as_ref())?,
        limit: query.limit,
        offset: query.offset,
        count_only: query.is_count_only(),
    })
}

/// Compiles `query` against a model in the process-wide registry. Unlike
/// the filter and order entry points the model must exist even when the
/// query carries no filter.
pub fn compile_select_for_model<B: Backend>(
    backend: &B,
    model: &str,
    query: &SelectQuery,
) -> Result<CompiledSelect<B>> {
    debug!(model, count_only = query.is_count_only(), "compiling select query");
    let resolver = ModelResolver::for_model(model)?;
    compile_select(backend, &resolver, query)
}

pub fn compile_select_for<M: Filterable, B: Backend>(
    backend: &B,
    query: &SelectQuery,
) -> Result<CompiledSelect<B>> {
    compile_select_for_model(backend, M::MODEL_NAME, query)
}
