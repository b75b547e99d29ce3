//! Assembles compiled selects into `SELECT` statements and renders them.

use crate::backend::SqlBackend;
use filter_compiler::{CompiledSelect, StorageModel};
use query_builder::{
    ast::{
        expr::Expr,
        select::{OrderByExpr, Select},
    },
    build::select::SelectBuilder,
    dialect::Dialect,
    render::{Render, Renderer, render_with},
    table_ref, value,
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::trace;

/// Rendered SQL with its bind parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl From<(String, Vec<Value>)> for Statement {
    fn from((sql, params): (String, Vec<Value>)) -> Self {
        Self { sql, params }
    }
}

/// `SELECT * FROM table ...`, or `SELECT COUNT(*) ...` for a count-only
/// request. A count ignores ordering and paging.
pub fn select_statement(model: &StorageModel, compiled: CompiledSelect<SqlBackend>) -> Select {
    let columns = if compiled.count_only {
        vec![Expr::count_all()]
    } else {
        vec![]
    };

    let builder = SelectBuilder::new()
        .select(columns)
        .from(table_ref!(model.table))
        .where_opt(compiled.filter);

    if compiled.count_only {
        return builder.build();
    }

    let mut builder = builder.order_by_all(compiled.order.unwrap_or_default());
    if let Some(limit) = compiled.limit {
        builder = builder.limit(value(json!(limit)));
    }
    if let Some(offset) = compiled.offset {
        builder = builder.offset(value(json!(offset)));
    }
    builder.build()
}

pub fn render_select(select: &Select, dialect: &dyn Dialect) -> Statement {
    let statement = Statement::from(render_with(select, dialect));
    trace!(dialect = %dialect.name(), sql = %statement.sql, "rendered select");
    statement
}

/// Renders a compiled filter as a standalone `WHERE` condition.
pub fn render_where(filter: &Expr, dialect: &dyn Dialect) -> Statement {
    render_with(filter, dialect).into()
}

/// Renders sort items as the body of an `ORDER BY` clause.
pub fn render_order(sorts: &[OrderByExpr], dialect: &dyn Dialect) -> Statement {
    let mut renderer = Renderer::new(dialect);
    for (i, sort) in sorts.iter().enumerate() {
        if i > 0 {
            renderer.sql.push_str(", ");
        }
        sort.render(&mut renderer);
    }
    renderer.finish().into()
}
