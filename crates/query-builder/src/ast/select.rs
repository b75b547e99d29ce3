//! AST for the `SELECT` statements a compiled filter is embedded into:
//! the outer query of a filter-model and the key-column subqueries
//! generated for relation-backed fields.

use crate::ast::{
    common::{OrderDir, TableRef},
    expr::Expr,
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Select {
    /// Projected columns or expressions, e.g. `"tags"."user_id"`, `COUNT(*)`.
    pub columns: Vec<Expr>,

    pub from: Option<FromClause>,

    pub where_clause: Option<Expr>,

    pub order_by: Vec<OrderByExpr>,

    pub limit: Option<Expr>,

    pub offset: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub table: TableRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub direction: OrderDir,
}

impl OrderByExpr {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            direction: OrderDir::Asc,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            direction: OrderDir::Desc,
        }
    }
}
