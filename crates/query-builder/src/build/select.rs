//! Provides a type-safe, fluent builder for constructing `Select` ASTs.

// --- Typestate Marker Structs ---
// Zero-sized states that force `select -> from -> clauses` ordering.

use crate::ast::{
    common::TableRef,
    expr::Expr,
    select::{FromClause, OrderByExpr, Select},
};
use std::marker::PhantomData;

/// The initial state of the builder before any clauses have been added.
#[derive(Debug, Default, Clone)]
pub struct InitialState;

/// The state after the `SELECT` clause has been added.
#[derive(Debug, Default, Clone)]
pub struct SelectState;

/// The state after the `FROM` clause has been added.
#[derive(Debug, Default, Clone)]
pub struct FromState;

// --- The Main Builder ---

#[derive(Debug, Clone)]
pub struct SelectBuilder<State> {
    ast: Select,
    _state: PhantomData<State>,
}

impl Default for SelectBuilder<InitialState> {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectBuilder<InitialState> {
    pub fn new() -> Self {
        Self {
            ast: Select::default(),
            _state: PhantomData,
        }
    }

    /// Adds a `SELECT` clause with a list of columns.
    pub fn select(mut self, columns: Vec<Expr>) -> SelectBuilder<SelectState> {
        self.ast.columns = columns;
        SelectBuilder {
            ast: self.ast,
            _state: PhantomData,
        }
    }
}

impl SelectBuilder<SelectState> {
    /// Adds a `FROM` clause specifying the primary table.
    pub fn from(mut self, table: TableRef) -> SelectBuilder<FromState> {
        self.ast.from = Some(FromClause { table });
        SelectBuilder {
            ast: self.ast,
            _state: PhantomData,
        }
    }
}

impl SelectBuilder<FromState> {
    /// Sets the `WHERE` condition, replacing any previous one.
    pub fn where_clause(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(condition);
        self
    }

    /// Like [`where_clause`](Self::where_clause), but a `None` condition leaves
    /// the query unfiltered.
    pub fn where_opt(mut self, condition: Option<Expr>) -> Self {
        self.ast.where_clause = condition;
        self
    }

    /// Appends already-built `ORDER BY` items, keeping their order.
    pub fn order_by_all(mut self, items: impl IntoIterator<Item = OrderByExpr>) -> Self {
        self.ast.order_by.extend(items);
        self
    }

    pub fn limit(mut self, limit: Expr) -> Self {
        self.ast.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: Expr) -> Self {
        self.ast.offset = Some(offset);
        self
    }

    /// Finalizes and returns the constructed `Select` AST.
    pub fn build(self) -> Select {
        self.ast
    }
}
