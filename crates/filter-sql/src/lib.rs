//! SQL rendering of compiled filters.
//!
//! [`SqlBackend`] plugs the query-builder AST into the filter compiler:
//! fields become (table-qualified) identifiers, literals become bind
//! parameters and relation fields become `IN (SELECT ...)` subqueries.

pub mod backend;
pub mod statement;

pub use backend::SqlBackend;
pub use statement::{Statement, render_order, render_select, render_where, select_statement};
