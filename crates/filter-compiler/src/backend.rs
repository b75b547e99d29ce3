//! The capability interface a storage/query-builder layer offers to the
//! compiler. Compiled filters and sorts are opaque values of this trait's
//! associated types; the compiler only ever calls the methods below.

use crate::operator::FieldOp;
use serde_json::Value;
use std::fmt;

pub trait Backend {
    /// Operands and predicates share one expression type, so a `$ref` operand
    /// or a nested predicate can appear on the right-hand side of a comparison.
    type Expr: Clone + fmt::Debug + 'static;

    /// One item of a compiled sort list.
    type Sort: fmt::Debug;

    /// Operand for `column`, qualified by `table` when the model has a
    /// backing storage model.
    fn column(&self, table: Option<&str>, column: &str) -> Self::Expr;

    /// A literal right-hand operand.
    fn literal(&self, value: &Value) -> Self::Expr;

    /// `left <op> right` for `eq`, `neq`, `gt`, `gte`, `lt`, `lte` and `like`.
    fn compare(&self, op: FieldOp, left: Self::Expr, right: Self::Expr) -> Self::Expr;

    /// `left in values` / `left has values`; `values` is passed through as
    /// it appeared in the document.
    fn membership(&self, op: FieldOp, left: Self::Expr, values: &Value) -> Self::Expr;

    /// `SELECT key FROM table WHERE filter` as a selectable expression.
    fn subquery(&self, table: &str, key: &str, filter: Self::Expr) -> Self::Expr;

    /// `left IN (subquery)`.
    fn in_subquery(&self, left: Self::Expr, subquery: Self::Expr) -> Self::Expr;

    fn and(&self, operands: Vec<Self::Expr>) -> Self::Expr;

    fn or(&self, operands: Vec<Self::Expr>) -> Self::Expr;

    fn not(&self, operand: Self::Expr) -> Self::Expr;

    fn asc(&self, operand: Self::Expr) -> Self::Sort;

    fn desc(&self, operand: Self::Expr) -> Self::Sort;
}

/// The value handed to a custom field compiler.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument<E> {
    /// Compiled right-hand side of a comparison (`eq` .. `like`).
    Operand(E),
    /// Raw document value of a membership test (`in`, `has`).
    Raw(Value),
}
