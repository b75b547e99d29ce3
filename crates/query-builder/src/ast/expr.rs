//! Defines the AST for SQL expressions.

use crate::ast::select::Select;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column or table identifier, e.g., `users` or `users.id`.
    Identifier(Ident),

    /// A literal value, rendered as a bind parameter.
    Value(Value),

    /// A binary comparison, e.g., `column = 'value'` or `a <= b`.
    BinaryOp(Box<BinaryOp>),

    /// An n-ary `AND` / `OR` group, e.g., `(a = 1 AND b = 2 AND c = 3)`.
    Logical(Logical),

    /// Negation of a boolean expression.
    Not(Box<Expr>),

    /// `expr IN (v1, v2, ...)`; each list item becomes a bind parameter.
    InList { expr: Box<Expr>, list: Vec<Value> },

    /// `expr IN (SELECT ...)`
    InSubquery {
        expr: Box<Expr>,
        subquery: Box<Select>,
    },

    /// A parenthesised scalar or row subquery, e.g. `(SELECT ...)`.
    Subquery(Box<Select>),

    /// Array / JSON containment, e.g. `tags @> $1`.
    Contains { expr: Box<Expr>, value: Value },

    /// A function call, e.g., `COUNT(*)` or `MAX(price)`.
    FunctionCall(FunctionCall),

    /// The `*` of `COUNT(*)`.
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub qualifier: Option<String>, // e.g., the 'users' in 'users.id'
    pub name: String,              // e.g., the 'id' in 'users.id'
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Logical {
    pub op: LogicalOperator,
    pub operands: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,    // =
    NotEq, // <>
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=
    Like,  // LIKE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl Expr {
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
    }

    pub fn and(operands: Vec<Expr>) -> Self {
        Expr::Logical(Logical {
            op: LogicalOperator::And,
            operands,
        })
    }

    pub fn or(operands: Vec<Expr>) -> Self {
        Expr::Logical(Logical {
            op: LogicalOperator::Or,
            operands,
        })
    }

    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Expr::FunctionCall(FunctionCall {
            name: name.to_string(),
            args,
        })
    }

    /// `COUNT(*)`
    pub fn count_all() -> Self {
        Expr::call("COUNT", vec![Expr::Wildcard])
    }

    pub fn negate(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// `self IN (subquery)`. Anything other than a subquery is compared
    /// for equality.
    pub fn in_subquery(self, subquery: Expr) -> Self {
        match subquery {
            Expr::Subquery(select) => Expr::InSubquery {
                expr: Box::new(self),
                subquery: select,
            },
            other => Expr::binary(self, BinaryOperator::Eq, other),
        }
    }
}
