use filter_compiler::{Backend, FieldOp};
use query_builder::{
    ast::{
        expr::{BinaryOperator, Expr},
        select::OrderByExpr,
    },
    build::select::SelectBuilder,
    ident, qual_ident, table_ref, value,
};
use serde_json::Value;

/// Compiles filters into the query-builder AST.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlBackend;

impl SqlBackend {
    fn binary_operator(op: FieldOp) -> Option<BinaryOperator> {
        match op {
            FieldOp::Eq => Some(BinaryOperator::Eq),
            FieldOp::Neq => Some(BinaryOperator::NotEq),
            FieldOp::Gt => Some(BinaryOperator::Gt),
            FieldOp::Gte => Some(BinaryOperator::GtEq),
            FieldOp::Lt => Some(BinaryOperator::Lt),
            FieldOp::Lte => Some(BinaryOperator::LtEq),
            FieldOp::Like => Some(BinaryOperator::Like),
            FieldOp::In | FieldOp::Has => None,
        }
    }
}

impl Backend for SqlBackend {
    type Expr = Expr;
    type Sort = OrderByExpr;

    fn column(&self, table: Option<&str>, column: &str) -> Expr {
        match table {
            Some(table) => qual_ident(table, column),
            None => ident(column),
        }
    }

    fn literal(&self, val: &Value) -> Expr {
        value(val.clone())
    }

    fn compare(&self, op: FieldOp, left: Expr, right: Expr) -> Expr {
        match (Self::binary_operator(op), right) {
            (Some(op), right) => Expr::binary(left, op, right),
            (None, Expr::Value(values)) => self.membership(op, left, &values),
            (None, right) => left.in_subquery(right),
        }
    }

    fn membership(&self, op: FieldOp, left: Expr, values: &Value) -> Expr {
        match (op, values) {
            // `x IN ()` is not valid SQL; nothing is in an empty list.
            (FieldOp::In, Value::Array(list)) if list.is_empty() => Expr::or(vec![]),
            (FieldOp::In, Value::Array(list)) => Expr::InList {
                expr: Box::new(left),
                list: list.clone(),
            },
            (FieldOp::In, scalar) => Expr::InList {
                expr: Box::new(left),
                list: vec![scalar.clone()],
            },
            (FieldOp::Has, _) => Expr::Contains {
                expr: Box::new(left),
                value: values.clone(),
            },
            (op, _) => {
                let op = Self::binary_operator(op).unwrap_or(BinaryOperator::Eq);
                Expr::binary(left, op, value(values.clone()))
            }
        }
    }

    fn subquery(&self, table: &str, key: &str, filter: Expr) -> Expr {
        let select = SelectBuilder::new()
            .select(vec![qual_ident(table, key)])
            .from(table_ref!(table))
            .where_clause(filter)
            .build();
        Expr::Subquery(Box::new(select))
    }

    fn in_subquery(&self, left: Expr, subquery: Expr) -> Expr {
        left.in_subquery(subquery)
    }

    fn and(&self, operands: Vec<Expr>) -> Expr {
        Expr::and(operands)
    }

    fn or(&self, operands: Vec<Expr>) -> Expr {
        Expr::or(operands)
    }

    fn not(&self, operand: Expr) -> Expr {
        operand.negate()
    }

    fn asc(&self, operand: Expr) -> OrderByExpr {
        OrderByExpr::asc(operand)
    }

    fn desc(&self, operand: Expr) -> OrderByExpr {
        OrderByExpr::desc(operand)
    }
}
