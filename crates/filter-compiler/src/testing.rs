//! A backend that builds a printable tree, so tests can assert the exact
//! shape a document compiles to.

use crate::{backend::Backend, operator::FieldOp};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Col(String),
    Lit(Value),
    Call(String, Vec<Node>),
    /// Membership keeps the raw document value.
    Member(FieldOp, Box<Node>, Value),
    Select {
        table: String,
        key: String,
        filter: Box<Node>,
    },
}

impl Node {
    pub fn col(name: &str) -> Self {
        Node::Col(name.to_string())
    }

    pub fn call(name: &str, args: Vec<Node>) -> Self {
        Node::Call(name.to_string(), args)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Col(name) => f.write_str(name),
            Node::Lit(value) => write!(f, "{value}"),
            Node::Call(name, args) => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Node::Member(op, left, values) => write!(f, "{op}({left}, {values})"),
            Node::Select { table, key, filter } => write!(f, "select({table}.{key} | {filter})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sorted {
    Asc(Node),
    Desc(Node),
}

impl fmt::Display for Sorted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sorted::Asc(node) => write!(f, "asc({node})"),
            Sorted::Desc(node) => write!(f, "desc({node})"),
        }
    }
}

pub struct TreeBackend;

impl Backend for TreeBackend {
    type Expr = Node;
    type Sort = Sorted;

    fn column(&self, table: Option<&str>, column: &str) -> Node {
        match table {
            Some(table) => Node::Col(format!("{table}.{column}")),
            None => Node::col(column),
        }
    }

    fn literal(&self, value: &Value) -> Node {
        Node::Lit(value.clone())
    }

    fn compare(&self, op: FieldOp, left: Node, right: Node) -> Node {
        Node::call(op.as_str(), vec![left, right])
    }

    fn membership(&self, op: FieldOp, left: Node, values: &Value) -> Node {
        Node::Member(op, Box::new(left), values.clone())
    }

    fn subquery(&self, table: &str, key: &str, filter: Node) -> Node {
        Node::Select {
            table: table.to_string(),
            key: key.to_string(),
            filter: Box::new(filter),
        }
    }

    fn in_subquery(&self, left: Node, subquery: Node) -> Node {
        Node::call("in_sub", vec![left, subquery])
    }

    fn and(&self, operands: Vec<Node>) -> Node {
        Node::call("and", operands)
    }

    fn or(&self, operands: Vec<Node>) -> Node {
        Node::call("or", operands)
    }

    fn not(&self, operand: Node) -> Node {
        Node::call("not", vec![operand])
    }

    fn asc(&self, operand: Node) -> Sorted {
        Sorted::Asc(operand)
    }

    fn desc(&self, operand: Node) -> Sorted {
        Sorted::Desc(operand)
    }
}

/// Resolves every field to a bare column of the same name.
pub fn columns(field: &str) -> Option<Node> {
    Some(Node::col(field))
}
