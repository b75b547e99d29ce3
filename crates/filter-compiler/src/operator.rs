//! The closed operator table of the filter grammar.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix that marks a document key as an operator rather than a field name.
pub const SIGIL: char = '$';

/// An operator key recognised in a filter document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    And,
    Or,
    Not,
    /// `{"$ref": "field"}` evaluates to the field's operand, not a predicate.
    Ref,
    /// `{"$gt": {"a": 1}}` and friends: one field capability per entry.
    Field(FieldOp),
}

impl Operator {
    /// Parses a document key. Returns `None` for keys that are not in the
    /// table, sigil-prefixed or not; the caller decides which is an error.
    pub fn from_key(key: &str) -> Option<Self> {
        let op = match key {
            "$and" => Operator::And,
            "$or" => Operator::Or,
            "$not" => Operator::Not,
            "$ref" => Operator::Ref,
            "$eq" => Operator::Field(FieldOp::Eq),
            "$neq" => Operator::Field(FieldOp::Neq),
            "$gt" => Operator::Field(FieldOp::Gt),
            "$gte" => Operator::Field(FieldOp::Gte),
            "$lt" => Operator::Field(FieldOp::Lt),
            "$lte" => Operator::Field(FieldOp::Lte),
            "$like" | "$regex" => Operator::Field(FieldOp::Like),
            "$in" => Operator::Field(FieldOp::In),
            "$contains" => Operator::Field(FieldOp::Has),
            _ => return None,
        };
        Some(op)
    }

    pub fn is_sigil(key: &str) -> bool {
        key.starts_with(SIGIL)
    }

    pub fn key(&self) -> &'static str {
        match self {
            Operator::And => "$and",
            Operator::Or => "$or",
            Operator::Not => "$not",
            Operator::Ref => "$ref",
            Operator::Field(FieldOp::Eq) => "$eq",
            Operator::Field(FieldOp::Neq) => "$neq",
            Operator::Field(FieldOp::Gt) => "$gt",
            Operator::Field(FieldOp::Gte) => "$gte",
            Operator::Field(FieldOp::Lt) => "$lt",
            Operator::Field(FieldOp::Lte) => "$lte",
            Operator::Field(FieldOp::Like) => "$like",
            Operator::Field(FieldOp::In) => "$in",
            Operator::Field(FieldOp::Has) => "$contains",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A capability exposed by a field operand. These are the names used in
/// operator whitelists and passed to custom compilers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    In,
    Has,
}

impl FieldOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldOp::Eq => "eq",
            FieldOp::Neq => "neq",
            FieldOp::Gt => "gt",
            FieldOp::Gte => "gte",
            FieldOp::Lt => "lt",
            FieldOp::Lte => "lte",
            FieldOp::Like => "like",
            FieldOp::In => "in",
            FieldOp::Has => "has",
        }
    }

    /// `in` and `has` take their argument as a raw value; the rest take a
    /// compiled right-hand operand.
    pub fn is_membership(&self) -> bool {
        matches!(self, FieldOp::In | FieldOp::Has)
    }
}

impl fmt::Display for FieldOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two recognised direction constants of an order entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_constant(value: &str) -> Option<Self> {
        match value {
            "ASC" => Some(SortDirection::Asc),
            "DESC" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}
