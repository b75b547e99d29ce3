//! The recursive filter-document compiler.

use crate::{
    backend::Backend,
    error::{FilterError, Result},
    operator::{FieldOp, Operator},
    registry::Filterable,
    resolver::{ModelResolver, Resolver},
};
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// What the value at some position of the document is compiled as.
#[derive(Debug, Clone, Copy)]
enum Context<'k> {
    /// A right-hand value: objects recurse, everything else is a literal.
    Literal,
    Operator(Operator),
    /// A bare field name: implicit equality.
    Field(&'k str),
}

impl<'k> Context<'k> {
    fn from_key(key: &'k str) -> Result<Self> {
        match Operator::from_key(key) {
            Some(op) => Ok(Context::Operator(op)),
            None if Operator::is_sigil(key) => {
                Err(FilterError::UnsupportedOperator(key.to_string()))
            }
            None => Ok(Context::Field(key)),
        }
    }
}

pub struct PredicateCompiler<'c, B: Backend, R: Resolver<B>> {
    backend: &'c B,
    resolver: &'c R,
}

impl<'c, B: Backend, R: Resolver<B>> PredicateCompiler<'c, B, R> {
    pub fn new(backend: &'c B, resolver: &'c R) -> Self {
        Self { backend, resolver }
    }

    /// Compiles a whole document. `None`, `null`, `{}` and `[]` mean "no
    /// filter"; a top-level array is treated as `$and`.
    pub fn compile(&self, document: Option<&Value>) -> Result<Option<B::Expr>> {
        match document {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) if map.is_empty() => Ok(None),
            Some(Value::Array(items)) if items.is_empty() => Ok(None),
            Some(doc @ (Value::Object(_) | Value::Array(_))) => self
                .compile_node(Context::Operator(Operator::And), doc)
                .map(Some),
            Some(other) => Err(malformed(format!("expected an object or array, got {other}"))),
        }
    }

    fn compile_node(&self, context: Context<'_>, value: &Value) -> Result<B::Expr> {
        match context {
            Context::Literal => match value {
                Value::Object(_) => self.compile_node(Context::Operator(Operator::And), value),
                _ => Ok(self.backend.literal(value)),
            },
            Context::Field(field) => {
                let rhs = self.compile_node(Context::Literal, value)?;
                self.resolver
                    .resolve(self.backend, field)?
                    .compare(self.backend, FieldOp::Eq, rhs)
            }
            Context::Operator(op) => {
                trace!(operator = %op, "compiling operator");
                self.compile_operator(op, value)
            }
        }
    }

    fn compile_operator(&self, op: Operator, value: &Value) -> Result<B::Expr> {
        match op {
            Operator::Ref => match value {
                Value::String(field) => self
                    .resolver
                    .resolve(self.backend, field)?
                    .into_operand("ref"),
                other => Err(malformed(format!("{op} expects a field name, got {other}"))),
            },
            Operator::Not => {
                // Every branch is compiled so errors surface, but only the
                // first one is negated.
                let first = self.compile_branches(op, value)?.into_iter().next();
                match first {
                    Some(branch) => Ok(self.backend.not(branch)),
                    None => Err(malformed(format!("{op} needs at least one branch"))),
                }
            }
            Operator::And | Operator::Or => {
                let mut branches = self.compile_branches(op, value)?;
                if branches.is_empty() {
                    return Err(malformed(format!("{op} needs at least one branch")));
                }
                if value.is_object() && branches.len() == 1 {
                    return Ok(branches.remove(0));
                }
                Ok(self.combine(op, branches))
            }
            Operator::Field(field_op) => self.compile_fields(op, field_op, value),
        }
    }

    /// The branches of `$and`, `$or` and `$not`: array elements as nested
    /// `$and` documents, or object entries keyed by their own name.
    fn compile_branches(&self, op: Operator, value: &Value) -> Result<Vec<B::Expr>> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| self.compile_node(Context::Operator(Operator::And), item))
                .collect(),
            Value::Object(entries) => entries
                .iter()
                .map(|(key, item)| self.compile_node(Context::from_key(key)?, item))
                .collect(),
            other => Err(malformed(format!("{op} expects an array or object, got {other}"))),
        }
    }

    /// `{"$gt": {"a": 1, "b": 2}}`: one predicate per field, ANDed when
    /// there is more than one.
    fn compile_fields(&self, op: Operator, field_op: FieldOp, value: &Value) -> Result<B::Expr> {
        let fields = field_map(op, value)?;

        let mut predicates = Vec::with_capacity(fields.len());
        for (field, item) in fields {
            let operand = self.resolver.resolve(self.backend, field)?;
            let predicate = if field_op.is_membership() {
                operand.membership(self.backend, field_op, item)?
            } else {
                let rhs = self.compile_node(Context::Literal, item)?;
                operand.compare(self.backend, field_op, rhs)?
            };
            predicates.push(predicate);
        }

        if predicates.len() == 1 {
            Ok(predicates.remove(0))
        } else {
            Ok(self.backend.and(predicates))
        }
    }

    fn combine(&self, op: Operator, branches: Vec<B::Expr>) -> B::Expr {
        match op {
            Operator::Or => self.backend.or(branches),
            _ => self.backend.and(branches),
        }
    }
}

fn field_map(op: Operator, value: &Value) -> Result<&Map<String, Value>> {
    match value {
        Value::Object(fields) if !fields.is_empty() => Ok(fields),
        Value::Object(_) => Err(malformed(format!("{op} needs at least one field"))),
        other => Err(malformed(format!("{op} expects a field mapping, got {other}"))),
    }
}

fn malformed(reason: String) -> FilterError {
    FilterError::MalformedDocument(reason)
}

/// Compiles `document` with an explicit resolver.
pub fn compile_query<B, R>(
    backend: &B,
    resolver: &R,
    document: Option<&Value>,
) -> Result<Option<B::Expr>>
where
    B: Backend,
    R: Resolver<B>,
{
    PredicateCompiler::new(backend, resolver).compile(document)
}

/// Compiles `document` against a model in the process-wide registry.
///
/// An empty document yields `None` without looking the model up.
pub fn compile_where_for_model<B: Backend>(
    backend: &B,
    model: &str,
    document: Option<&Value>,
) -> Result<Option<B::Expr>> {
    if is_empty(document) {
        return Ok(None);
    }
    debug!(model, "compiling filter document");
    let resolver = ModelResolver::for_model(model)?;
    compile_query(backend, &resolver, document)
}

pub fn compile_where_for<M: Filterable, B: Backend>(
    backend: &B,
    document: Option<&Value>,
) -> Result<Option<B::Expr>> {
    compile_where_for_model(backend, M::MODEL_NAME, document)
}

fn is_empty(document: Option<&Value>) -> bool {
    match document {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::Argument,
        registry::{
            FilterRegistry, StorageModel,
            descriptor::{CustomField, FieldDescriptor, RelationField},
            register_field, register_model,
        },
        testing::{Node, TreeBackend, columns},
    };
    use serde_json::json;
    use tracing_test::traced_test;

    fn compile(document: Value) -> Result<Option<String>> {
        compile_query(&TreeBackend, &columns, Some(&document)).map(|expr| expr.map(|e| e.to_string()))
    }

    fn compiled(document: Value) -> String {
        compile(document).unwrap().unwrap()
    }

    #[test]
    fn test_empty_documents() {
        assert_eq!(compile_query(&TreeBackend, &columns, None).unwrap(), None);
        assert_eq!(compile(json!({})).unwrap(), None);
        assert_eq!(compile(json!(null)).unwrap(), None);
        assert_eq!(compile(json!([])).unwrap(), None);
    }

    #[test]
    fn test_implicit_equality() {
        assert_eq!(compiled(json!({"a": 1})), "eq(a, 1)");
    }

    #[test]
    fn test_multiple_fields_are_anded() {
        assert_eq!(compiled(json!({"a": 1, "b": 2})), "and(eq(a, 1), eq(b, 2))");
        assert_eq!(
            compiled(json!({"a": 1, "b": 2})),
            compiled(json!({"$and": {"a": 1, "b": 2}}))
        );
    }

    #[test]
    fn test_or_object() {
        assert_eq!(compiled(json!({"$or": {"a": 1, "b": 2}})), "or(eq(a, 1), eq(b, 2))");
    }

    #[test]
    fn test_single_entry_object_is_not_wrapped() {
        assert_eq!(compiled(json!({"$or": {"a": 1}})), "eq(a, 1)");
        assert_eq!(compiled(json!({"$eq": {"a": 1}})), "eq(a, 1)");
    }

    #[test]
    fn test_array_form_is_always_wrapped() {
        assert_eq!(compiled(json!({"$or": [{"a": 1}]})), "or(eq(a, 1))");
    }

    #[test]
    fn test_not() {
        assert_eq!(compiled(json!({"$not": {"a": 1}})), "not(eq(a, 1))");
    }

    #[test]
    fn test_not_negates_only_the_first_branch() {
        assert_eq!(compiled(json!({"$not": [{"a": 1}, {"b": 2}]})), "not(eq(a, 1))");
        assert_eq!(compiled(json!({"$not": {"a": 1, "b": 2}})), "not(eq(a, 1))");
    }

    #[test]
    fn test_not_still_validates_dropped_branches() {
        let err = compile(json!({"$not": [{"a": 1}, {"$between": {"b": 2}}]})).unwrap_err();
        assert_eq!(err, FilterError::UnsupportedOperator("$between".into()));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(compiled(json!({"$neq": {"a": "x"}})), r#"neq(a, "x")"#);
        assert_eq!(compiled(json!({"$gt": {"a": 1}})), "gt(a, 1)");
        assert_eq!(compiled(json!({"$gte": {"a": 1}})), "gte(a, 1)");
        assert_eq!(compiled(json!({"$lt": {"a": 1}})), "lt(a, 1)");
        assert_eq!(compiled(json!({"$lte": {"a": 1, "b": 2}})), "and(lte(a, 1), lte(b, 2))");
    }

    #[test]
    fn test_regex_is_like() {
        assert_eq!(compiled(json!({"$like": {"b": "test%"}})), r#"like(b, "test%")"#);
        assert_eq!(compiled(json!({"$regex": {"b": "test%"}})), r#"like(b, "test%")"#);
    }

    #[test]
    fn test_field_reference() {
        assert_eq!(compiled(json!({"$lte": {"a": {"$ref": "b"}}})), "lte(a, b)");
        assert_eq!(compiled(json!({"a": {"$ref": "b"}})), "eq(a, b)");
    }

    #[test]
    fn test_in_passes_array_through() {
        assert_eq!(compiled(json!({"$in": {"a": [1, 2]}})), "in(a, [1,2])");
        assert_eq!(
            compiled(json!({"$in": {"a": [{"$ref": "b"}]}})),
            r#"in(a, [{"$ref":"b"}])"#
        );
    }

    #[test]
    fn test_contains_passes_scalars_through() {
        assert_eq!(compiled(json!({"$contains": {"tags": "rust"}})), r#"has(tags, "rust")"#);
        assert_eq!(
            compiled(json!({"$contains": {"tags": ["a"], "labels": ["b"]}})),
            r#"and(has(tags, ["a"]), has(labels, ["b"]))"#
        );
    }

    #[test]
    fn test_literal_arrays_and_null() {
        assert_eq!(compiled(json!({"a": [1, 2]})), "eq(a, [1,2])");
        assert_eq!(compiled(json!({"a": null})), "eq(a, null)");
    }

    #[test]
    fn test_nested_document() {
        let document = json!({
            "$and": [
                {"$in": {"a": [1, 2]}},
                {"$or": [{"$neq": {"a": 2}}, {"$gte": {"a": 6}}]},
                {"$like": {"b": "test%"}}
            ]
        });
        assert_eq!(
            compiled(document),
            r#"and(in(a, [1,2]), or(neq(a, 2), gte(a, 6)), like(b, "test%"))"#
        );
    }

    #[test]
    fn test_nested_array_branch_is_and() {
        assert_eq!(
            compiled(json!({"$and": [[{"a": 1}, {"b": 2}]]})),
            "and(and(eq(a, 1), eq(b, 2)))"
        );
        assert_eq!(
            compiled(json!({"$or": [[{"a": 1}], {"b": 2}]})),
            "or(and(eq(a, 1)), eq(b, 2))"
        );
        assert_eq!(compiled(json!([[{"a": 1}]])), "and(and(eq(a, 1)))");
    }

    #[test]
    fn test_scalar_branches_are_malformed() {
        for document in [
            json!({"$and": [[{"a": 1}, 2]]}),
            json!({"$or": [1, "x"]}),
            json!({"$not": [true]}),
            json!({"$or": [null]}),
            json!([{"a": 1}, 5]),
            json!({"$and": [[]]}),
        ] {
            let err = compile(document.clone()).unwrap_err();
            assert!(
                matches!(err, FilterError::MalformedDocument(_)),
                "{document} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_top_level_array_is_and() {
        assert_eq!(compiled(json!([{"a": 1}, {"b": 2}])), "and(eq(a, 1), eq(b, 2))");
    }

    #[test]
    fn test_unsupported_operator() {
        let err = compile(json!({"$between": {"a": [1, 2]}})).unwrap_err();
        assert_eq!(err.to_string(), r#"Operator "$between" is not supported"#);

        let nested = compile(json!({"$or": [{"a": {"$foo": 1}}]})).unwrap_err();
        assert_eq!(nested, FilterError::UnsupportedOperator("$foo".into()));
    }

    #[test]
    fn test_malformed_shapes() {
        for document in [
            json!(5),
            json!({"$and": 5}),
            json!({"$or": []}),
            json!({"$not": {}}),
            json!({"$eq": {}}),
            json!({"$eq": [1]}),
            json!({"$in": "a"}),
            json!({"a": {"$ref": 1}}),
        ] {
            let err = compile(document.clone()).unwrap_err();
            assert!(
                matches!(err, FilterError::MalformedDocument(_)),
                "{document} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_unknown_field() {
        let resolver = |field: &str| (field == "a").then(|| Node::col(field));
        let err = compile_query(&TreeBackend, &resolver, Some(&json!({"$gt": {"b": 1}}))).unwrap_err();
        assert_eq!(err, FilterError::MissingFieldInfo("b".into()));
    }

    fn user_registry() -> FilterRegistry {
        let mut registry = FilterRegistry::new();
        registry.bind_model("users", StorageModel::new("users", "id"));
        registry.register_field("users", "name", FieldDescriptor::plain());
        registry.register_field(
            "users",
            "tag",
            FieldDescriptor::Relation(RelationField::new("id", "tags", "user_id", "name")),
        );
        registry.register_field(
            "users",
            "posts",
            FieldDescriptor::Custom(CustomField::new().on(FieldOp::Gte, |pk: Node, _, arg| {
                let Argument::Operand(count) = arg else {
                    return Node::call("false", vec![]);
                };
                Node::call("gte", vec![Node::call("post_count", vec![pk]), count])
            })),
        );
        registry
    }

    #[test]
    fn test_relation_field() {
        let resolver = user_registry().resolver("users").unwrap();
        let expr = compile_query(&TreeBackend, &resolver, Some(&json!({"$in": {"tag": ["a", "b"]}})))
            .unwrap()
            .unwrap();
        assert_eq!(
            expr.to_string(),
            r#"in_sub(users.id, select(tags.user_id | in(tags.name, ["a","b"])))"#
        );
    }

    #[test]
    fn test_custom_field() {
        let resolver = user_registry().resolver("users").unwrap();
        let expr = compile_query(
            &TreeBackend,
            &resolver,
            Some(&json!({"name": "ann", "$gte": {"posts": 3}})),
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            expr.to_string(),
            r#"and(eq(users.name, "ann"), gte(post_count(users.id), 3))"#
        );
    }

    #[test]
    fn test_custom_field_without_handler() {
        let resolver = user_registry().resolver("users").unwrap();
        let err =
            compile_query(&TreeBackend, &resolver, Some(&json!({"$lt": {"posts": 3}}))).unwrap_err();
        assert_eq!(
            err,
            FilterError::UnsupportedFieldOperator {
                field: "posts".into(),
                operator: "lt".into()
            }
        );
    }

    #[test]
    fn test_relation_field_cannot_be_referenced() {
        let resolver = user_registry().resolver("users").unwrap();
        let err = compile_query(
            &TreeBackend,
            &resolver,
            Some(&json!({"name": {"$ref": "tag"}})),
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::UnsupportedFieldOperator { operator, .. } if operator == "ref"));
    }

    struct Article;

    impl Filterable for Article {
        const MODEL_NAME: &'static str = "predicate::tests::Article";
    }

    struct Unregistered;

    impl Filterable for Unregistered {
        const MODEL_NAME: &'static str = "predicate::tests::Unregistered";
    }

    #[test]
    #[traced_test]
    fn test_compile_where_for_registered_type() {
        register_model::<Article>(StorageModel::new("articles", "id"));
        register_field::<Article>("title", FieldDescriptor::plain());

        let expr = compile_where_for::<Article, _>(&TreeBackend, Some(&json!({"title": "x"})))
            .unwrap()
            .unwrap();
        assert_eq!(expr.to_string(), r#"eq(articles.title, "x")"#);
        assert!(logs_contain("compiling filter document"));
    }

    #[test]
    fn test_compile_where_for_unregistered_type() {
        assert_eq!(
            compile_where_for::<Unregistered, _>(&TreeBackend, Some(&json!({}))).unwrap(),
            None
        );
        let err = compile_where_for::<Unregistered, _>(&TreeBackend, Some(&json!({"a": 1}))).unwrap_err();
        assert_eq!(
            err,
            FilterError::MissingModelMetadata(Unregistered::MODEL_NAME.into())
        );
    }
}
