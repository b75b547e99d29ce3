use crate::{
    backend::Backend,
    error::{FilterError, Result},
    operator::SortDirection,
    registry::Filterable,
    resolver::{ModelResolver, Resolver},
};
use serde_json::Value;
use tracing::{debug, trace};

/// Compiles `[{"a": "ASC"}, {"b": "DESC"}]` into sorts, in input order.
///
/// Entries that are not a non-empty object are skipped; only the first key
/// of an entry is used. An absent or empty list yields `None`.
pub fn compile_order<B, R>(
    backend: &B,
    resolver: &R,
    document: Option<&Value>,
) -> Result<Option<Vec<B::Sort>>>
where
    B: Backend,
    R: Resolver<B>,
{
    let Some(entries) = order_entries(document)? else {
        return Ok(None);
    };

    let mut sorts = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some((field, direction)) = entry.as_object().and_then(|e| e.iter().next()) else {
            trace!(%entry, "skipping order entry");
            continue;
        };

        let direction = direction
            .as_str()
            .and_then(SortDirection::from_constant)
            .ok_or_else(|| FilterError::InvalidOrderDirection {
                field: field.clone(),
                direction: direction.to_string(),
            })?;

        let operand = resolver.resolve(backend, field)?.into_operand("order")?;
        sorts.push(match direction {
            SortDirection::Asc => backend.asc(operand),
            SortDirection::Desc => backend.desc(operand),
        });
    }

    Ok((!sorts.is_empty()).then_some(sorts))
}

/// Compiles `document` against a model in the process-wide registry.
///
/// The document's shape is checked before the model is looked up.
pub fn compile_order_for_model<B: Backend>(
    backend: &B,
    model: &str,
    document: Option<&Value>,
) -> Result<Option<Vec<B::Sort>>> {
    if order_entries(document)?.is_none_or(|entries| entries.is_empty()) {
        return Ok(None);
    }
    debug!(model, "compiling order document");
    let resolver = ModelResolver::for_model(model)?;
    compile_order(backend, &resolver, document)
}

pub fn compile_order_for<M: Filterable, B: Backend>(
    backend: &B,
    document: Option<&Value>,
) -> Result<Option<Vec<B::Sort>>> {
    compile_order_for_model(backend, M::MODEL_NAME, document)
}

/// Only `None`, `null` and an array are order documents.
fn order_entries(document: Option<&Value>) -> Result<Option<&Vec<Value>>> {
    match document {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(entries)) => Ok(Some(entries)),
        Some(other) => Err(FilterError::MalformedDocument(format!(
            "order expects an array of {{field: direction}} entries, got {other}"
        ))),
    }
}
