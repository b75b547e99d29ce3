use crate::error::CliError;
use filter_compiler::{FieldDescriptor, FieldOp, ModelFilterMetadata, config::ModelConfig};
use filter_sql::Statement;

pub fn print_statement(statement: &Statement) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(statement).map_err(CliError::JsonSerialize)?;
    println!("{json}");
    Ok(())
}

pub fn print_fields_json(model: &ModelConfig) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(&model.fields).map_err(CliError::JsonSerialize)?;
    println!("{json}");
    Ok(())
}

pub fn print_fields_table(model: &ModelConfig, metadata: &ModelFilterMetadata) {
    println!("Filterable fields of '{}' (table '{}'):", model.name, model.table);
    println!("-----------------------------");
    for (name, descriptor) in metadata.fields() {
        println!("{:<16} {:<10} {}", name, descriptor.kind(), describe(descriptor));
    }
}

fn describe(descriptor: &FieldDescriptor) -> String {
    match descriptor {
        FieldDescriptor::Plain(plain) => {
            let column = plain.column.as_deref().unwrap_or("-");
            format!("column={column} operators={}", operators(&plain.operators))
        }
        FieldDescriptor::Relation(relation) => format!(
            "{} IN {}.{} WHERE {} operators={}",
            relation.match_field,
            relation.table,
            relation.key,
            relation.value,
            operators(&relation.operators)
        ),
        FieldDescriptor::Custom(custom) => format!("operators={}", operators(&custom.operations())),
    }
}

fn operators(ops: &[FieldOp]) -> String {
    if ops.is_empty() {
        return "all".to_string();
    }
    ops.iter().map(FieldOp::as_str).collect::<Vec<_>>().join(",")
}
