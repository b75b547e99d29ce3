use crate::{
    commands::{Commands, DialectKind},
    error::CliError,
};
use clap::Parser;
use filter_compiler::{FilterConfig, SelectQuery, StorageModel, compile_select};
use filter_sql::{SqlBackend, Statement, render_select, select_statement};
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "filterc",
    version = "0.1.0",
    about = "Compile JSON filter documents to SQL"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compile {
            config,
            model,
            query,
            filter,
            order,
            limit,
            offset,
            dialect,
        } => {
            let mut select: SelectQuery = match query {
                Some(raw) => serde_json::from_str(&raw)
                    .map_err(|source| CliError::InvalidJson { arg: "--query", source })?,
                None => SelectQuery::default(),
            };
            if let Some(raw) = filter {
                select.filter = Some(parse_json("--filter", &raw)?);
            }
            if let Some(raw) = order {
                select.order_by = Some(parse_json("--order", &raw)?);
            }
            select.limit = limit.or(select.limit);
            select.offset = offset.or(select.offset);

            let statement = compile(&config, &model, &select, dialect)?;
            output::print_statement(&statement)?;
        }
        Commands::Fields {
            config,
            model,
            json,
        } => {
            let config = FilterConfig::from_path(&config)?;
            let model_config = config
                .model(&model)
                .ok_or_else(|| CliError::UnknownModel(model.clone()))?;

            if json {
                output::print_fields_json(model_config)?;
            } else {
                let registry = config.to_registry();
                let resolver = registry.resolver(&model)?;
                output::print_fields_table(model_config, resolver.metadata());
            }
        }
    }

    Ok(())
}

fn parse_json(arg: &'static str, raw: &str) -> Result<serde_json::Value, CliError> {
    serde_json::from_str(raw).map_err(|source| CliError::InvalidJson { arg, source })
}

fn compile(
    config_path: &Path,
    model: &str,
    query: &SelectQuery,
    dialect: DialectKind,
) -> Result<Statement, CliError> {
    info!("Compiling query for model {model} from {}", config_path.display());

    let config = FilterConfig::from_path(config_path)?;
    let model_config = config
        .model(model)
        .ok_or_else(|| CliError::UnknownModel(model.to_string()))?;

    let registry = config.to_registry();
    let resolver = registry.resolver(model)?;
    let compiled = compile_select(&SqlBackend, &resolver, query)?;
    debug!(?compiled, "compiled select");

    let storage = StorageModel::new(&model_config.table, &model_config.primary_key);
    let select = select_statement(&storage, compiled);
    Ok(render_select(&select, dialect.dialect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        let config = json!({
            "models": [{
                "name": "posts",
                "table": "posts",
                "fields": [
                    {"kind": "plain", "name": "title"},
                    {"kind": "plain", "name": "published", "column": "published_at"}
                ]
            }]
        });
        file.write_all(config.to_string().as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_cli_parses_compile() {
        let cli = Cli::try_parse_from([
            "filterc",
            "compile",
            "--config",
            "models.json",
            "--model",
            "posts",
            "--filter",
            r#"{"title": "x"}"#,
            "--dialect",
            "mysql",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Compile { model, dialect, .. } => {
                assert_eq!(model, "posts");
                assert_eq!(dialect, DialectKind::Mysql);
            }
            Commands::Fields { .. } => panic!("expected compile"),
        }
    }

    #[test]
    fn test_compile_from_config_file() {
        let file = config_file();
        let query = SelectQuery {
            filter: Some(json!({"$like": {"title": "rust%"}})),
            order_by: Some(json!([{"published": "DESC"}])),
            limit: Some(5),
            ..Default::default()
        };

        let statement = compile(file.path(), "posts", &query, DialectKind::Mysql).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT * FROM `posts` WHERE (`posts`.`title` LIKE ?) ORDER BY `posts`.`published_at` DESC LIMIT ?"
        );
        assert_eq!(statement.params, vec![json!("rust%"), json!(5)]);
    }

    #[test]
    fn test_compile_unknown_model() {
        let file = config_file();
        let err = compile(file.path(), "users", &SelectQuery::default(), DialectKind::Postgres)
            .unwrap_err();
        assert!(matches!(err, CliError::UnknownModel(model) if model == "users"));
    }

    #[test]
    fn test_compile_reports_filter_errors() {
        let file = config_file();
        let query = SelectQuery {
            filter: Some(json!({"$between": {"title": [1, 2]}})),
            ..Default::default()
        };
        let err = compile(file.path(), "posts", &query, DialectKind::Postgres).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Failed to compile: Operator "$between" is not supported"#
        );
    }
}
