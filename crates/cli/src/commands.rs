use clap::{Subcommand, ValueEnum};
use query_builder::dialect::{Dialect, MySql, Postgres};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a filter/order document into a SELECT statement
    Compile {
        #[arg(long, help = "Model config file path")]
        config: PathBuf,

        #[arg(long, help = "Model to compile against")]
        model: String,

        #[arg(
            long,
            help = "Whole select query as JSON: where, orderBy, limit, offset, columns"
        )]
        query: Option<String>,

        #[arg(long, help = "Filter document as JSON, overrides the query's where")]
        filter: Option<String>,

        #[arg(long, help = "Order list as JSON, overrides the query's orderBy")]
        order: Option<String>,

        #[arg(long)]
        limit: Option<u64>,

        #[arg(long)]
        offset: Option<u64>,

        #[arg(long, value_enum, default_value_t = DialectKind::Postgres)]
        dialect: DialectKind,
    },
    /// List the filterable fields of a model
    Fields {
        #[arg(long, help = "Model config file path")]
        config: PathBuf,

        #[arg(long, help = "Model to describe")]
        model: String,

        #[arg(long, help = "Print the field definitions as JSON instead of a table")]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectKind {
    Postgres,
    Mysql,
}

impl DialectKind {
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            DialectKind::Postgres => &Postgres,
            DialectKind::Mysql => &MySql,
        }
    }
}
