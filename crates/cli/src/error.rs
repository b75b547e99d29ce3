use filter_compiler::{ConfigError, FilterError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to load the model config: {0}")]
    Config(#[from] ConfigError),

    #[error("Model {0:?} is not defined in the config")]
    UnknownModel(String),

    #[error("Argument {arg} is not valid JSON: {source}")]
    InvalidJson {
        arg: &'static str,
        source: serde_json::Error,
    },

    #[error("Failed to compile: {0}")]
    Compile(#[from] FilterError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),
}
