use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "maru.yaml not found\nsearched from: {0}\nhint: run `maru init` to initialize a project"
    )]
    ProjectFileNotFound(PathBuf),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("template error in {file}: {message}")]
    Template { file: PathBuf, message: String },

    #[error("failed to read answer")]
    Prompt(#[source] std::io::Error),

    #[error("failed to serialize configuration for checksum")]
    Serialize(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
