use arrow::error::ArrowError;
use datafusion::error::DataFusionError;
use std::process::ExitStatus;
use thiserror::Error;
use url::ParseError;

pub mod config;
pub mod logging;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("DataFusion error: {0}")]
    DataFusion(#[from] DataFusionError),

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported output format '{0}' (expected parquet, csv or json)")]
    UnsupportedFormat(String),

    #[error("Unsupported master '{0}' (expected local, local[N] or local[*])")]
    UnsupportedMaster(String),

    #[error("dsdgen child {child} failed with {status}: {stderr}")]
    Generator {
        child: u32,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{0}")]
    Other(String),
}

impl From<object_store::path::Error> for Error {
    fn from(err: object_store::path::Error) -> Self {
        Error::InvalidInput(format!("Object path error: {}", err))
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::InvalidInput(format!("URL parse error: {}", err))
    }
}
