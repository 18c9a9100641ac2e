use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse JSON configuration in {path}: {source}")]
    JsonParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Configuration file not found at {path}")]
    NotFound { path: PathBuf },
}

/// Faults that abort the current ingestion or query invocation.
///
/// Row-level faults never surface here; they are recovered into [`RowError`]
/// inside the parser and only counted by the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration loading failed: {0}")]
    Config(String),
    #[error("Configuration parsing failed: {0}")]
    ConfigParse(#[from] ConfigError),
    #[error("IO error reading data file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Database pool creation error: {0}")]
    DbPoolError(String),
    #[error("Database operation failed: {0}")]
    DbQueryError(#[from] tokio_postgres::Error),
    #[error("Failed to get database connection from pool: {0}")]
    DbConnectionError(#[from] deadpool_postgres::PoolError),
}

/// Why a single input row was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowErrorKind {
    #[error("malformed row: expected {expected} fields, found {found}")]
    MalformedRow { expected: usize, found: usize },
    #[error("unparseable timestamp '{value}'")]
    InvalidTimestamp { value: String },
    #[error("invalid {field} value '{original}' (normalized to '{normalized}')")]
    InvalidNumericField {
        field: &'static str,
        original: String,
        normalized: String,
    },
    #[error("{field} {value} outside allowed range [{min}, {max}]")]
    OutOfRangeValue {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("unexpected parse failure: {cause}")]
    UnexpectedParseFailure { cause: String },
}

/// A rejected input row, tagged with its 1-based line number.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("row {line}: {kind}")]
pub struct RowError {
    pub line: usize,
    pub kind: RowErrorKind,
}

impl RowError {
    pub fn new(line: usize, kind: RowErrorKind) -> Self {
        Self { line, kind }
    }
}
