//! Error types for the atlas-subsample library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Matrix file not found: {path}")]
    MissingMatrix { path: PathBuf },

    #[error("Missing attribute '{name}' in {path}")]
    MissingAttribute { name: String, path: PathBuf },

    #[error("Malformed matrix file {path}: {reason}")]
    MalformedMatrix { path: PathBuf, reason: String },

    #[error("Invalid numeric value '{value}' at row {row}, column {col}")]
    InvalidValue {
        value: String,
        row: usize,
        col: usize,
    },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty data: {0}")]
    EmptyData(String),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, AtlasError>;
