//! Error handling for cohort construction and modelling.

use std::io;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Specialized error type for the cohort pipeline
#[derive(Debug, Error)]
pub enum CohortError {
    /// Case age cutoffs are malformed (lower must be strictly below higher)
    #[error("Invalid age range: lower cutoff {lower} must be below higher cutoff {higher}")]
    InvalidRange {
        /// Lower cutoff as supplied
        lower: f64,
        /// Higher cutoff as supplied
        higher: f64,
    },
    /// A matching or modelling parameter is out of its allowed domain
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// A required field is missing, null or malformed on an input record
    #[error("Schema error: {0}")]
    Schema(String),
    /// Error opening, reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Error decoding tabular data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),
    /// Error writing CSV reports
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Error writing JSON reports
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Numerical failure while fitting or evaluating the classifier
    #[error("Model error: {0}")]
    Model(String),
}

impl CohortError {
    /// Create a schema error from any message
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Create an invalid parameter error from any message
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a model error from any message
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Schema error for a required column absent from a table
    pub fn missing_column(table: &str, column: &str) -> Self {
        Self::Schema(format!("{table} table is missing required column '{column}'"))
    }

    /// Schema error for a null or unreadable value in a required column
    pub fn invalid_value(table: &str, column: &str, row: usize, detail: &str) -> Self {
        Self::Schema(format!(
            "{table} table row {row}: column '{column}' {detail}"
        ))
    }
}

/// Result type for cohort operations
pub type Result<T> = std::result::Result<T, CohortError>;
