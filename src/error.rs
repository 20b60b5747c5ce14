//! Error types for exptrack
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// exptrack error types
#[derive(Error, Debug)]
pub enum Error {
    /// Experiment name rejected by the naming policy
    #[error("Invalid experiment name: {0:?}\nNames may use ASCII letters, digits, '-', '_' and '.', and must not start with '.'")]
    InvalidName(String),

    /// Generated experiment id collides with an existing directory
    #[error("Experiment already exists: {}", .0.display())]
    ExperimentExists(PathBuf),

    /// Resume target is missing or was never initialized
    #[error("Invalid experiment: {}\nExpected a directory containing meta.yaml", .0.display())]
    InvalidExperiment(PathBuf),

    /// Operation requires a bound experiment
    #[error("No active experiment\nCall start_experiment or resume_experiment first")]
    NoActiveExperiment,

    /// Log root missing or unreadable (aggregation)
    #[error("Invalid log root: {}", .0.display())]
    InvalidLogRoot(PathBuf),

    /// Value key cannot name a series file
    #[error("Invalid value key: {0:?}")]
    InvalidKey(String),

    /// Series cell could not be exported as a number
    #[error("Non-numeric cell in series for experiment {experiment_id} at step {step}")]
    NonNumericCell {
        /// Column (experiment) holding the cell
        experiment_id: String,
        /// Step of the offending row
        step: i64,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Structured document (YAML) error
    #[error("Document error: {0}")]
    Document(#[from] serde_yaml::Error),

    /// Series table (CSV) error
    #[error("Table error: {0}")]
    Table(#[from] csv::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
