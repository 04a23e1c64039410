//! Error types for the sorting lab.

use thiserror::Error;

/// Errors raised by the sorting core, the dataset generator and the batch runner.
#[derive(Debug, Error)]
pub enum LabError {
    /// Malformed parameters: negative radix input, out-of-range ratio,
    /// unknown dataset kind, zero trial count.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No algorithm is registered under this key.
    #[error("unknown algorithm key: {0}")]
    UnknownAlgorithm(String),

    /// A batch was cancelled between trials.
    #[error("cancelled after {completed} completed trial(s)")]
    Cancelled { completed: usize },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A results file could not be parsed.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl LabError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        LabError::InvalidInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, LabError>;
