//! Core error types.

use thiserror::Error;

/// Errors from extraction, filling and CSV persistence.
#[derive(Debug, Error)]
pub enum CoreError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Failure reported by the fill target (the live page collaborator).
    #[error("fill target error: {0}")]
    Target(String),

    /// An unparseable commit key name in configuration.
    #[error("unknown commit key: {0} (expected Tab or Enter)")]
    UnknownCommitKey(String),
}
