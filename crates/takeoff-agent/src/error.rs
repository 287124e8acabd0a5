//! Agent error types.

use thiserror::Error;

use takeoff_browser::BrowserError;

/// Errors from action execution and the model loop.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Browser operation failed.
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Chat endpoint transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Chat endpoint returned a non-success status.
    #[error("remote error: status {status}: {body}")]
    Remote { status: u16, body: String },

    /// Response JSON was malformed or missing the assistant content.
    #[error("invalid model response: {0}")]
    InvalidResponse(String),

    /// An action addressed an interactive-element index that does not exist.
    #[error("no interactive element at index {0}")]
    ElementIndex(usize),

    /// The model asked to upload a file outside the allow-list.
    #[error("file not in available paths: {0}")]
    FileNotAllowed(String),
}
