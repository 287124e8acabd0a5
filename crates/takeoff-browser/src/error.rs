//! Browser automation error types.

use thiserror::Error;

/// Errors from the CDP client and page operations.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Failed to connect to Chrome.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not found or not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol error.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (endpoint discovery).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Navigation failed.
    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    /// Element not found.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// JavaScript execution error.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// Timeout.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Session closed.
    #[error("session closed")]
    SessionClosed,

    /// Invalid response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for BrowserError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        BrowserError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for BrowserError {
    fn from(e: reqwest::Error) -> Self {
        BrowserError::Http(e.to_string())
    }
}
