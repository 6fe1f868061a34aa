//! Result and error types for Pilotar.

use thiserror::Error;

/// Result type for Pilotar operations
pub type PilotarResult<T> = Result<T, PilotarError>;

/// Errors that can occur while driving a workflow
#[derive(Debug, Error)]
pub enum PilotarError {
    /// A wait exceeded its budget without the condition becoming true
    #[error("Timed out after {ms}ms waiting for {condition}")]
    Timeout {
        /// Description of the condition that never held
        condition: String,
        /// Timeout budget in milliseconds
        ms: u64,
    },

    /// A selector never resolved within its timeout
    #[error("Element not found: {selector} (waited {ms}ms)")]
    ElementNotFound {
        /// Selector description
        selector: String,
        /// Timeout budget in milliseconds
        ms: u64,
    },

    /// Primary and fallback interaction attempts both failed
    #[error("Interaction failed: {action} on {selector}: {message}")]
    Interaction {
        /// Action that was attempted
        action: String,
        /// Selector of the target element
        selector: String,
        /// Error message
        message: String,
    },

    /// A value was observed but did not match the expectation
    #[error("Assertion mismatch in {context}: expected \"{expected}\", observed \"{actual}\"")]
    AssertionMismatch {
        /// Expected value
        expected: String,
        /// Observed value
        actual: String,
        /// What was being checked
        context: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Anything outside the anticipated taxonomy, e.g. the browser
    /// connection itself is gone. Always fatal for the run.
    #[error("Unexpected fault: {message}")]
    Fault {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PilotarError {
    /// Whether this error aborts a run immediately. Faults are never
    /// absorbed by a poll loop and never trigger an interaction fallback.
    #[must_use]
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault { .. })
    }
}
