//! Error types for the widget engine

use thiserror::Error;

/// Result type alias for widget operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the widget engine
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load or parse the underlying page
    #[error("Failed to load page: {0}")]
    LoadError(String),

    /// Failed to render the annotation surface
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Screenshot capture failed
    #[error("Screenshot capture failed: {0}")]
    CaptureError(String),

    /// Feedback submission failed (transport or non-success status)
    #[error("Submission failed: {0}")]
    SubmitError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
