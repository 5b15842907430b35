//! Error types for the deploy notifier

use thiserror::Error;

/// Main error type for the deploy notifier
#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Slack API error: {0}")]
    SlackError(String),

    #[error("Control API error: {0}")]
    ControlError(String),

    #[error("Deployment targets not available yet: {0}")]
    TargetsUnavailable(String),

    #[error("Git error: {0}")]
    GitError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Logging error: {0}")]
    LoggingError(String),
}

impl NotifierError {
    /// Whether the poll driver should retry on the next tick instead of aborting
    pub fn is_transient(&self) -> bool {
        matches!(self, NotifierError::TargetsUnavailable(_))
    }
}
