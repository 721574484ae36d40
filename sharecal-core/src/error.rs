//! Error types for sharecal.

use thiserror::Error;

/// Errors that can occur in sharecal operations.
#[derive(Error, Debug)]
pub enum SharecalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Event has no id; it must be created before it can be updated")]
    MissingId,

    #[error("Event '{0}' ends before it starts")]
    InvalidRange(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Attachment error: {0}")]
    Attachment(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sharecal operations.
pub type SharecalResult<T> = Result<T, SharecalError>;
