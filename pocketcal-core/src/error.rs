//! Error types for the calendar engine.

use thiserror::Error;

/// Errors that can occur in calendar engine operations.
#[derive(Error, Debug)]
pub enum CalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event name is empty")]
    EmptyName,

    #[error("Invalid date '{0}' (expected YYYYMMDD)")]
    InvalidDate(String),

    #[error("Invalid time '{0}' (expected HH:MM)")]
    InvalidTime(String),

    #[error("Invalid duration '{0}' (expected H:MM)")]
    InvalidDuration(String),

    #[error("Invalid repeat value '{0}'")]
    InvalidRepeat(String),

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for calendar engine operations.
pub type CalResult<T> = Result<T, CalError>;
