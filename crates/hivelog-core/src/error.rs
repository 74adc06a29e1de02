//! Error types for hivelog

use thiserror::Error;

/// Main error type for hivelog operations.
///
/// Note that the emit path never surfaces these to callers: logging is
/// best-effort and write failures go to the diagnostic channel instead.
/// `LogError` is returned from construction, query, and retention calls.
#[derive(Error, Debug)]
pub enum LogError {
    /// Source name contains path separators or other unsafe characters
    #[error("Invalid source name: {0:?}")]
    InvalidSource(String),

    /// Unknown log level string
    #[error("Invalid log level: {0:?}")]
    InvalidLevel(String),

    /// Timezone name not found in the IANA database
    #[error("Unknown timezone: {0:?}")]
    UnknownTimezone(String),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using LogError
pub type LogResult<T> = Result<T, LogError>;
