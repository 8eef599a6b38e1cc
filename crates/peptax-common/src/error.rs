//! Error types for Peptax

use thiserror::Error;

/// Result type alias for Peptax operations
pub type Result<T> = std::result::Result<T, PeptaxError>;

/// Main error type for Peptax
#[derive(Error, Debug)]
pub enum PeptaxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<regex::Error> for PeptaxError {
    fn from(err: regex::Error) -> Self {
        PeptaxError::Parse(err.to_string())
    }
}
