//! Error types for the Peptax CLI
//!
//! Messages are user-facing: each one says what failed and, where it helps,
//! what to check next.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// The annotation service answered with a non-success status
    #[error("Annotation service returned HTTP {status}: {body}")]
    RemoteService { status: u16, body: String },

    /// HTTP request failed before a response arrived (connection, timeout, decoding)
    #[error("Network request failed: {0}. Check your internet connection and the service URL.")]
    Http(#[from] reqwest::Error),

    /// Input directory or file does not exist
    #[error("Input not found: '{}'. Verify the path exists and you have read permissions.", .0.display())]
    InputNotFound(PathBuf),

    /// Output directory cannot be created or written
    #[error("Output directory '{}' is not usable: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// Tab-separated input or output failed
    #[error("Table I/O failed: {0}")]
    Csv(#[from] csv::Error),

    /// TOML configuration parsing failed
    #[error("Failed to parse configuration file: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML configuration rendering failed
    #[error("Failed to render configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your config file, environment variables and flags.")]
    Config(String),

    /// One or more input files could not be processed
    #[error("{failed} of {total} input file(s) failed; see the log for details")]
    FilesFailed { failed: usize, total: usize },

    /// Error from the shared library
    #[error(transparent)]
    Common(#[from] peptax_common::PeptaxError),
}

impl CliError {
    /// Create a remote service error
    pub fn remote_service(status: u16, body: impl Into<String>) -> Self {
        Self::RemoteService {
            status,
            body: body.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether retrying the same request could succeed.
    ///
    /// Transport timeouts and connection failures are transient, as are
    /// rate-limit and server-side statuses. Client errors never are.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RemoteService { status, .. } => *status == 429 || *status >= 500,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
