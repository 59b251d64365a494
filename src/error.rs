use std::io;
use thiserror::Error;

/// Error type for profiling operations.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No candidate delimiter met the consistency threshold.
    #[error("Could not detect a dialect: {0}")]
    AmbiguousDialect(String),

    /// A record could not be parsed under the established dialect.
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// Empty file or no data.
    #[error("Empty file or no data to analyze")]
    EmptyData,

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for profiling operations.
pub type Result<T> = std::result::Result<T, ProfileError>;
