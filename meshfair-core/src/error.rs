//! Error types for meshfair

use thiserror::Error;

/// Main error type for meshfair operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid smoothing setup detected before any mesh data is touched
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),
}

impl Error {
    /// Shorthand for [`Error::Configuration`]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }
}

/// Result type alias for meshfair operations
pub type Result<T> = std::result::Result<T, Error>;
