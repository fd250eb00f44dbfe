//! Error types for xfer-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for xfer-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for xfer-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required positional value is blank
    #[error("{0} is required")]
    MissingArgument(String),

    /// Endpoints cannot be classified or parsed
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Include or exclude glob failed to compile
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A single upload, download, copy or delete failed
    #[error("Transfer failed: {0}")]
    TransferFailure(String),

    /// Enumerating remote keys or local files failed
    #[error("Listing failed: {0}")]
    ListingFailure(String),

    /// Object or bucket does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::MissingArgument(_)
            | Error::InvalidArguments(_)
            | Error::InvalidPattern { .. } => 2, // UsageError
            Error::Config(_) | Error::TomlParse(_) | Error::InvalidUrl(_) => 2, // UsageError
            Error::ListingFailure(_) => 3, // NetworkError
            Error::NotFound(_) => 5,       // NotFound
            _ => 1,                        // GeneralError
        }
    }
}
