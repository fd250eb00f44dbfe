//! Exit code definitions for the xfer CLI
//!
//! Codes are part of the public interface; scripts rely on them.

/// Exit codes for the xfer CLI application.
///
/// These codes follow a consistent convention to allow scripts and automation
/// to handle different error scenarios appropriately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error
    GeneralError = 1,

    /// User input error: invalid arguments, malformed path, etc.
    UsageError = 2,

    /// Listing the source failed: network error, timeout, denied listing
    NetworkError = 3,

    /// Resource not found: bucket or object does not exist
    NotFound = 5,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Map a core error to its exit code
    pub fn from_error(error: &xfer_core::Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            5 => Some(Self::NotFound),
            _ => None,
        }
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or path format",
            Self::NetworkError => "Listing or network error",
            Self::NotFound => "Resource not found",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}
