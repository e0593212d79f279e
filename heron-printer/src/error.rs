//! Error types for the printer library

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Could not open a connection to the printer
    #[error("Connect failed: {0}")]
    Connect(String),

    /// Connection opened but the payload could not be written
    #[error("Write failed: {0}")]
    Write(String),

    /// The whole operation exceeded the transport timeout
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid printer configuration (bad address, empty host)
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl PrintError {
    /// Short, stable reason string suitable for per-target job results.
    ///
    /// The full `Display` form carries endpoint detail for logs; callers
    /// that aggregate outcomes across printers want just the category.
    pub fn reason(&self) -> &'static str {
        match self {
            PrintError::Connect(_) => "Connect failed",
            PrintError::Write(_) => "Write failed",
            PrintError::Timeout(_) => "Timeout",
            PrintError::InvalidConfig(_) => "Invalid config",
        }
    }
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
