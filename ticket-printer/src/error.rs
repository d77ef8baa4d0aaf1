//! Error types for the printer core

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Write or print attempted with no live connection
    #[error("Printer not connected")]
    NotConnected,

    /// Device not found, handle open failure, or failed liveness check
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// One enumeration source errored during detection
    #[error("Detection source {source_name} failed: {reason}")]
    DetectionSourceFailed {
        source_name: &'static str,
        reason: String,
    },

    /// Malformed sale or configuration data
    #[error("Invalid ticket input: {0}")]
    EncodingInputInvalid(String),

    /// Timeout waiting for the printer
    #[error("Timeout: {0}")]
    Timeout(String),

    /// IO error during printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid printer configuration (bad address, unknown charset)
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// USB transfer or enumeration error
    #[error("USB error: {0}")]
    Usb(String),

    /// Operating-system print queue error
    #[error("System printer error: {0}")]
    System(String),
}

impl PrintError {
    /// Wrap any error raised while opening a handle as a connection failure
    pub fn connection(err: impl std::fmt::Display) -> Self {
        PrintError::ConnectionFailed(err.to_string())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        PrintError::EncodingInputInvalid(msg.into())
    }
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
