//! Error handling module
//!
//! This module defines the error types and result type aliases used in the library.
//!
//! Certificate encoding failures are not represented here. They are
//! invariant violations and live in [`crate::report::pem`].

use thiserror::Error;

/// Pin failure reporter error type
#[derive(Error, Debug)]
pub enum ReporterError {
    /// OpenSSL error
    #[error("OpenSSL error: {0}")]
    Ssl(#[from] openssl::error::ErrorStack),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Report serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Endpoint rejected or could not receive a report
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Malformed public key pin
    #[error("Invalid pin: {0}")]
    InvalidPin(String),

    /// No async runtime available for background delivery
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Result type alias
///
/// This is a `Result` type alias that uses our custom `ReporterError`.
pub type Result<T> = std::result::Result<T, ReporterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: ReporterError = json_err.into();
        assert!(matches!(err, ReporterError::Serialization(_)));
    }

    #[test]
    fn test_error_display() {
        let err = ReporterError::Delivery("HTTP 503 from https://reports.example.com".to_string());
        let err_str = format!("{}", err);
        assert!(err_str.starts_with("Delivery error"));
        assert!(err_str.contains("503"));
    }
}
