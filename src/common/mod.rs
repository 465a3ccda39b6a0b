//! Common module
//!
//! This module contains shared error types and logging helpers used throughout the library.

pub mod error;
pub mod log;

// Re-export commonly used types and functions
pub use error::{ReporterError, Result};
pub use log::init_logger;
