//! Pin Failure Reporter: rate-limited reporting of TLS pin validation failures
//!
//! When a connection fails certificate pin validation, the validation layer
//! hands the failure to a [`BackgroundReporter`]. The reporter snapshots it as
//! a [`PinningFailureReport`], drops it if the same failure was already
//! reported inside the rate-limit window, and otherwise POSTs it as JSON to
//! every report URI of the matched policy. Delivery runs on detached tokio
//! tasks; the caller never waits on the network.
//!
//! # Main Features
//!
//! - PEM snapshots of the served and validated chains
//! - Fingerprint-based deduplication with a configurable window (24h default)
//! - Concurrent per-endpoint delivery with failure isolation
//! - Layered configuration from defaults, a JSON file and the environment
//!
//! # Example
//!
//! ```no_run
//! use pin_failure_reporter::{BackgroundReporter, Result};
//! use pin_failure_reporter::config::ReporterConfig;
//! use pin_failure_reporter::pinning::{DomainPinningPolicy, PinningValidationResult, PublicKeyPin};
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ReporterConfig::from_file("pin-reporter.json")?;
//!     let reporter = BackgroundReporter::from_config(&config)?;
//!
//!     let policy = DomainPinningPolicy::new(
//!         "example.com",
//!         true,
//!         true,
//!         [PublicKeyPin::from_base64("r/mIkG3eEpVdm+u/ko/cwxzOMo1bk4TyHIlByibiA5E=")?],
//!         [Url::parse("https://reports.example.net/pin-failure").unwrap()],
//!     );
//!
//!     // Called from the TLS layer with the chains it saw
//!     let admitted = reporter.report(
//!         "www.example.com",
//!         443,
//!         &[],
//!         &[],
//!         &policy,
//!         PinningValidationResult::PinFailed,
//!     );
//!     println!("report admitted: {}", admitted);
//!
//!     Ok(())
//! }
//! ```

// Public modules
pub mod common;
pub mod config;
pub mod pinning;
pub mod report;
pub mod reporting;

// Re-export commonly used structures and functions for convenience
pub use common::{ReporterError, Result, init_logger};
pub use report::PinningFailureReport;
pub use reporting::{BackgroundReporter, Dispatcher, ReportRateLimiter, ReportTransport};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
