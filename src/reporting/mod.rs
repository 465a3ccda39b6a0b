//! Reporting pipeline
//!
//! `BackgroundReporter` → `ReportRateLimiter` → `Dispatcher` → `ReportTransport`.

pub mod clock;
pub mod dispatcher;
pub mod rate_limiter;
pub mod reporter;
pub mod transport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dispatcher::{DeliveryOutcome, DeliveryStatus, Dispatcher};
pub use rate_limiter::ReportRateLimiter;
pub use reporter::BackgroundReporter;
pub use transport::{HttpTransport, ReportTransport};
