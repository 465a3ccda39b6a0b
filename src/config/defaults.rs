//! Default configuration values
//!
//! This module provides default values for configuration options.
//! It is the single source of truth for defaults.

use uuid::Uuid;

/// Environment variable prefix for all configuration options
pub const ENV_PREFIX: &str = "PIN_REPORTER_";

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "pin-reporter.json";

/// Default log level as string
pub const LOG_LEVEL_STR: &str = "info";

/// Default rate-limit window: 24 hours
pub const RATE_LIMIT_WINDOW_SECS: u64 = 24 * 60 * 60;

/// Default interval between sweeps of expired fingerprints: 1 hour
pub const RATE_LIMIT_SWEEP_INTERVAL_SECS: u64 = 60 * 60;

/// Default bound on remembered fingerprints
pub const RATE_LIMIT_MAX_ENTRIES: usize = 4096;

/// Default per-attempt delivery timeout
pub const DELIVERY_TIMEOUT_SECS: u64 = 10;

/// Default log level
pub fn log_level() -> String {
    LOG_LEVEL_STR.to_string()
}

/// Rate limiting is on unless explicitly disabled
pub fn rate_limit_enabled() -> bool {
    true
}

/// Default rate-limit window in seconds
pub fn rate_limit_window_secs() -> u64 {
    RATE_LIMIT_WINDOW_SECS
}

/// Default sweep interval in seconds
pub fn rate_limit_sweep_interval_secs() -> u64 {
    RATE_LIMIT_SWEEP_INTERVAL_SECS
}

/// Default maximum number of fingerprints kept
pub fn rate_limit_max_entries() -> usize {
    RATE_LIMIT_MAX_ENTRIES
}

/// Default delivery timeout in seconds
pub fn delivery_timeout_secs() -> u64 {
    DELIVERY_TIMEOUT_SECS
}

/// Default application package name
pub fn app_package_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

/// Default application version
pub fn app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Default vendor id
///
/// Nothing is persisted, so every process gets a fresh install identifier
/// unless the host supplies a stable one.
pub fn app_vendor_id() -> String {
    Uuid::new_v4().to_string()
}
