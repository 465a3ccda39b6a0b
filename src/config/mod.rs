//! Configuration module
//!
//! This module handles reporter configuration: rate-limit policy, delivery
//! timeout and the application identity stamped on every report. Values are
//! layered from defaults, a JSON file and environment variables, then validated.

mod defaults;
pub mod error;
pub mod types;
pub mod source;
pub mod builder;
pub mod validator;

pub use self::builder::ConfigBuilder;
pub use self::defaults::{
    ENV_PREFIX, DEFAULT_CONFIG_FILE, LOG_LEVEL_STR, RATE_LIMIT_WINDOW_SECS,
    RATE_LIMIT_SWEEP_INTERVAL_SECS, RATE_LIMIT_MAX_ENTRIES, DELIVERY_TIMEOUT_SECS,
};
pub use self::error::ConfigError;
pub use self::source::{ConfigSource, DefaultSource, EnvSource, FileSource};
pub use self::types::{ConfigValues, ReporterConfig, ValueSource};
pub use self::validator::{validate_config, ConfigValidator};
