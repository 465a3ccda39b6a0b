//! Configuration types
//!
//! This module contains the main configuration types used throughout the library.

use std::path::{Path, PathBuf};
use std::collections::HashMap;
use std::ops::Deref;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use log::debug;

use crate::config::defaults;

/// Source of a configuration value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueSource {
    /// Default value
    Default,
    /// From configuration file
    File,
    /// From environment variable
    Environment,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::Default => write!(f, "default"),
            ValueSource::File => write!(f, "file"),
            ValueSource::Environment => write!(f, "environment"),
        }
    }
}

/// Configuration values
///
/// Every field is optional so that sources can be layered: a value set by a
/// later source overrides the same value from an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigValues {
    // --- General settings ---

    /// Log level (error, warn, info, debug, trace)
    #[serde(default)]
    pub log_level: Option<String>,

    // --- Rate limiting ---

    /// Whether duplicate reports are suppressed inside the window
    #[serde(default)]
    pub rate_limit_enabled: Option<bool>,

    /// Length of the admission window in seconds
    #[serde(default)]
    pub rate_limit_window_secs: Option<u64>,

    /// How often expired fingerprints are swept, in seconds
    #[serde(default)]
    pub rate_limit_sweep_interval_secs: Option<u64>,

    /// Upper bound on remembered fingerprints
    #[serde(default)]
    pub rate_limit_max_entries: Option<usize>,

    // --- Delivery ---

    /// Per-attempt delivery timeout in seconds
    #[serde(default)]
    pub delivery_timeout_secs: Option<u64>,

    // --- Application identity ---

    /// Package name reported as `app_package_name`
    #[serde(default)]
    pub app_package_name: Option<String>,

    /// Version reported as `app_version`
    #[serde(default)]
    pub app_version: Option<String>,

    /// Install identifier reported as `app_vendor_id`
    #[serde(default)]
    pub app_vendor_id: Option<String>,
}

/// Reporter configuration
///
/// Supports loading from configuration files and environment variables,
/// and tracks where each value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterConfig {
    /// Configuration values
    pub values: ConfigValues,

    /// Configuration file path
    pub config_file: Option<PathBuf>,

    /// Source tracking for configuration values
    pub sources: HashMap<String, ValueSource>,
}

impl Deref for ReporterConfig {
    type Target = ConfigValues;

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl Serialize for ReporterConfig {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.values.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ReporterConfig {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let values = ConfigValues::deserialize(deserializer)?;
        Ok(Self {
            values,
            config_file: None,
            sources: HashMap::new(),
        })
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        let mut config = Self::empty();

        // Apply default values and track their source
        config.set_default_values();

        config
    }
}

impl ReporterConfig {
    /// A configuration with no values set, not even defaults
    pub fn empty() -> Self {
        Self {
            values: ConfigValues::default(),
            config_file: None,
            sources: HashMap::new(),
        }
    }

    /// Set default values for all configuration options that are still unset
    pub fn set_default_values(&mut self) {
        macro_rules! default_field {
            ($name:ident) => {
                if self.values.$name.is_none() {
                    self.values.$name = Some(defaults::$name());
                    self.sources.insert(stringify!($name).to_string(), ValueSource::Default);
                }
            };
        }

        default_field!(log_level);
        default_field!(rate_limit_enabled);
        default_field!(rate_limit_window_secs);
        default_field!(rate_limit_sweep_interval_secs);
        default_field!(rate_limit_max_entries);
        default_field!(delivery_timeout_secs);
        default_field!(app_package_name);
        default_field!(app_version);
        default_field!(app_vendor_id);
    }

    /// Load configuration from a specific file, then the environment
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::common::Result<Self> {
        use crate::config::{ENV_PREFIX, builder::ConfigBuilder};

        let config = ConfigBuilder::new()
            .with_defaults()
            .with_file(path)
            .with_env(ENV_PREFIX)
            .build()?;

        debug!("Configuration validated successfully");
        Ok(config)
    }

    /// Get the source of a configuration value
    pub fn source(&self, name: &str) -> &str {
        match self.sources.get(name) {
            Some(ValueSource::Default) => "default",
            Some(ValueSource::File) => "file",
            Some(ValueSource::Environment) => "environment",
            None => "unknown",
        }
    }

    /// Get the log level
    pub fn log_level(&self) -> &str {
        self.values.log_level.as_deref().unwrap_or(defaults::LOG_LEVEL_STR)
    }

    /// Whether rate limiting is enabled
    pub fn rate_limit_enabled(&self) -> bool {
        self.values.rate_limit_enabled.unwrap_or_else(defaults::rate_limit_enabled)
    }

    /// Get the admission window
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(
            self.values.rate_limit_window_secs.unwrap_or(defaults::RATE_LIMIT_WINDOW_SECS),
        )
    }

    /// Get the sweep interval for expired fingerprints
    pub fn rate_limit_sweep_interval(&self) -> Duration {
        Duration::from_secs(
            self.values
                .rate_limit_sweep_interval_secs
                .unwrap_or(defaults::RATE_LIMIT_SWEEP_INTERVAL_SECS),
        )
    }

    /// Get the maximum number of remembered fingerprints
    pub fn rate_limit_max_entries(&self) -> usize {
        self.values.rate_limit_max_entries.unwrap_or(defaults::RATE_LIMIT_MAX_ENTRIES)
    }

    /// Get the per-attempt delivery timeout
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(
            self.values.delivery_timeout_secs.unwrap_or(defaults::DELIVERY_TIMEOUT_SECS),
        )
    }

    /// Get the application package name
    pub fn app_package_name(&self) -> &str {
        self.values.app_package_name.as_deref().unwrap_or(env!("CARGO_PKG_NAME"))
    }

    /// Get the application version
    pub fn app_version(&self) -> &str {
        self.values.app_version.as_deref().unwrap_or(env!("CARGO_PKG_VERSION"))
    }

    /// Get the application vendor id
    ///
    /// Empty only if defaults were never applied.
    pub fn app_vendor_id(&self) -> &str {
        self.values.app_vendor_id.as_deref().unwrap_or("")
    }

    /// Get the configuration file path
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Merge two configurations
    ///
    /// Values set in `other` win and are attributed to `source`.
    pub fn merge(&self, other: &ReporterConfig, source: ValueSource) -> Self {
        let mut result = self.clone();

        macro_rules! merge_field {
            ($name:ident) => {
                if other.values.$name.is_some() {
                    result.values.$name = other.values.$name.clone();
                    result.sources.insert(stringify!($name).to_string(), source);
                }
            };
        }

        merge_field!(log_level);
        merge_field!(rate_limit_enabled);
        merge_field!(rate_limit_window_secs);
        merge_field!(rate_limit_sweep_interval_secs);
        merge_field!(rate_limit_max_entries);
        merge_field!(delivery_timeout_secs);
        merge_field!(app_package_name);
        merge_field!(app_version);
        merge_field!(app_vendor_id);

        if let Some(path) = &other.config_file {
            result.config_file = Some(path.clone());
        }

        result
    }

    /// Attribute every value currently set to `source`
    pub fn mark_sources(&mut self, source: ValueSource) {
        self.sources = Self::empty().merge(self, source).sources;
    }

    /// Log the configuration
    pub fn log(&self) {
        debug!("=== Configuration ===");
        debug!("  Log level: {} (from {})", self.log_level(), self.source("log_level"));

        debug!("Rate limiting:");
        debug!("  Enabled: {} (from {})", self.rate_limit_enabled(), self.source("rate_limit_enabled"));
        debug!("  Window: {:?} (from {})", self.rate_limit_window(), self.source("rate_limit_window_secs"));
        debug!("  Sweep interval: {:?} (from {})", self.rate_limit_sweep_interval(), self.source("rate_limit_sweep_interval_secs"));
        debug!("  Max entries: {} (from {})", self.rate_limit_max_entries(), self.source("rate_limit_max_entries"));

        debug!("Delivery:");
        debug!("  Timeout: {:?} (from {})", self.delivery_timeout(), self.source("delivery_timeout_secs"));

        debug!("Application identity:");
        debug!("  Package: {} (from {})", self.app_package_name(), self.source("app_package_name"));
        debug!("  Version: {} (from {})", self.app_version(), self.source("app_version"));
        debug!("  Vendor id: {} (from {})", self.app_vendor_id(), self.source("app_vendor_id"));

        if let Some(file) = self.config_file() {
            debug!("  Configuration file: {}", file.display());
        }

        debug!("=====================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_tracked() {
        let config = ReporterConfig::default();

        assert_eq!(config.log_level(), "info");
        assert!(config.rate_limit_enabled());
        assert_eq!(config.rate_limit_window(), Duration::from_secs(86_400));
        assert_eq!(config.rate_limit_max_entries(), 4096);
        assert_eq!(config.delivery_timeout(), Duration::from_secs(10));
        assert_eq!(config.source("rate_limit_enabled"), "default");
        assert_eq!(config.source("no_such_field"), "unknown");
        assert!(!config.app_vendor_id().is_empty());
    }

    #[test]
    fn test_merge_overrides_only_set_fields() {
        let base = ReporterConfig::default();
        let mut file = ReporterConfig::empty();
        file.values.rate_limit_enabled = Some(false);
        file.values.app_vendor_id = Some("install-42".to_string());

        let merged = base.merge(&file, ValueSource::File);

        assert!(!merged.rate_limit_enabled());
        assert_eq!(merged.app_vendor_id(), "install-42");
        assert_eq!(merged.source("rate_limit_enabled"), "file");
        // Untouched values keep their origin
        assert_eq!(merged.source("log_level"), "default");
        assert_eq!(merged.rate_limit_window(), base.rate_limit_window());
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let err = serde_json::from_str::<ConfigValues>(r#"{"listen": "0.0.0.0:8443"}"#);
        assert!(err.is_err());

        let values: ConfigValues =
            serde_json::from_str(r#"{"rate_limit_window_secs": 60}"#).unwrap();
        assert_eq!(values.rate_limit_window_secs, Some(60));
        assert_eq!(values.log_level, None);
    }
}
