//! Configuration sources
//!
//! This module defines traits and implementations for loading configuration
//! from different sources.

use std::path::{Path, PathBuf};
use std::fs;
use std::env;
use std::str::FromStr;
use log::{debug, warn};

use crate::config::types::{ReporterConfig, ConfigValues, ValueSource};
use crate::config::error::{ConfigError, Result};

/// Configuration source trait
pub trait ConfigSource {
    /// Load configuration from this source
    fn load(&self) -> Result<ReporterConfig>;

    /// Get the source type
    fn source_type(&self) -> ValueSource;
}

/// Default configuration source
pub struct DefaultSource;

impl ConfigSource for DefaultSource {
    fn load(&self) -> Result<ReporterConfig> {
        debug!("Loading default configuration");
        Ok(ReporterConfig::default())
    }

    fn source_type(&self) -> ValueSource {
        ValueSource::Default
    }
}

/// File configuration source (JSON)
pub struct FileSource {
    pub path: PathBuf,
}

impl FileSource {
    /// Create a new file source
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<ReporterConfig> {
        debug!("Loading configuration from file: {}", self.path.display());

        // A missing file contributes nothing
        if !self.path.exists() {
            warn!("Configuration file not found: {}", self.path.display());
            return Ok(ReporterConfig::empty());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            warn!("Failed to read configuration file {}: {}", self.path.display(), e);
            match e.kind() {
                std::io::ErrorKind::PermissionDenied =>
                    ConfigError::FilePermissionDenied(self.path.clone()),
                _ => ConfigError::FileReadError(self.path.clone(), e.to_string()),
            }
        })?;

        let values: ConfigValues = serde_json::from_str(&contents).map_err(|e| {
            let err_msg = format!("Error parsing {}: {}", self.path.display(), e);
            warn!("{}", err_msg);
            ConfigError::ParseError(err_msg)
        })?;

        let mut config = ReporterConfig {
            values,
            config_file: Some(self.path.clone()),
            ..ReporterConfig::empty()
        };

        config.mark_sources(self.source_type());

        Ok(config)
    }

    fn source_type(&self) -> ValueSource {
        ValueSource::File
    }
}

/// Environment variable configuration source
///
/// Variable names are the prefix followed by the upper-cased field name,
/// e.g. `PIN_REPORTER_RATE_LIMIT_ENABLED`.
pub struct EnvSource {
    pub prefix: String,
}

impl EnvSource {
    /// Create a new environment source
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    fn var(&self, name: &str) -> Option<String> {
        let env_name = format!("{}{}", self.prefix, name.to_uppercase());
        match env::var(&env_name) {
            Ok(value) => {
                debug!("Found environment variable {}={}", env_name, value);
                Some(value)
            }
            Err(_) => None,
        }
    }

    fn parsed<T: FromStr>(&self, name: &str) -> Option<T> {
        let value = self.var(name)?;
        match value.trim().parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!("Invalid {} in environment: {}", name, value);
                None
            }
        }
    }
}

impl ConfigSource for EnvSource {
    fn load(&self) -> Result<ReporterConfig> {
        debug!("Loading configuration from environment variables with prefix: {}", self.prefix);

        let values = ConfigValues {
            log_level: self.var("log_level"),
            rate_limit_enabled: self.parsed("rate_limit_enabled"),
            rate_limit_window_secs: self.parsed("rate_limit_window_secs"),
            rate_limit_sweep_interval_secs: self.parsed("rate_limit_sweep_interval_secs"),
            rate_limit_max_entries: self.parsed("rate_limit_max_entries"),
            delivery_timeout_secs: self.parsed("delivery_timeout_secs"),
            app_package_name: self.var("app_package_name"),
            app_version: self.var("app_version"),
            app_vendor_id: self.var("app_vendor_id"),
        };

        let mut config = ReporterConfig {
            values,
            ..ReporterConfig::empty()
        };
        config.mark_sources(self.source_type());

        Ok(config)
    }

    fn source_type(&self) -> ValueSource {
        ValueSource::Environment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_missing_file_contributes_nothing() {
        let config = FileSource::new("does/not/exist.json").load().unwrap();
        assert_eq!(config.values, ConfigValues::default());
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_file_source_tracks_set_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"rate_limit_enabled": false, "app_version": "2.1.0"}}"#).unwrap();

        let config = FileSource::new(file.path()).load().unwrap();

        assert_eq!(config.values.rate_limit_enabled, Some(false));
        assert_eq!(config.values.app_version.as_deref(), Some("2.1.0"));
        assert_eq!(config.source("rate_limit_enabled"), "file");
        assert_eq!(config.source("log_level"), "unknown");
        assert_eq!(config.config_file(), Some(file.path()));
    }

    #[test]
    fn test_file_source_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = FileSource::new(file.path()).load().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_unreadable_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();

        // A directory exists but cannot be read as a file
        let err = FileSource::new(dir.path()).load().unwrap_err();
        assert!(matches!(&err, ConfigError::FileReadError(path, _) if path == dir.path()));
        assert!(err.to_string().contains(&dir.path().display().to_string()));
    }

    #[test]
    #[serial]
    fn test_env_source() {
        env::set_var("PIN_REPORTER_TEST_RATE_LIMIT_WINDOW_SECS", "120");
        env::set_var("PIN_REPORTER_TEST_RATE_LIMIT_ENABLED", "not-a-bool");
        env::set_var("PIN_REPORTER_TEST_APP_VENDOR_ID", "vendor-1");

        let config = EnvSource::new("PIN_REPORTER_TEST_").load().unwrap();

        env::remove_var("PIN_REPORTER_TEST_RATE_LIMIT_WINDOW_SECS");
        env::remove_var("PIN_REPORTER_TEST_RATE_LIMIT_ENABLED");
        env::remove_var("PIN_REPORTER_TEST_APP_VENDOR_ID");

        assert_eq!(config.values.rate_limit_window_secs, Some(120));
        // Unparseable values are ignored with a warning
        assert_eq!(config.values.rate_limit_enabled, None);
        assert_eq!(config.values.app_vendor_id.as_deref(), Some("vendor-1"));
        assert_eq!(config.source("app_vendor_id"), "environment");
    }
}
