//! Configuration validator
//!
//! This module provides functionality for validating configuration.

use log::warn;

use crate::config::types::ReporterConfig;
use crate::config::error::{ConfigError, Result};

/// Validate the configuration
pub fn validate_config(config: &ReporterConfig) -> Result<()> {
    validate_rate_limit_settings(config)?;
    validate_delivery_settings(config)?;
    validate_identity(config)?;

    for warning in config.check_warnings() {
        warn!("{}", warning);
    }

    Ok(())
}

fn validate_rate_limit_settings(config: &ReporterConfig) -> Result<()> {
    // The window still matters when disabled: it may be re-enabled by a reload
    if config.rate_limit_window().is_zero() {
        return Err(invalid("rate_limit_window_secs", "Rate-limit window must be greater than 0"));
    }

    if config.rate_limit_sweep_interval().is_zero() {
        return Err(invalid("rate_limit_sweep_interval_secs", "Sweep interval must be greater than 0"));
    }

    if config.rate_limit_max_entries() == 0 {
        return Err(invalid("rate_limit_max_entries", "Maximum entries must be greater than 0"));
    }

    Ok(())
}

fn validate_delivery_settings(config: &ReporterConfig) -> Result<()> {
    if config.delivery_timeout().is_zero() {
        return Err(invalid("delivery_timeout_secs", "Delivery timeout must be greater than 0"));
    }

    Ok(())
}

fn validate_identity(config: &ReporterConfig) -> Result<()> {
    let fields = [
        ("app_package_name", config.app_package_name()),
        ("app_version", config.app_version()),
        ("app_vendor_id", config.app_vendor_id()),
    ];

    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(invalid(name, "Application identity must not be empty"));
        }
    }

    Ok(())
}

fn invalid(name: &str, msg: &str) -> ConfigError {
    ConfigError::InvalidValue(name.to_string(), msg.to_string())
}

/// Configuration validator trait
pub trait ConfigValidator {
    /// Check configuration for warnings
    fn check_warnings(&self) -> Vec<String>;
}

impl ConfigValidator for ReporterConfig {
    fn check_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        match self.log_level() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            level => {
                warnings.push(format!("Invalid log level '{}', using default 'info'", level));
            }
        }

        if !self.rate_limit_enabled() {
            warnings.push("Rate limiting is disabled: every pin failure will be reported".to_string());
        }

        if self.rate_limit_sweep_interval() > self.rate_limit_window() {
            warnings.push(format!(
                "Sweep interval {:?} is longer than the rate-limit window {:?}",
                self.rate_limit_sweep_interval(),
                self.rate_limit_window()
            ));
        }

        warnings
    }
}
