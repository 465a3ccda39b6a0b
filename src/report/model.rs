//! Pin failure report model
//!
//! A [`PinningFailureReport`] is an immutable snapshot of one pin validation
//! failure. Its JSON form is what collection endpoints receive.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::common::Result;
use crate::config::ReporterConfig;
use crate::pinning::{DomainPinningPolicy, PinningValidationResult, PublicKeyPin};
use super::fingerprint::ReportFingerprint;

/// Timestamp layout used in the report document
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Identity of the application sending reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    /// Package or bundle name
    pub package_name: String,
    /// Application version
    pub version: String,
    /// Per-install vendor identifier
    pub vendor_id: String,
}

impl AppIdentity {
    /// Create an identity
    pub fn new(package_name: impl Into<String>, version: impl Into<String>, vendor_id: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            version: version.into(),
            vendor_id: vendor_id.into(),
        }
    }

    /// Identity configured for this process
    pub fn from_config(config: &ReporterConfig) -> Self {
        Self::new(config.app_package_name(), config.app_version(), config.app_vendor_id())
    }
}

/// One pin validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinningFailureReport {
    app_package_name: String,
    app_version: String,
    app_vendor_id: String,
    app_platform: &'static str,
    reporter_version: &'static str,
    hostname: String,
    port: u16,
    noted_hostname: String,
    include_subdomains: bool,
    enforce_pinning: bool,
    validated_certificate_chain: Vec<String>,
    served_certificate_chain: Vec<String>,
    known_pins: BTreeSet<PublicKeyPin>,
    validation_result: PinningValidationResult,
    #[serde(serialize_with = "serialize_date_time")]
    date_time: DateTime<Utc>,
}

fn serialize_date_time<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(DATE_TIME_FORMAT))
}

impl PinningFailureReport {
    /// Snapshot a failure
    ///
    /// Chains are PEM strings, leaf first.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identity: &AppIdentity,
        hostname: &str,
        port: u16,
        policy: &DomainPinningPolicy,
        served_certificate_chain: Vec<String>,
        validated_certificate_chain: Vec<String>,
        date_time: DateTime<Utc>,
        validation_result: PinningValidationResult,
    ) -> Self {
        Self {
            app_package_name: identity.package_name.clone(),
            app_version: identity.version.clone(),
            app_vendor_id: identity.vendor_id.clone(),
            app_platform: std::env::consts::OS,
            reporter_version: crate::VERSION,
            hostname: hostname.to_string(),
            port,
            noted_hostname: policy.hostname().to_string(),
            include_subdomains: policy.include_subdomains(),
            enforce_pinning: policy.enforce_pinning(),
            validated_certificate_chain,
            served_certificate_chain,
            known_pins: policy.public_key_pins().clone(),
            validation_result,
            date_time,
        }
    }

    pub fn app_package_name(&self) -> &str {
        &self.app_package_name
    }

    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    pub fn app_vendor_id(&self) -> &str {
        &self.app_vendor_id
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Hostname pattern of the matched policy
    pub fn noted_hostname(&self) -> &str {
        &self.noted_hostname
    }

    pub fn include_subdomains(&self) -> bool {
        self.include_subdomains
    }

    pub fn enforce_pinning(&self) -> bool {
        self.enforce_pinning
    }

    pub fn served_certificate_chain(&self) -> &[String] {
        &self.served_certificate_chain
    }

    pub fn validated_certificate_chain(&self) -> &[String] {
        &self.validated_certificate_chain
    }

    pub fn known_pins(&self) -> &BTreeSet<PublicKeyPin> {
        &self.known_pins
    }

    pub fn validation_result(&self) -> PinningValidationResult {
        self.validation_result
    }

    /// When the report was created
    pub fn date_time(&self) -> DateTime<Utc> {
        self.date_time
    }

    /// Identity of the failure, independent of chains and timestamp
    pub fn fingerprint(&self) -> ReportFingerprint {
        ReportFingerprint::of(self)
    }

    /// Serialize to the JSON report document
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
