//! Report fingerprints
//!
//! Two reports describe the same failure when they agree on the connection
//! target, the matched policy, the verdict and the expected pins. Certificate
//! chains and timestamps are excluded: chains vary per connection while the
//! policy violation stays the same.

use std::fmt;

use sha2::{Digest, Sha256};

use super::model::PinningFailureReport;

/// SHA-256 identity of a failure
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportFingerprint([u8; 32]);

impl ReportFingerprint {
    /// Fingerprint a report
    pub fn of(report: &PinningFailureReport) -> Self {
        let mut hasher = Sha256::new();

        // Length-prefixed so that adjacent fields cannot run together
        let mut field = |bytes: &[u8]| {
            hasher.update((bytes.len() as u64).to_be_bytes());
            hasher.update(bytes);
        };

        field(report.hostname().to_ascii_lowercase().as_bytes());
        field(&report.port().to_be_bytes());
        field(report.noted_hostname().as_bytes());
        field(&[report.include_subdomains() as u8, report.enforce_pinning() as u8]);
        field(report.validation_result().as_str().as_bytes());

        // known_pins is a sorted set, so order of configuration does not matter
        field(&(report.known_pins().len() as u64).to_be_bytes());
        for pin in report.known_pins() {
            field(pin.as_base64().as_bytes());
        }

        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        Self(digest)
    }

    /// Raw digest
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ReportFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ReportFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReportFingerprint({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pinning::{DomainPinningPolicy, PinningValidationResult, PublicKeyPin};
    use crate::report::AppIdentity;
    use chrono::{Duration, Utc};

    const PIN_A: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";
    const PIN_B: &str = "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBA=";

    fn policy(pins: &[&str], enforce: bool) -> DomainPinningPolicy {
        DomainPinningPolicy::new(
            "example.com",
            false,
            enforce,
            pins.iter().map(|p| PublicKeyPin::from_base64(p).unwrap()),
            [],
        )
    }

    fn report(
        hostname: &str,
        policy: &DomainPinningPolicy,
        served: &str,
        age: Duration,
        result: PinningValidationResult,
    ) -> PinningFailureReport {
        PinningFailureReport::new(
            &AppIdentity::new("app", "1.0", "vendor"),
            hostname,
            443,
            policy,
            vec![served.to_string()],
            vec![],
            Utc::now() - age,
            result,
        )
    }

    #[test]
    fn test_ignores_chains_and_time() {
        let policy = policy(&[PIN_A], true);
        let a = report("example.com", &policy, "chain-1", Duration::zero(), PinningValidationResult::PinFailed);
        let b = report("EXAMPLE.COM", &policy, "chain-2", Duration::hours(3), PinningValidationResult::PinFailed);

        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_pin_order_independent() {
        let a = report("example.com", &policy(&[PIN_A, PIN_B], true), "c", Duration::zero(), PinningValidationResult::PinFailed);
        let b = report("example.com", &policy(&[PIN_B, PIN_A], true), "c", Duration::zero(), PinningValidationResult::PinFailed);

        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_identifying_fields_matter() {
        let base_policy = policy(&[PIN_A], true);
        let base = report("example.com", &base_policy, "c", Duration::zero(), PinningValidationResult::PinFailed);

        let other_host = report("www.example.com", &base_policy, "c", Duration::zero(), PinningValidationResult::PinFailed);
        let other_result = report("example.com", &base_policy, "c", Duration::zero(), PinningValidationResult::ChainNotTrusted);
        let other_pins = report("example.com", &policy(&[PIN_A, PIN_B], true), "c", Duration::zero(), PinningValidationResult::PinFailed);
        let report_only = report("example.com", &policy(&[PIN_A], false), "c", Duration::zero(), PinningValidationResult::PinFailed);

        for other in [other_host, other_result, other_pins, report_only] {
            assert_ne!(base.fingerprint(), other.fingerprint());
        }
    }

    #[test]
    fn test_display_is_hex() {
        let policy = policy(&[PIN_A], true);
        let fp = report("example.com", &policy, "c", Duration::zero(), PinningValidationResult::PinFailed).fingerprint();
        let hex = fp.to_string();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
