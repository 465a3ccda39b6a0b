//! Validation outcomes and the context handed to the reporter

use std::fmt;

use openssl::x509::X509;
use serde::Serialize;

use super::policy::DomainPinningPolicy;

/// Outcome of a pin validation, as decided by the external validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinningValidationResult {
    /// The chain matched a configured pin
    Success,
    /// The chain was trusted but no certificate matched a configured pin
    PinFailed,
    /// The chain did not verify against the trust store
    ChainNotTrusted,
    /// The chain anchored on a user-installed root, which pinning rejects
    UserDefinedTrustAnchor,
    /// The SPKI hash of a certificate could not be computed
    SpkiHashError,
    /// The validator was called with unusable input
    InvalidParameters,
}

impl PinningValidationResult {
    /// Stable tag used in reports and fingerprints
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::PinFailed => "pin_failed",
            Self::ChainNotTrusted => "chain_not_trusted",
            Self::UserDefinedTrustAnchor => "user_defined_trust_anchor",
            Self::SpkiHashError => "spki_hash_error",
            Self::InvalidParameters => "invalid_parameters",
        }
    }
}

impl fmt::Display for PinningValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the validation layer knows about one failed connection
///
/// Borrowed by the reporter; never modified.
#[derive(Debug, Clone)]
pub struct ValidationContext<'a> {
    /// Hostname the client connected to
    pub hostname: &'a str,
    /// Server port
    pub port: u16,
    /// Chain as sent by the server, leaf first
    pub served_chain: &'a [X509],
    /// Chain as built by the platform verifier, leaf first
    pub validated_chain: &'a [X509],
    /// Policy that matched `hostname`
    pub policy: &'a DomainPinningPolicy,
    /// Validator verdict
    pub result: PinningValidationResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_matches_serde() {
        let all = [
            PinningValidationResult::Success,
            PinningValidationResult::PinFailed,
            PinningValidationResult::ChainNotTrusted,
            PinningValidationResult::UserDefinedTrustAnchor,
            PinningValidationResult::SpkiHashError,
            PinningValidationResult::InvalidParameters,
        ];

        for result in all {
            let json = serde_json::to_string(&result).unwrap();
            assert_eq!(json, format!("\"{}\"", result));
        }
    }
}
