//! Public key pins
//!
//! A pin is the base64 encoding of the SHA-256 digest of a certificate's
//! DER-encoded SubjectPublicKeyInfo.

use std::fmt;
use std::str::FromStr;

use openssl::base64;
use openssl::x509::X509Ref;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::common::{ReporterError, Result};

/// Length of a SHA-256 digest in bytes
const SPKI_HASH_LEN: usize = 32;

/// An expected SHA-256 SubjectPublicKeyInfo hash
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKeyPin {
    base64: String,
}

impl PublicKeyPin {
    /// Parse a pin from its base64 form
    ///
    /// # Errors
    ///
    /// Returns [`ReporterError::InvalidPin`] if the value is not valid base64
    /// or does not decode to a 32-byte digest.
    pub fn from_base64(value: &str) -> Result<Self> {
        let value = value.trim();
        let decoded = base64::decode_block(value)
            .map_err(|e| ReporterError::InvalidPin(format!("{}: {}", value, e)))?;

        if decoded.len() != SPKI_HASH_LEN {
            return Err(ReporterError::InvalidPin(format!(
                "{}: expected a {}-byte SHA-256 digest, got {} bytes",
                value,
                SPKI_HASH_LEN,
                decoded.len()
            )));
        }

        Ok(Self { base64: value.to_string() })
    }

    /// Compute the pin of a certificate's public key
    pub fn from_certificate(cert: &X509Ref) -> Result<Self> {
        let spki = cert.public_key()?.public_key_to_der()?;
        let digest = Sha256::digest(&spki);

        Ok(Self { base64: base64::encode_block(&digest) })
    }

    /// The base64 digest
    pub fn as_base64(&self) -> &str {
        &self.base64
    }

    /// The HPKP-style directive form, `pin-sha256="<base64>"`
    pub fn to_directive(&self) -> String {
        format!("pin-sha256=\"{}\"", self.base64)
    }
}

impl fmt::Display for PublicKeyPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base64)
    }
}

impl FromStr for PublicKeyPin {
    type Err = ReporterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_base64(s)
    }
}

impl Serialize for PublicKeyPin {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_directive())
    }
}
