//! Certificate encoder
//!
//! Certificates reaching the reporter were already accepted by the platform's
//! X.509 parser, so re-encoding them cannot fail in a working system. A
//! failure is a broken upstream guarantee: it gets its own error type, kept
//! out of [`crate::common::Result`], and [`certificate_to_pem`] panics on it.

use openssl::error::ErrorStack;
use openssl::x509::{X509, X509Ref};
use thiserror::Error;

use crate::common::Result;

/// A parsed certificate could not be encoded back to PEM
#[derive(Error, Debug)]
pub enum CertificateEncodingInvariant {
    /// DER/PEM serialization failed inside OpenSSL
    #[error("certificate previously parsed by the platform could not be re-encoded: {0}")]
    Encode(#[from] ErrorStack),

    /// OpenSSL produced PEM output that is not text
    #[error("PEM encoding of a parsed certificate is not valid UTF-8")]
    NotText,
}

/// Encode a certificate as PEM, reporting an invariant violation as a value
pub fn try_certificate_to_pem(cert: &X509Ref) -> std::result::Result<String, CertificateEncodingInvariant> {
    let pem = cert.to_pem()?;
    String::from_utf8(pem).map_err(|_| CertificateEncodingInvariant::NotText)
}

/// Encode a certificate as PEM
///
/// Output is a `-----BEGIN CERTIFICATE-----` line, the base64 DER body and
/// the matching `END` line, newline terminated.
///
/// # Panics
///
/// Panics with [`CertificateEncodingInvariant`] if the certificate cannot be
/// encoded.
pub fn certificate_to_pem(cert: &X509Ref) -> String {
    match try_certificate_to_pem(cert) {
        Ok(pem) => pem,
        Err(invariant) => panic!("{}", invariant),
    }
}

/// Encode a chain, preserving order
pub fn encode_chain(chain: &[X509]) -> Vec<String> {
    chain.iter().map(|cert| certificate_to_pem(cert)).collect()
}

/// Parse a concatenation of PEM certificates, in order
pub fn parse_pem_chain(pem: &str) -> Result<Vec<X509>> {
    Ok(X509::stack_from_pem(pem.as_bytes())?)
}
