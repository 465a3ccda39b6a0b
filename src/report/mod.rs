//! Failure reports
//!
//! Building blocks of a report: PEM encoding of certificate chains, the
//! immutable report snapshot and the fingerprint used for deduplication.

pub mod fingerprint;
pub mod model;
pub mod pem;

pub use fingerprint::ReportFingerprint;
pub use model::{AppIdentity, PinningFailureReport};
pub use pem::{certificate_to_pem, encode_chain, parse_pem_chain, CertificateEncodingInvariant};
