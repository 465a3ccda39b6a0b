//! Pinning inputs
//!
//! Types produced by the certificate-pinning layer and consumed by the
//! reporter: expected pins, the per-domain policy and the validation verdict.

pub mod pin;
pub mod policy;
pub mod validation;

pub use pin::PublicKeyPin;
pub use policy::DomainPinningPolicy;
pub use validation::{PinningValidationResult, ValidationContext};
