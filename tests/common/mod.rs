//! Shared helpers for integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::PKey;
use openssl::x509::{X509, X509Builder, X509NameBuilder};
use tokio::sync::mpsc::UnboundedReceiver;
use url::Url;

use pin_failure_reporter::common::{ReporterError, Result};
use pin_failure_reporter::pinning::{DomainPinningPolicy, PublicKeyPin};
use pin_failure_reporter::reporting::{DeliveryOutcome, ReportTransport};

/// Self-signed P-256 certificate
pub fn generate_cert(cn: &str, serial: u32) -> X509 {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    let key = PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", cn).unwrap();
    let name = name.build();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(serial).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(&key).unwrap();
    builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
    builder.set_not_after(&Asn1Time::days_from_now(30).unwrap()).unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();
    builder.build()
}

/// A chain of `len` unrelated certificates, leaf first
pub fn chain(prefix: &str, len: u32) -> Vec<X509> {
    (0..len)
        .map(|i| generate_cert(&format!("{}-{}.example.com", prefix, i), i + 1))
        .collect()
}

pub fn endpoint(name: &str) -> Url {
    Url::parse(&format!("https://{}.collector.test/report", name)).unwrap()
}

/// Enforcing policy for example.com reporting to the given endpoints
pub fn policy(endpoints: &[&str]) -> DomainPinningPolicy {
    DomainPinningPolicy::new(
        "example.com",
        true,
        true,
        [PublicKeyPin::from_base64("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=").unwrap()],
        endpoints.iter().map(|name| endpoint(name)),
    )
}

/// Records every delivery; endpoints named in `failing_for` return an error
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<(Url, Bytes)>>,
    failing: HashSet<String>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_for(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            failing: names
                .iter()
                .map(|name| endpoint(name).host_str().unwrap().to_string())
                .collect(),
        })
    }

    pub fn calls(&self) -> Vec<(Url, Bytes)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ReportTransport for RecordingTransport {
    fn deliver(&self, endpoint: &Url, body: Bytes) -> BoxFuture<'static, Result<()>> {
        self.calls.lock().unwrap().push((endpoint.clone(), body));
        let fail = endpoint
            .host_str()
            .map(|host| self.failing.contains(host))
            .unwrap_or(false);

        Box::pin(async move {
            if fail {
                Err(ReporterError::Delivery("collector unavailable".to_string()))
            } else {
                Ok(())
            }
        })
    }
}

/// Wait for exactly `n` outcomes, then make sure no more arrive
pub async fn expect_outcomes(receiver: &mut UnboundedReceiver<DeliveryOutcome>, n: usize) -> Vec<DeliveryOutcome> {
    let mut outcomes = Vec::with_capacity(n);
    for _ in 0..n {
        let outcome = tokio::time::timeout(Duration::from_secs(5), receiver.recv())
            .await
            .expect("timed out waiting for a delivery outcome")
            .expect("outcome channel closed");
        outcomes.push(outcome);
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(receiver.try_recv().is_err(), "unexpected extra delivery");

    outcomes
}
