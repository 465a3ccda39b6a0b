//! Per-domain pinning policy
//!
//! Policies are parsed and loaded elsewhere; the reporter only reads the
//! fields that end up in a report and the set of report URIs.

use std::collections::BTreeSet;

use url::Url;

use super::pin::PublicKeyPin;

/// Pinning policy for one hostname pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPinningPolicy {
    hostname: String,
    include_subdomains: bool,
    enforce_pinning: bool,
    public_key_pins: BTreeSet<PublicKeyPin>,
    report_uris: Vec<Url>,
}

impl DomainPinningPolicy {
    /// Create a policy
    ///
    /// The hostname is lower-cased; duplicate report URIs are dropped while
    /// keeping their first-seen order.
    pub fn new(
        hostname: &str,
        include_subdomains: bool,
        enforce_pinning: bool,
        public_key_pins: impl IntoIterator<Item = PublicKeyPin>,
        report_uris: impl IntoIterator<Item = Url>,
    ) -> Self {
        let mut uris: Vec<Url> = Vec::new();
        for uri in report_uris {
            if !uris.contains(&uri) {
                uris.push(uri);
            }
        }

        Self {
            hostname: hostname.trim_end_matches('.').to_ascii_lowercase(),
            include_subdomains,
            enforce_pinning,
            public_key_pins: public_key_pins.into_iter().collect(),
            report_uris: uris,
        }
    }

    /// The pinned hostname (the "noted" hostname in reports)
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Whether subdomains of `hostname` are covered
    pub fn include_subdomains(&self) -> bool {
        self.include_subdomains
    }

    /// Whether a pin failure blocks the connection (false means report-only)
    pub fn enforce_pinning(&self) -> bool {
        self.enforce_pinning
    }

    /// Expected pins, sorted
    pub fn public_key_pins(&self) -> &BTreeSet<PublicKeyPin> {
        &self.public_key_pins
    }

    /// Where failure reports go; may be empty
    pub fn report_uris(&self) -> &[Url] {
        &self.report_uris
    }

    /// Whether this policy applies to `server_hostname`
    pub fn matches_hostname(&self, server_hostname: &str) -> bool {
        let server = server_hostname.trim_end_matches('.').to_ascii_lowercase();
        if server == self.hostname {
            return true;
        }

        self.include_subdomains
            && server.len() > self.hostname.len()
            && server.ends_with(&self.hostname)
            && server.as_bytes()[server.len() - self.hostname.len() - 1] == b'.'
    }
}
