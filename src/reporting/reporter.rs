//! Background reporter
//!
//! Entry point called by the validation layer when a pin check fails. It
//! snapshots the failure, asks the rate limiter whether the same failure was
//! reported recently and, if not, hands the report to the dispatcher. It
//! never waits on the network.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};
use metrics::counter;
use openssl::x509::X509;
use tokio::runtime::Handle;

use crate::common::{ReporterError, Result};
use crate::config::ReporterConfig;
use crate::pinning::{DomainPinningPolicy, PinningValidationResult, ValidationContext};
use crate::report::{encode_chain, AppIdentity, PinningFailureReport};
use super::dispatcher::Dispatcher;
use super::rate_limiter::ReportRateLimiter;
use super::transport::HttpTransport;

/// Builds, deduplicates and dispatches pin failure reports
#[derive(Debug)]
pub struct BackgroundReporter {
    identity: AppIdentity,
    rate_limiter: Arc<ReportRateLimiter>,
    dispatcher: Dispatcher,
}

impl BackgroundReporter {
    /// Assemble a reporter from its parts
    pub fn new(identity: AppIdentity, rate_limiter: Arc<ReportRateLimiter>, dispatcher: Dispatcher) -> Self {
        Self {
            identity,
            rate_limiter,
            dispatcher,
        }
    }

    /// A reporter delivering over HTTP on the current tokio runtime
    ///
    /// # Errors
    ///
    /// Fails when called outside a tokio runtime or when the HTTP client
    /// cannot be built.
    pub fn from_config(config: &ReporterConfig) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| ReporterError::Runtime(format!("pin failure reports need a tokio runtime: {}", e)))?;
        let transport = Arc::new(HttpTransport::from_config(config)?);

        info!(
            "Pin failure reporting enabled for {} {} (rate limiting {})",
            config.app_package_name(),
            config.app_version(),
            if config.rate_limit_enabled() { "on" } else { "off" }
        );

        Ok(Self::new(
            AppIdentity::from_config(config),
            Arc::new(ReportRateLimiter::from_config(config)),
            Dispatcher::new(transport, runtime),
        ))
    }

    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    /// The shared rate limiter, e.g. to start a background sweeper
    pub fn rate_limiter(&self) -> &Arc<ReportRateLimiter> {
        &self.rate_limiter
    }

    /// Report a pin validation failure
    ///
    /// Returns `true` if the report was admitted and handed off for delivery,
    /// `false` if an equivalent report was sent within the rate-limit window.
    /// Delivery success is never reflected here.
    ///
    /// # Panics
    ///
    /// Panics if a certificate cannot be re-encoded, see
    /// [`crate::report::CertificateEncodingInvariant`].
    pub fn report(
        &self,
        hostname: &str,
        port: u16,
        served_chain: &[X509],
        validated_chain: &[X509],
        policy: &DomainPinningPolicy,
        result: PinningValidationResult,
    ) -> bool {
        info!("Generating pin failure report for {}", hostname);

        let validated = encode_chain(validated_chain);
        let served = encode_chain(served_chain);

        let report = PinningFailureReport::new(
            &self.identity,
            hostname,
            port,
            policy,
            served,
            validated,
            Utc::now(),
            result,
        );

        if !self.rate_limiter.admit(&report) {
            info!("Report for {} was not sent due to rate-limiting", hostname);
            counter!("pin_reports_suppressed_total").increment(1);
            return false;
        }

        counter!("pin_reports_admitted_total").increment(1);
        let attempts = self.dispatcher.send_all(&report, policy.report_uris());
        debug!("Started {} delivery attempt(s) for {}:{}", attempts, hostname, port);

        true
    }

    /// [`report`](Self::report) taking the validator's context
    pub fn pin_validation_failed(&self, context: &ValidationContext<'_>) -> bool {
        self.report(
            context.hostname,
            context.port,
            context.served_chain,
            context.validated_chain,
            context.policy,
            context.result,
        )
    }
}
