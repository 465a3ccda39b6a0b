//! Report dispatcher
//!
//! Fans one admitted report out to every configured endpoint. Each endpoint
//! gets its own detached task, so a slow, failing or panicking endpoint
//! cannot hold up the others or the caller.

use std::sync::Arc;

use bytes::Bytes;
use log::{debug, error, info, warn};
use metrics::counter;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use url::Url;

use crate::report::{PinningFailureReport, ReportFingerprint};
use super::transport::ReportTransport;

/// Terminal state of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// The endpoint accepted the report
    Delivered,
    /// The attempt failed; the report is dropped
    Failed(String),
}

/// Result of one delivery attempt, for observability only
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    /// Where the report was sent
    pub endpoint: Url,
    /// Hostname the report is about
    pub hostname: String,
    /// Fingerprint of the report
    pub fingerprint: ReportFingerprint,
    /// How the attempt ended
    pub status: DeliveryStatus,
}

/// Concurrent, fire-and-forget report delivery
pub struct Dispatcher {
    transport: Arc<dyn ReportTransport>,
    runtime: Handle,
    outcomes: Option<UnboundedSender<DeliveryOutcome>>,
}

impl Dispatcher {
    /// Create a dispatcher spawning deliveries on `runtime`
    pub fn new(transport: Arc<dyn ReportTransport>, runtime: Handle) -> Self {
        Self {
            transport,
            runtime,
            outcomes: None,
        }
    }

    /// Create a dispatcher that also publishes every delivery outcome
    ///
    /// Outcomes are dropped silently once the receiver is gone.
    pub fn with_outcomes(
        transport: Arc<dyn ReportTransport>,
        runtime: Handle,
    ) -> (Self, UnboundedReceiver<DeliveryOutcome>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let dispatcher = Self {
            transport,
            runtime,
            outcomes: Some(sender),
        };

        (dispatcher, receiver)
    }

    /// Start one delivery per endpoint and return immediately
    ///
    /// Returns the number of attempts started.
    pub fn send_all(&self, report: &PinningFailureReport, endpoints: &[Url]) -> usize {
        if endpoints.is_empty() {
            debug!("No report URIs configured for {}, nothing to send", report.noted_hostname());
            return 0;
        }

        let body = match report.to_json() {
            Ok(json) => Bytes::from(json),
            Err(e) => {
                error!("Failed to serialize pin failure report for {}: {}", report.hostname(), e);
                return 0;
            }
        };

        let fingerprint = report.fingerprint();

        for endpoint in endpoints {
            let transport = Arc::clone(&self.transport);
            let outcomes = self.outcomes.clone();
            let endpoint = endpoint.clone();
            let hostname = report.hostname().to_string();
            let body = body.clone();

            self.runtime.spawn(async move {
                debug!("Sending pin failure report for {} to {}", hostname, endpoint);

                let status = match transport.deliver(&endpoint, body).await {
                    Ok(()) => {
                        info!("Pin failure report for {} delivered to {}", hostname, endpoint);
                        counter!("pin_report_deliveries_total", "outcome" => "delivered").increment(1);
                        DeliveryStatus::Delivered
                    }
                    Err(e) => {
                        warn!("Failed to deliver pin failure report for {} to {}: {}", hostname, endpoint, e);
                        counter!("pin_report_deliveries_total", "outcome" => "failed").increment(1);
                        DeliveryStatus::Failed(e.to_string())
                    }
                };

                if let Some(outcomes) = outcomes {
                    let _ = outcomes.send(DeliveryOutcome {
                        endpoint,
                        hostname,
                        fingerprint,
                        status,
                    });
                }
            });
        }

        endpoints.len()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("publishes_outcomes", &self.outcomes.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ReporterError;
    use crate::pinning::{DomainPinningPolicy, PinningValidationResult};
    use crate::report::AppIdentity;
    use crate::reporting::transport::MockReportTransport;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::time::Duration;

    fn report() -> PinningFailureReport {
        let policy = DomainPinningPolicy::new("example.com", false, true, [], []);
        PinningFailureReport::new(
            &AppIdentity::new("app", "1.0", "vendor"),
            "example.com",
            443,
            &policy,
            vec![],
            vec![],
            Utc::now(),
            PinningValidationResult::PinFailed,
        )
    }

    fn endpoints(names: &[&str]) -> Vec<Url> {
        names
            .iter()
            .map(|n| Url::parse(&format!("https://{}.example.net/report", n)).unwrap())
            .collect()
    }

    async fn collect(receiver: &mut UnboundedReceiver<DeliveryOutcome>, n: usize) -> HashMap<String, DeliveryStatus> {
        let mut seen = HashMap::new();
        for _ in 0..n {
            let outcome = tokio::time::timeout(Duration::from_secs(5), receiver.recv())
                .await
                .expect("timed out waiting for delivery outcome")
                .expect("channel closed");
            seen.insert(outcome.endpoint.host_str().unwrap().to_string(), outcome.status);
        }
        seen
    }

    #[tokio::test]
    async fn test_one_attempt_per_endpoint_with_same_body() {
        let expected = Bytes::from(report().to_json().unwrap());
        let mut transport = MockReportTransport::new();
        transport
            .expect_deliver()
            .times(2)
            .withf(move |_, body| *body == expected)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let (dispatcher, mut outcomes) = Dispatcher::with_outcomes(Arc::new(transport), Handle::current());
        let report = report();

        assert_eq!(dispatcher.send_all(&report, &endpoints(&["a", "b"])), 2);

        let seen = collect(&mut outcomes, 2).await;
        assert_eq!(seen["a.example.net"], DeliveryStatus::Delivered);
        assert_eq!(seen["b.example.net"], DeliveryStatus::Delivered);
    }

    #[tokio::test]
    async fn test_failing_endpoint_isolated() {
        let mut transport = MockReportTransport::new();
        transport.expect_deliver().times(3).returning(|endpoint, _| {
            let failing = endpoint.host_str() == Some("bad.example.net");
            Box::pin(async move {
                if failing {
                    Err(ReporterError::Delivery("HTTP 500".to_string()))
                } else {
                    Ok(())
                }
            })
        });

        let (dispatcher, mut outcomes) = Dispatcher::with_outcomes(Arc::new(transport), Handle::current());
        dispatcher.send_all(&report(), &endpoints(&["good1", "bad", "good2"]));

        let seen = collect(&mut outcomes, 3).await;
        assert_eq!(seen["good1.example.net"], DeliveryStatus::Delivered);
        assert_eq!(seen["good2.example.net"], DeliveryStatus::Delivered);
        assert!(matches!(&seen["bad.example.net"], DeliveryStatus::Failed(msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_hanging_endpoint_does_not_delay_others() {
        let mut transport = MockReportTransport::new();
        transport.expect_deliver().returning(|endpoint, _| {
            if endpoint.host_str() == Some("slow.example.net") {
                Box::pin(futures::future::pending())
            } else {
                Box::pin(async { Ok(()) })
            }
        });

        let (dispatcher, mut outcomes) = Dispatcher::with_outcomes(Arc::new(transport), Handle::current());
        dispatcher.send_all(&report(), &endpoints(&["slow", "fast"]));

        let seen = collect(&mut outcomes, 1).await;
        assert_eq!(seen.get("fast.example.net"), Some(&DeliveryStatus::Delivered));
    }

    #[tokio::test]
    async fn test_no_endpoints() {
        let mut transport = MockReportTransport::new();
        transport.expect_deliver().never();

        let dispatcher = Dispatcher::new(Arc::new(transport), Handle::current());
        assert_eq!(dispatcher.send_all(&report(), &[]), 0);
    }
}
