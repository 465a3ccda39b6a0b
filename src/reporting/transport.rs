//! Report transports
//!
//! A transport delivers one serialized report to one endpoint. It owns the
//! per-attempt timeout and any retry behaviour; the dispatcher makes exactly
//! one call per endpoint.

use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::common::{ReporterError, Result};
use crate::config::ReporterConfig;

/// Capability to deliver bytes to a URI
#[cfg_attr(test, mockall::automock)]
pub trait ReportTransport: Send + Sync {
    /// Deliver `body` to `endpoint`
    ///
    /// The returned future must not borrow from `self` so that it can run on
    /// a detached task.
    fn deliver(&self, endpoint: &Url, body: Bytes) -> BoxFuture<'static, Result<()>>;
}

/// JSON over HTTP POST
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a per-request timeout
    ///
    /// Redirects are not followed; any non-2xx answer is a failed delivery.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            // A redirected POST would be replayed as a bodyless GET
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()?;

        Ok(Self { client })
    }

    /// Create a transport using the configured delivery timeout
    pub fn from_config(config: &ReporterConfig) -> Result<Self> {
        Self::new(config.delivery_timeout())
    }
}

impl ReportTransport for HttpTransport {
    fn deliver(&self, endpoint: &Url, body: Bytes) -> BoxFuture<'static, Result<()>> {
        let request = self
            .client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let endpoint = endpoint.clone();

        Box::pin(async move {
            let response = request.send().await?;
            let status = response.status();

            if status.is_success() {
                Ok(())
            } else {
                Err(ReporterError::Delivery(format!("{} returned HTTP {}", endpoint, status)))
            }
        })
    }
}
