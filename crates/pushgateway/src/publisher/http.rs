//! HTTP publisher for a Prometheus Pushgateway.
//!
//! Pushes use `PUT`, which replaces every metric under the grouping key in
//! one request. The gateway either stores the whole batch or none of it.

use crate::encode::{content_type, encode_text, grouping_path};
use crate::error::Result;
use crate::publisher::Publisher;
use crate::retry::{LogCallback, RetryConfig, with_retry};
use crate::types::Batch;
use std::time::Duration;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Pushgateway client.
///
/// # Example
///
/// ```no_run
/// use pushgateway::publisher::Publisher;
/// use pushgateway::publisher::http::PushClient;
/// use pushgateway::{Batch, Grouping, Sample};
///
/// let client = PushClient::new("http://pushgateway:9091");
/// let mut batch = Batch::new("terraform")
///     .with_grouping(Grouping::new().label("instance", "1234"));
/// batch.push(Sample::gauge("terraform_result", "1=success, 0=failure", 1.0));
/// client.publish(&batch).unwrap();
/// ```
pub struct PushClient {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// Gateway base URL, without trailing slash.
    base_url: String,
    retry: RetryConfig,
}

impl PushClient {
    /// Create a client for a gateway base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    #[must_use]
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryConfig::no_retry(),
        }
    }

    /// Retry transient failures with the given policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Full URL for a batch's grouping key.
    pub fn push_url(&self, batch: &Batch) -> String {
        format!("{}{}", self.base_url, grouping_path(batch))
    }

    fn put(&self, url: &str, content_type: &str, body: &str) -> Result<()> {
        let response = self
            .agent
            .put(url)
            .header("Content-Type", content_type)
            .send(body)?;
        log::debug!("pushgateway responded {}", response.status());
        Ok(())
    }
}

impl Publisher for PushClient {
    fn publish(&self, batch: &Batch) -> Result<()> {
        batch.validate()?;

        let url = self.push_url(batch);
        let body = encode_text(&batch.samples)?;
        let content_type = content_type();
        log::info!("pushing {} gauges to {}", batch.samples.len(), url);
        log::trace!("push body:\n{body}");

        with_retry(&self.retry, Some(&LogCallback), || {
            self.put(&url, &content_type, &body)
        })
    }
}
