// # HTTP Webhook Transport
//
// Sends one JSON POST per call and reports whatever the endpoint answered.
//
// The transport is deliberately dumb: the attempt budget, delays and
// payload shape all belong to `ddns_core::Notifier`. Each request is
// bounded by the client timeout (5 seconds by default).

use ddns_core::traits::{WebhookResponse, WebhookTransport};
use ddns_core::{Error, Result};
use std::time::Duration;

/// Default per-request timeout for webhook deliveries
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// reqwest-backed webhook transport
#[derive(Debug, Clone)]
pub struct HttpWebhookTransport {
    client: reqwest::Client,
}

impl HttpWebhookTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("failed to build webhook client: {}", e)))?;
        Ok(Self { client })
    }

    /// Create a transport over an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl WebhookTransport for HttpWebhookTransport {
    async fn post_json(&self, url: &str, body: &[u8]) -> Result<WebhookResponse> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() { "timed out" } else { "failed" };
                Error::webhook(format!("request {}: {}", kind, e))
            })?;

        let status = response.status().as_u16();
        // The body is diagnostic only; an unreadable one is not an error
        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read webhook response body");
                String::new()
            }
        };

        Ok(WebhookResponse::new(status, body))
    }
}
