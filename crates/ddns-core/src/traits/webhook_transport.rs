// # Webhook Transport Trait
//
// Defines the single-shot delivery primitive used by the `Notifier`.
//
// ## Implementations
//
// - reqwest-based: `ddns-notify-webhook` crate

use async_trait::async_trait;

/// Response returned by a webhook endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body (for diagnostics only)
    pub body: String,
}

impl WebhookResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for webhook transports
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ POST `body` to `url` with `Content-Type: application/json`
/// - ✅ Enforce its own request timeout
///
/// ## Forbidden Capabilities
/// - ❌ Retry (the attempt budget and delays are owned by `Notifier`)
/// - ❌ Inspect or rewrite the payload
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Send one POST request
    ///
    /// # Returns
    ///
    /// - `Ok(WebhookResponse)`: Any HTTP response, successful or not
    /// - `Err(Error)`: Transport failure or timeout
    async fn post_json(&self, url: &str, body: &[u8]) -> Result<WebhookResponse, crate::Error>;
}
