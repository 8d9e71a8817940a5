//! Webhook notifications
//!
//! After a successful record update the [`Notifier`] POSTs one payload to
//! every configured endpoint of that record:
//!
//! - Discord webhooks (`https://discord.com/api/webhooks/...`) receive
//!   `{"content": "<address>"}`
//! - every other URL receives
//!   `{"record_name": ..., "record_type": ..., "ip_address": ...}`
//!
//! Endpoints are notified concurrently and independently. Each one gets at
//! most [`RetryPolicy::max_attempts`] attempts with a linear delay between
//! them. Failures are logged and reported, never propagated: a webhook can
//! not fail a record's sync.

use crate::config::{RecordType, SyncSettings};
use crate::traits::WebhookTransport;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{Instrument, error, info, info_span};

/// URL prefix identifying Discord webhooks
pub const DISCORD_WEBHOOK_PREFIX: &str = "https://discord.com/api/webhooks/";

/// How an endpoint expects to be notified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookKind {
    /// Discord chat webhook: bare address as message content
    Discord,
    /// Any other endpoint: structured record payload
    Generic,
}

impl WebhookKind {
    /// Classify an endpoint by its URL
    pub fn classify(url: &str) -> Self {
        if url.starts_with(DISCORD_WEBHOOK_PREFIX) {
            WebhookKind::Discord
        } else {
            WebhookKind::Generic
        }
    }
}

/// Payload sent to Discord webhooks
#[derive(Debug, Serialize)]
pub struct DiscordPayload<'a> {
    pub content: &'a str,
}

/// Payload sent to generic webhooks
#[derive(Debug, Serialize)]
pub struct RecordChangePayload<'a> {
    pub record_name: &'a str,
    pub record_type: &'a str,
    pub ip_address: &'a str,
}

/// Serialize the payload matching `kind`
pub fn build_payload(
    kind: WebhookKind,
    record_name: &str,
    record_type: RecordType,
    address: &str,
) -> Result<Vec<u8>, crate::Error> {
    let body = match kind {
        WebhookKind::Discord => serde_json::to_vec(&DiscordPayload { content: address })?,
        WebhookKind::Generic => serde_json::to_vec(&RecordChangePayload {
            record_name,
            record_type: record_type.as_str(),
            ip_address: address,
        })?,
    };
    Ok(body)
}

/// Bounded linear retry policy for webhook delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per endpoint, first try included
    pub max_attempts: u32,
    /// Delay after attempt `n` is `n * base_delay`
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay to wait after the failed attempt number `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl From<&SyncSettings> for RetryPolicy {
    fn from(settings: &SyncSettings) -> Self {
        Self::new(
            settings.webhook_max_attempts,
            settings.webhook_retry_base_delay,
        )
    }
}

/// Result of notifying one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub url: String,
    pub kind: WebhookKind,
    /// Attempts actually made
    pub attempts: u32,
    /// Whether one of the attempts got a 2xx response
    pub delivered: bool,
}

/// Result of notifying every endpoint of one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// One entry per endpoint, in configuration order
    pub deliveries: Vec<DeliveryReport>,
}

impl BroadcastReport {
    /// Number of endpoints that acknowledged the notification
    pub fn delivered_count(&self) -> usize {
        self.deliveries.iter().filter(|d| d.delivered).count()
    }

    /// Whether no endpoint was notified
    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }
}

/// Best-effort webhook broadcaster
#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn WebhookTransport>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Notifier {
    /// Create a notifier over `transport`
    pub fn new(transport: Arc<dyn WebhookTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// The retry policy in use
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Notify every endpoint concurrently and wait for all of them
    ///
    /// Returns once each endpoint has either succeeded or exhausted its
    /// attempts. Never fails.
    pub async fn broadcast(
        &self,
        record_name: &str,
        record_type: RecordType,
        address: &str,
        endpoints: &[String],
    ) -> BroadcastReport {
        if endpoints.is_empty() {
            return BroadcastReport::default();
        }

        info!(webhook_count = endpoints.len(), "Starting webhook notifications");

        let mut tasks = JoinSet::new();
        for (index, url) in endpoints.iter().enumerate() {
            let kind = WebhookKind::classify(url);
            let span = info_span!("webhook", url = %url);

            let payload = match build_payload(kind, record_name, record_type, address) {
                Ok(payload) => payload,
                Err(e) => {
                    error!(parent: &span, error = %e, "Failed to serialize webhook payload");
                    continue;
                }
            };

            let transport = Arc::clone(&self.transport);
            let policy = self.policy;
            let url = url.clone();
            tasks.spawn(
                async move { (index, deliver(transport, policy, url, kind, payload).await) }
                    .instrument(span),
            );
        }

        let mut deliveries = Vec::with_capacity(endpoints.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(delivery) => deliveries.push(delivery),
                Err(e) => error!(error = %e, "Webhook task aborted"),
            }
        }
        deliveries.sort_by_key(|(index, _)| *index);

        let report = BroadcastReport {
            deliveries: deliveries.into_iter().map(|(_, d)| d).collect(),
        };

        info!(
            webhook_count = endpoints.len(),
            delivered = report.delivered_count(),
            "Completed all webhook notifications"
        );

        report
    }
}

/// Deliver one payload to one endpoint under `policy`
async fn deliver(
    transport: Arc<dyn WebhookTransport>,
    policy: RetryPolicy,
    url: String,
    kind: WebhookKind,
    payload: Vec<u8>,
) -> DeliveryReport {
    let max_attempts = policy.max_attempts;
    info!(kind = ?kind, "Preparing webhook");

    let mut attempts = 0;
    let mut delivered = false;

    for attempt in 1..=max_attempts {
        attempts = attempt;
        info!(attempt, max_attempts, "Sending webhook");

        let started = Instant::now();
        let result = transport.post_json(&url, &payload).await;
        let response_time_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(response) if response.is_success() => {
                info!(
                    attempt,
                    max_attempts,
                    status_code = response.status,
                    response_time_ms,
                    "Webhook sent successfully"
                );
                delivered = true;
                break;
            }
            Ok(response) => {
                error!(
                    attempt,
                    max_attempts,
                    status_code = response.status,
                    response_body = %response.body,
                    response_time_ms,
                    "Webhook returned non-OK status"
                );
            }
            Err(e) => {
                error!(
                    attempt,
                    max_attempts,
                    response_time_ms,
                    error = %e,
                    "Webhook request failed"
                );
            }
        }

        if attempt < max_attempts {
            tokio::time::sleep(policy.delay_after(attempt)).await;
        }
    }

    if delivered {
        info!("Webhook notification completed");
    } else {
        error!(attempts, "Webhook notification failed after all attempts");
    }

    DeliveryReport {
        url,
        kind,
        attempts,
        delivered,
    }
}
