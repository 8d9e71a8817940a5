// # Cloudflare Record Updater
//
// This crate applies an address to a single Cloudflare DNS record.
//
// ## Scope
//
// - One PUT per call to `/zones/:zone_id/dns_records/:record_id`
// - Record type, name and content are always sent; TTL is fixed at 1 ("automatic")
// - Credentials come from the record itself, so records may span zones and tokens
// - NO retry logic (a failed record is retried on the next run)
// - NO lookups: zone and record ids are configured, never discovered
//
// ## Trust Level: Untrusted (DNS Provider)
//
// The updater performs HTTP calls to its API endpoint only. It never
// spawns tasks and never touches the cache.
//
// ## Security Requirements
//
// - API tokens NEVER appear in logs or error messages
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::{RecordConfig, RecordType};
use ddns_core::traits::RecordUpdater;
use ddns_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// TTL value Cloudflare interprets as "automatic"
const AUTOMATIC_TTL: u32 = 1;

const PROVIDER_NAME: &str = "cloudflare";

/// Body of the record update request
#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
}

/// Error envelope returned by the API on failure
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    message: String,
}

/// Cloudflare DNS record updater
///
/// # Trust Level: Untrusted
///
/// Stateless and single-shot. The HTTP client is shared with the address
/// resolver so both honor the same timeout.
#[derive(Debug, Clone)]
pub struct CloudflareUpdater {
    client: reqwest::Client,
    base_url: String,
}

impl CloudflareUpdater {
    /// Create an updater with its own client and the given timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client))
    }

    /// Create an updater over an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: CLOUDFLARE_API_BASE.to_string(),
        }
    }

    /// Point the updater at a different API root (trailing slashes ignored)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Endpoint for one record
    fn record_url(&self, record: &RecordConfig) -> String {
        format!(
            "{}/zones/{}/dns_records/{}",
            self.base_url, record.zone_id, record.record_id
        )
    }
}

/// Serialize the update body for `record`
fn update_body(record: &RecordConfig, record_type: RecordType, address: &str) -> Result<Vec<u8>> {
    let request = UpdateRequest {
        record_type: record_type.as_str(),
        name: &record.name,
        content: address,
        ttl: AUTOMATIC_TTL,
    };
    Ok(serde_json::to_vec(&request)?)
}

/// Turn a failed response into the error message reported for the record
///
/// Uses the first API error when the body carries one, otherwise the raw
/// status and body.
fn describe_failure(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<ApiResponse>(body).ok();
    match parsed.as_ref().and_then(|response| response.errors.first()) {
        Some(first) => format!("API error: {} (code: {})", first.message, first.code),
        None => format!("API error: {} {}", status, body),
    }
}

#[async_trait]
impl RecordUpdater for CloudflareUpdater {
    async fn apply(&self, record: &RecordConfig, record_type: RecordType, address: &str) -> Result<()> {
        let url = self.record_url(record);
        let body = update_body(record, record_type, address)?;

        tracing::debug!(zone_id = %record.zone_id, record_type = %record_type, "Sending record update");

        let response = self
            .client
            .put(&url)
            .bearer_auth(&record.api_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("request failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("failed to read response body: {}", e))
        })?;

        if status.is_client_error() || status.is_server_error() {
            return Err(Error::provider(
                PROVIDER_NAME,
                describe_failure(status.as_u16(), &text),
            ));
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
