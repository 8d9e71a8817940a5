// # HTTP Address Resolver
//
// This crate discovers the caller's public address by asking a plain-text
// echo service (api.ipify.org for IPv4, api6.ipify.org for IPv6).
//
// ## Behavior
//
// - One GET per call, no retry (a failed family is simply skipped)
// - Non-2xx responses are errors
// - The body is trimmed and returned as-is; it is not parsed as an address
//
// The client is shared with the provider so both use the same timeout.

use ddns_core::traits::AddressResolver;
use ddns_core::{Error, Result};
use std::time::Duration;
use tracing::debug;

/// Default request timeout for discovery requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves the public address from a plain-text HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpAddressResolver {
    client: reqwest::Client,
}

impl HttpAddressResolver {
    /// Create a resolver with its own client and the given timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Create a resolver over an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl AddressResolver for HttpAddressResolver {
    async fn resolve(&self, endpoint: &str) -> Result<String> {
        debug!(endpoint, "Requesting public IP address");

        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(|e| Error::resolver(format!("request to {} failed: {}", endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::resolver(format!(
                "{} returned HTTP {}",
                endpoint, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::resolver(format!("failed to read response body: {}", e)))?;

        Ok(body.trim().to_string())
    }
}
