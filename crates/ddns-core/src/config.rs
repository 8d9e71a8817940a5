//! Configuration types for the DDNS synchronization client
//!
//! Records are read once at startup from a JSON document and never change
//! during a run. Runtime knobs (timeouts, retry policy, cache directory)
//! live in [`SyncSettings`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Discovery endpoint returning the caller's public IPv4 address as plain text
pub const DEFAULT_IPV4_DISCOVERY_URL: &str = "https://api.ipify.org";

/// Discovery endpoint returning the caller's public IPv6 address as plain text
pub const DEFAULT_IPV6_DISCOVERY_URL: &str = "https://api6.ipify.org";

/// Main DDNS configuration: one optional record list per address family
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Records updated with the public IPv4 address
    #[serde(default)]
    pub a: Vec<RecordConfig>,

    /// Records updated with the public IPv6 address
    #[serde(default)]
    pub aaaa: Vec<RecordConfig>,
}

impl DdnsConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Read, parse and validate the configuration file at `path`
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            crate::Error::config(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_json(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration document without validating it
    pub fn from_json(content: &str) -> Result<Self, crate::Error> {
        serde_json::from_str(content)
            .map_err(|e| crate::Error::config(format!("failed to parse config file: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.a.is_empty() && self.aaaa.is_empty() {
            return Err(crate::Error::config("no DNS records found in config file"));
        }

        for record in self.a.iter().chain(self.aaaa.iter()) {
            record.validate()?;
        }

        Ok(())
    }

    /// Records configured for the given family
    pub fn records(&self, record_type: RecordType) -> &[RecordConfig] {
        match record_type {
            RecordType::A => &self.a,
            RecordType::Aaaa => &self.aaaa,
        }
    }

    /// Total number of configured records across both families
    pub fn record_count(&self) -> usize {
        self.a.len() + self.aaaa.len()
    }
}

/// DNS record configuration
///
/// The `Debug` implementation redacts the API token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordConfig {
    /// Fully qualified record name (e.g., "home.example.com")
    pub name: String,

    /// Provider API token used for this record only
    pub api_token: String,

    /// Provider zone identifier
    pub zone_id: String,

    /// Provider record identifier
    pub record_id: String,

    /// Webhook URLs POSTed to after a successful update
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub webhooks: Vec<String>,
}

impl fmt::Debug for RecordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordConfig")
            .field("name", &self.name)
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("record_id", &self.record_id)
            .field("webhooks", &self.webhooks)
            .finish()
    }
}

impl RecordConfig {
    /// Create a new record configuration
    pub fn new(
        name: impl Into<String>,
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        record_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            api_token: api_token.into(),
            zone_id: zone_id.into(),
            record_id: record_id.into(),
            webhooks: Vec::new(),
        }
    }

    /// Set the webhook URLs
    pub fn with_webhooks<I, S>(mut self, webhooks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.webhooks = webhooks.into_iter().map(Into::into).collect();
        self
    }

    /// Validate that all required fields are present
    pub fn validate(&self) -> Result<(), crate::Error> {
        let missing = [
            ("name", &self.name),
            ("api_token", &self.api_token),
            ("zone_id", &self.zone_id),
            ("record_id", &self.record_id),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        match missing {
            Some((field, _)) => Err(crate::Error::config(format!(
                "record '{}' has an empty {}",
                self.name, field
            ))),
            None => Ok(()),
        }
    }
}

/// DNS record type, one per address family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    #[serde(rename = "A")]
    A,
    /// AAAA record (IPv6)
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Both families, in the order they are reported
    pub const ALL: [RecordType; 2] = [RecordType::A, RecordType::Aaaa];

    /// The record type as sent to the provider ("A" or "AAAA")
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }

    /// Default discovery endpoint for this family
    pub fn default_discovery_url(self) -> &'static str {
        match self {
            RecordType::A => DEFAULT_IPV4_DISCOVERY_URL,
            RecordType::Aaaa => DEFAULT_IPV6_DISCOVERY_URL,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime settings for one synchronization run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Directory holding one cache file per record; `None` disables caching
    pub cache_dir: Option<PathBuf>,

    /// Timeout shared by provider and resolver requests
    pub http_timeout: Duration,

    /// Timeout for each webhook request
    pub webhook_timeout: Duration,

    /// Total delivery attempts per webhook endpoint (first try included)
    pub webhook_max_attempts: u32,

    /// Base unit of the linear delay between webhook attempts
    pub webhook_retry_base_delay: Duration,

    /// Discovery endpoint for A records
    pub ipv4_discovery_url: String,

    /// Discovery endpoint for AAAA records
    pub ipv6_discovery_url: String,
}

impl SyncSettings {
    /// Set the cache directory; an empty path disables caching
    pub fn with_cache_dir(mut self, cache_dir: Option<impl Into<PathBuf>>) -> Self {
        self.cache_dir = cache_dir
            .map(Into::into)
            .filter(|p: &PathBuf| !p.as_os_str().is_empty());
        self
    }

    /// Discovery endpoint configured for the given family
    pub fn discovery_url(&self, record_type: RecordType) -> &str {
        match record_type {
            RecordType::A => &self.ipv4_discovery_url,
            RecordType::Aaaa => &self.ipv6_discovery_url,
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            cache_dir: None,
            http_timeout: default_http_timeout(),
            webhook_timeout: default_webhook_timeout(),
            webhook_max_attempts: default_webhook_max_attempts(),
            webhook_retry_base_delay: default_webhook_retry_base_delay(),
            ipv4_discovery_url: default_ipv4_discovery_url(),
            ipv6_discovery_url: default_ipv6_discovery_url(),
        }
    }
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_webhook_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_webhook_max_attempts() -> u32 {
    3
}

fn default_webhook_retry_base_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_ipv4_discovery_url() -> String {
    DEFAULT_IPV4_DISCOVERY_URL.to_string()
}

fn default_ipv6_discovery_url() -> String {
    DEFAULT_IPV6_DISCOVERY_URL.to_string()
}
