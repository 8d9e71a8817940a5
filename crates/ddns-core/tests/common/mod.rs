//! Test doubles and common utilities for synchronization contract tests
//!
//! The doubles count and record every call so tests can assert on what
//! was (and was not) sent to each collaborator.

#![allow(dead_code)]

use ddns_core::cache::CacheKey;
use ddns_core::config::{
    DEFAULT_IPV4_DISCOVERY_URL, DEFAULT_IPV6_DISCOVERY_URL, RecordConfig, RecordType,
};
use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    AddressResolver, CacheStore, RecordUpdater, WebhookResponse, WebhookTransport,
};
use ddns_core::{Notifier, RetryPolicy, SyncContext};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A resolver answering from a fixed table of endpoint -> address
pub struct MockResolver {
    answers: HashMap<String, std::result::Result<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self {
            answers: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer A-family discovery with `address`
    pub fn with_ipv4(self, address: &str) -> Self {
        self.with_answer(DEFAULT_IPV4_DISCOVERY_URL, Ok(address.to_string()))
    }

    /// Answer AAAA-family discovery with `address`
    pub fn with_ipv6(self, address: &str) -> Self {
        self.with_answer(DEFAULT_IPV6_DISCOVERY_URL, Ok(address.to_string()))
    }

    /// Fail discovery for `record_type`
    pub fn failing(self, record_type: RecordType) -> Self {
        self.with_answer(
            record_type.default_discovery_url(),
            Err("operation timed out".to_string()),
        )
    }

    fn with_answer(mut self, endpoint: &str, answer: std::result::Result<String, String>) -> Self {
        self.answers.insert(endpoint.to_string(), answer);
        self
    }

    /// Endpoints requested so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AddressResolver for MockResolver {
    async fn resolve(&self, endpoint: &str) -> Result<String> {
        self.calls.lock().unwrap().push(endpoint.to_string());
        match self.answers.get(endpoint) {
            Some(Ok(address)) => Ok(address.clone()),
            Some(Err(message)) => Err(Error::resolver(message.clone())),
            None => Err(Error::resolver(format!("no answer for {}", endpoint))),
        }
    }
}

/// One recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub record_name: String,
    pub record_id: String,
    pub record_type: RecordType,
    pub address: String,
}

/// A provider that records calls and fails for selected record ids
pub struct MockRecordUpdater {
    calls: Mutex<Vec<UpdateCall>>,
    failing_ids: HashSet<String>,
    /// Optional rendezvous every call must pass before returning
    barrier: Option<Arc<tokio::sync::Barrier>>,
}

impl MockRecordUpdater {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing_ids: HashSet::new(),
            barrier: None,
        }
    }

    /// Reject every update for `record_id`
    pub fn failing_for(mut self, record_id: &str) -> Self {
        self.failing_ids.insert(record_id.to_string());
        self
    }

    /// Block each call until `parties` calls are in flight at once
    pub fn with_rendezvous(mut self, parties: usize) -> Self {
        self.barrier = Some(Arc::new(tokio::sync::Barrier::new(parties)));
        self
    }

    pub fn calls(&self) -> Vec<UpdateCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl RecordUpdater for MockRecordUpdater {
    async fn apply(&self, record: &RecordConfig, record_type: RecordType, address: &str) -> Result<()> {
        self.calls.lock().unwrap().push(UpdateCall {
            record_name: record.name.clone(),
            record_id: record.record_id.clone(),
            record_type,
            address: address.to_string(),
        });

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        if self.failing_ids.contains(&record.record_id) {
            return Err(Error::provider(
                "mock",
                "API error: Authentication error (code: 10000)",
            ));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// One recorded webhook POST
#[derive(Debug, Clone)]
pub struct WebhookCall {
    pub url: String,
    pub body: serde_json::Value,
}

/// A webhook transport that records calls and fails for selected URLs
pub struct MockWebhookTransport {
    calls: Mutex<Vec<WebhookCall>>,
    failing_urls: HashSet<String>,
    barrier: Option<Arc<tokio::sync::Barrier>>,
}

impl MockWebhookTransport {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing_urls: HashSet::new(),
            barrier: None,
        }
    }

    /// Answer 500 for every POST to `url`
    pub fn failing_for(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    /// Block each call until `parties` calls are in flight at once
    pub fn with_rendezvous(mut self, parties: usize) -> Self {
        self.barrier = Some(Arc::new(tokio::sync::Barrier::new(parties)));
        self
    }

    pub fn calls(&self) -> Vec<WebhookCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> Vec<WebhookCall> {
        self.calls().into_iter().filter(|c| c.url == url).collect()
    }
}

#[async_trait::async_trait]
impl WebhookTransport for MockWebhookTransport {
    async fn post_json(&self, url: &str, body: &[u8]) -> Result<WebhookResponse> {
        let body = serde_json::from_slice(body)?;
        self.calls.lock().unwrap().push(WebhookCall {
            url: url.to_string(),
            body,
        });

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        if self.failing_urls.contains(url) {
            Ok(WebhookResponse::new(500, "internal error"))
        } else {
            Ok(WebhookResponse::new(204, ""))
        }
    }
}

/// A cache whose reads and writes always fail
pub struct BrokenCache {
    pub write_calls: AtomicUsize,
}

impl BrokenCache {
    pub fn new() -> Self {
        Self {
            write_calls: AtomicUsize::new(0),
        }
    }

    pub fn write_call_count(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CacheStore for BrokenCache {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn read(&self, _key: &CacheKey) -> Result<Option<String>> {
        Err(Error::cache("permission denied"))
    }

    async fn write(&self, _key: &CacheKey, _address: &str) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::cache("no space left on device"))
    }
}

/// Retry policy with millisecond delays so tests stay fast
pub fn fast_retry_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(1))
}

/// Build a context from shared doubles
pub fn context(
    resolver: &Arc<MockResolver>,
    updater: &Arc<MockRecordUpdater>,
    cache: Arc<dyn CacheStore>,
    transport: &Arc<MockWebhookTransport>,
) -> SyncContext {
    SyncContext::new(
        resolver.clone(),
        updater.clone(),
        cache,
        Notifier::new(transport.clone(), fast_retry_policy()),
    )
}

/// Helper to create a record with placeholder credentials
pub fn record(name: &str, record_id: &str) -> RecordConfig {
    RecordConfig::new(name, "test-token", "zone-1", record_id)
}
