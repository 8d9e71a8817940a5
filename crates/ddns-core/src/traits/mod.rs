//! Core traits for the DDNS synchronization client
//!
//! This module defines the seams between the orchestrator and its external
//! collaborators.
//!
//! - [`AddressResolver`]: Discover the current public address
//! - [`RecordUpdater`]: Apply an address to one DNS record
//! - [`CacheStore`]: Last-applied-address cache for idempotency
//! - [`WebhookTransport`]: Single-shot webhook delivery

pub mod address_resolver;
pub mod cache_store;
pub mod record_updater;
pub mod webhook_transport;

pub use address_resolver::AddressResolver;
pub use cache_store::CacheStore;
pub use record_updater::RecordUpdater;
pub use webhook_transport::{WebhookResponse, WebhookTransport};
