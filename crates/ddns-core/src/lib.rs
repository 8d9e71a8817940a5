// # ddns-core
//
// Core library for the one-shot DDNS synchronization client.
//
// ## Architecture Overview
//
// A run determines the caller's public address per address family and
// pushes it to every configured DNS record whose cached address differs:
// - **AddressResolver**: Trait for discovering the current public address
// - **RecordUpdater**: Trait for applying an address to one DNS record
// - **CacheStore**: Trait for the last-applied-address cache (idempotency)
// - **WebhookTransport**: Trait for single-shot webhook delivery
// - **Notifier**: Concurrent, bounded-retry webhook broadcast
// - **Synchronizer**: Per-family orchestrator (resolve once, one task per record)
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decisions live here, HTTP lives in adapter crates
// 2. **Isolation**: A failure in one record or family never aborts a sibling
// 3. **Structured Concurrency**: Every spawned task is joined by its scope
// 4. **Idempotency**: The cache is written only after a successful update
// 5. **Library-First**: The binary is a thin wrapper around `run_all`

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod notify;
pub mod traits;

// Re-export core types for convenience
pub use cache::{CacheKey, FileCache, MemoryCache};
pub use config::{DdnsConfig, RecordConfig, RecordType, SyncSettings};
pub use engine::{
    CacheWrite, GroupOutcome, GroupReport, RecordOutcome, RecordReport, RunReport, SyncContext,
    Synchronizer, run_all,
};
pub use error::{Error, Result};
pub use notify::{Notifier, RetryPolicy, WebhookKind};
pub use traits::{AddressResolver, CacheStore, RecordUpdater, WebhookResponse, WebhookTransport};
