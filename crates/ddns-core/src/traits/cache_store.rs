// # Cache Store Trait
//
// Defines the interface for the last-applied-address cache.
//
// ## Purpose
//
// The cache makes runs idempotent: when the cached address for a record
// equals the freshly resolved one, no provider call and no notification
// is issued.
//
// ## Implementations
//
// - `FileCache`: one flat text file per record under a base directory
// - `MemoryCache`: in-process map, for embedding and tests

use crate::cache::CacheKey;
use async_trait::async_trait;

/// Trait for cache store implementations
///
/// # Thread Safety
///
/// All methods may be called concurrently from sibling record tasks.
/// Within one run every task owns a distinct key, so implementations do
/// not need per-key locking.
///
/// # Trust Level: Trusted (Core Component)
///
/// ## Allowed Capabilities
/// - ✅ Perform async filesystem I/O
///
/// ## Forbidden Capabilities
/// - ❌ Decide when to update (owned by `Synchronizer`)
/// - ❌ Delete entries (entries are only ever overwritten)
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Whether caching is enabled
    ///
    /// Callers must not call [`CacheStore::write`] on a disabled store.
    fn is_enabled(&self) -> bool;

    /// Read the last applied address for `key`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(address))`: The trimmed cached address
    /// - `Ok(None)`: Caching disabled, or never cached
    /// - `Err(Error)`: Any other read failure
    async fn read(&self, key: &CacheKey) -> Result<Option<String>, crate::Error>;

    /// Persist `address` as the last applied address for `key`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Successfully written
    /// - `Err(Error)`: Caching disabled, or a storage failure
    async fn write(&self, key: &CacheKey, address: &str) -> Result<(), crate::Error>;
}
