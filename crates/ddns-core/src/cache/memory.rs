// # Memory Cache
//
// In-memory implementation of CacheStore.
//
// Nothing survives the process, so with a one-shot runner every run sees
// an empty cache. Useful when embedding the synchronizer in a long-lived
// process, and in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::cache::CacheKey;
use crate::traits::CacheStore;

/// In-memory cache store
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    inner: Arc<RwLock<HashMap<CacheKey, String>>>,
}

impl MemoryCache {
    /// Create a new empty memory cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of entries in the cache
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn read(&self, key: &CacheKey) -> Result<Option<String>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(key).cloned())
    }

    async fn write(&self, key: &CacheKey, address: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(key.clone(), address.trim().to_string());
        Ok(())
    }
}
