// # File Cache
//
// File-based implementation of CacheStore.
//
// ## Layout
//
// One flat text file per record under the base directory, named by
// `CacheKey::file_name()` and containing exactly the last applied address:
//
// ```text
// /var/cache/ddns/
//   cached_ip_A_home_example_com_372e6795.txt      -> 203.0.113.9
//   cached_ip_AAAA_home_example_com_9bd1c0aa.txt   -> 2001:db8::9
// ```
//
// ## Writes
//
// - Atomic: content goes to `<file>.tmp`, then renamed over the target
// - The base directory is created on first write
// - Entries are never deleted
//
// ## Disabled Mode
//
// Without a base directory every read misses and every write is an error,
// so callers must check `is_enabled()` before writing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::cache::CacheKey;
use crate::traits::CacheStore;

/// File-based cache store
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::cache::{CacheKey, FileCache};
/// use ddns_core::config::RecordType;
/// use ddns_core::traits::CacheStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let cache = FileCache::new(Some("/var/cache/ddns"));
///     let key = CacheKey::new(RecordType::A, "home.example.com", "372e6795");
///
///     cache.write(&key, "203.0.113.9").await?;
///     assert_eq!(cache.read(&key).await?, Some("203.0.113.9".to_string()));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileCache {
    base: Option<PathBuf>,
}

impl FileCache {
    /// Create a file cache rooted at `base`; `None` or an empty path disables it
    pub fn new<P: Into<PathBuf>>(base: Option<P>) -> Self {
        let base = base
            .map(Into::into)
            .filter(|p: &PathBuf| !p.as_os_str().is_empty());
        Self { base }
    }

    /// Create a disabled cache
    pub fn disabled() -> Self {
        Self { base: None }
    }

    /// The base directory, if caching is enabled
    pub fn base_path(&self) -> Option<&Path> {
        self.base.as_deref()
    }

    /// Full path of the file backing `key`
    pub fn path_for(&self, key: &CacheKey) -> Option<PathBuf> {
        self.base.as_ref().map(|base| base.join(key.file_name()))
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut temp = path.as_os_str().to_owned();
        temp.push(".tmp");
        PathBuf::from(temp)
    }

    /// Write `address` to `temp_path`, then rename it over `path`
    async fn replace_atomically(temp_path: &Path, path: &Path, address: &str) -> Result<(), Error> {
        let mut file = fs::File::create(temp_path).await.map_err(|e| {
            Error::cache(format!(
                "failed to create temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        file.write_all(address.as_bytes()).await.map_err(|e| {
            Error::cache(format!(
                "failed to write cache file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        file.flush().await.map_err(|e| {
            Error::cache(format!(
                "failed to flush cache file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        drop(file);

        fs::rename(temp_path, path).await.map_err(|e| {
            Error::cache(format!(
                "failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl CacheStore for FileCache {
    fn is_enabled(&self) -> bool {
        self.base.is_some()
    }

    async fn read(&self, key: &CacheKey) -> Result<Option<String>, Error> {
        // Reading from a disabled cache is not an error, there is just nothing to read.
        let Some(path) = self.path_for(key) else {
            return Ok(None);
        };

        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).trim().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Cache file does not exist yet");
                Ok(None)
            }
            Err(e) => Err(Error::cache(format!(
                "failed to read cache file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn write(&self, key: &CacheKey, address: &str) -> Result<(), Error> {
        let (Some(base), Some(path)) = (self.base.as_ref(), self.path_for(key)) else {
            return Err(Error::cache(
                "cannot write cache file, no base path provided",
            ));
        };

        fs::create_dir_all(base).await.map_err(|e| {
            Error::cache(format!(
                "failed to create cache directory {}: {}",
                base.display(),
                e
            ))
        })?;

        let temp_path = Self::temp_path(&path);
        if let Err(e) = Self::replace_atomically(&temp_path, &path, address).await {
            // Best effort cleanup
            if let Err(cleanup) = fs::remove_file(&temp_path).await
                && cleanup.kind() != std::io::ErrorKind::NotFound
            {
                tracing::debug!(path = %temp_path.display(), error = %cleanup, "Failed to remove temp file");
            }
            return Err(e);
        }

        tracing::trace!(path = %path.display(), "Cache file written");
        Ok(())
    }
}
