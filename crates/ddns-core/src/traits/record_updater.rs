// # Record Updater Trait
//
// Defines the interface for replacing the content of a single DNS record
// through a provider API.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{RecordUpdater, RecordType};
//
// updater.apply(&record, RecordType::A, "203.0.113.9").await?;
// ```

use crate::config::{RecordConfig, RecordType};
use async_trait::async_trait;

/// Trait for DNS provider implementations
///
/// Implementations authenticate each call with the record's own token,
/// so one updater instance can serve records belonging to different
/// accounts.
///
/// # Thread Safety
///
/// Implementations must be thread-safe: one instance is shared by every
/// record task of every address family.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform one HTTP/HTTPS API call per `apply`
/// - ✅ Parse provider-specific error responses
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (a failed attempt is final for this run)
/// - ❌ Decide whether an update is needed (owned by `Synchronizer`)
/// - ❌ Touch the cache store or any other record
///
/// A provider that retries internally would break the guarantee that the
/// cache is written only after the single update call of this run succeeded.
#[async_trait]
pub trait RecordUpdater: Send + Sync {
    /// Replace the record's content with `address`
    ///
    /// # Parameters
    ///
    /// - `record`: The record to update (name, zone, id, token)
    /// - `record_type`: "A" or "AAAA"
    /// - `address`: The new content, passed through verbatim
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider accepted the update
    /// - `Err(Error)`: Transport failure or provider-reported error
    async fn apply(
        &self,
        record: &RecordConfig,
        record_type: RecordType,
        address: &str,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
