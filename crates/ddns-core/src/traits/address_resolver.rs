// # Address Resolver Trait
//
// Defines the interface for discovering the caller's current public address.
//
// ## Implementations
//
// - HTTP discovery endpoint: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::AddressResolver;
//
// let address = resolver.resolve("https://api.ipify.org").await?;
// ```

use async_trait::async_trait;

/// Trait for address discovery implementations
///
/// The returned address is opaque to the core: it is the trimmed response
/// body, passed verbatim to the provider and to the cache. No attempt is
/// made to parse it as an IP address.
///
/// # Trust Level: Semi-Trusted
///
/// ## Allowed Capabilities
/// - ✅ Issue exactly one request to the given endpoint
/// - ✅ Return the trimmed body or an error
///
/// ## Forbidden Capabilities
/// - ❌ Retry (a failure aborts the whole address family for this run)
/// - ❌ Cache results between calls
/// - ❌ Access the cache store or the provider
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Fetch the current public address from `endpoint`
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The whitespace-trimmed response body
    /// - `Err(Error)`: Transport failure or non-success status
    async fn resolve(&self, endpoint: &str) -> Result<String, crate::Error>;
}
