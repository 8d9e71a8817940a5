// # Cache Store Implementations
//
// Key derivation plus the CacheStore implementations for different
// persistence strategies.

pub mod file;
pub mod key;
pub mod memory;

pub use file::FileCache;
pub use key::{CacheKey, sanitize};
pub use memory::MemoryCache;
