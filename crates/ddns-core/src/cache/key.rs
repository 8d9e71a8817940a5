//! Cache key derivation
//!
//! A record's cache identity is (record type, record name, record id). The
//! key maps to a flat, filesystem-portable file name such as
//! `cached_ip_A_home_example_com_372e6795.txt`.

use crate::config::{RecordConfig, RecordType};
use std::fmt;

const FILE_PREFIX: &str = "cached_ip_";
const FILE_SUFFIX: &str = ".txt";

/// Replace every maximal run of characters outside `[A-Za-z0-9-]` with a
/// single underscore.
///
/// The output only contains `[A-Za-z0-9_-]`, never two consecutive
/// underscores, and `sanitize(sanitize(s)) == sanitize(s)`. Distinct names
/// can map to the same output; that only costs an extra cache miss.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_underscore = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            out.push(c);
            last_was_underscore = false;
        } else if !last_was_underscore {
            out.push('_');
            last_was_underscore = true;
        }
    }

    out
}

/// Cache key for one record of one address family
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    record_type: RecordType,
    name: String,
    record_id: String,
}

impl CacheKey {
    /// Derive the key from its three components
    pub fn new(record_type: RecordType, name: &str, record_id: &str) -> Self {
        Self {
            record_type,
            name: sanitize(name),
            record_id: sanitize(record_id),
        }
    }

    /// Derive the key for a configured record
    pub fn for_record(record_type: RecordType, record: &RecordConfig) -> Self {
        Self::new(record_type, &record.name, &record.record_id)
    }

    /// The record type component
    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// File name used by [`FileCache`](crate::cache::FileCache)
    pub fn file_name(&self) -> String {
        format!("{}{}{}", FILE_PREFIX, self, FILE_SUFFIX)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.record_type, self.name, self.record_id)
    }
}
