//! Short-lived result cache
//!
//! Memoizes slowly-changing lookups (attribute ids, relation type ids,
//! default option ids) for the duration of a workflow run so repeated
//! lookups skip the remote round trip.

pub mod key;
pub mod store;

use std::time::Duration;

/// Cache timing configuration
pub struct CacheTtl;

impl CacheTtl {
    /// Lifetime of an entry unless a caller picks another TTL
    pub const DEFAULT: Duration = Duration::from_secs(5 * 60); // 5 min

    /// How often the background sweeper reclaims expired entries
    pub const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60); // 10 min
}

// Re-export main types
pub use key::cache_key;
pub use store::ResultCache;
