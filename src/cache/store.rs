//! In-memory TTL store
//!
//! Entries expire on read even if the sweeper has not run yet; the sweeper
//! only reclaims memory.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::cache::CacheTtl;
use crate::error::Result;

/// Stand-in deadline for durations too long to add to `Instant::now()`
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// `now + ttl`, saturating at a far-future instant
fn deadline_after(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or_else(|| now + FAR_FUTURE)
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Thread-safe key/value cache with per-entry expiry.
///
/// Values are stored as JSON so any serializable lookup result can be
/// memoized. Locks are held only for a single map operation.
#[derive(Debug)]
pub struct ResultCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
    sweep_interval: Duration,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    /// Create a cache with the default TTL and sweep interval
    pub fn new() -> Self {
        Self::with_settings(CacheTtl::DEFAULT, CacheTtl::SWEEP_INTERVAL)
    }

    /// Create a cache with a custom TTL and sweep interval
    pub fn with_settings(default_ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            sweep_interval,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a live entry. Expired entries are removed and reported as absent.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        {
            let entries = self.read();
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // A concurrent set may have refreshed the entry in between.
        let mut entries = self.write();
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        None
    }

    /// Get a live entry and decode it. Undecodable entries count as misses.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Store a value with the default TTL, replacing any existing entry
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Store a value with an explicit TTL, replacing any existing entry
    pub fn set_with_ttl(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: deadline_after(Instant::now(), ttl),
        };
        self.write().insert(key.into(), entry);
    }

    /// Serialize and store a value with the default TTL
    pub fn set_as<T: Serialize>(&self, key: impl Into<String>, value: &T) -> Result<()> {
        self.set(key, serde_json::to_value(value)?);
        Ok(())
    }

    /// Drop an entry. Returns whether anything was removed.
    pub fn remove(&self, key: &str) -> bool {
        self.write().remove(key).is_some()
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Remove every expired entry and return how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Start the periodic sweep on the current tokio runtime.
    ///
    /// The task holds a weak reference and finishes once the cache is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let cache = Arc::downgrade(self);
        let interval = self.sweep_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(deadline_after(Instant::now(), interval), interval);
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let purged = cache.purge_expired();
                if purged > 0 {
                    log::debug!("Cache sweep removed {} expired entries", purged);
                }
            }
        })
    }
}
