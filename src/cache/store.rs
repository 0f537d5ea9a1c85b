//! Cache storage: the injected capability and its in-process implementation.

use std::num::NonZeroUsize;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use lru::LruCache;
use metrics::counter;

use crate::domain::entities::{DefaultRecord, Preference, SiteRecord};

use super::keys::CacheKey;
use super::lock::rw_write;

const SOURCE: &str = "cache::store";
const DEFAULT_CAPACITY: usize = 4096;

/// Typed payloads held by the cache, one variant per key family.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Site(SiteRecord),
    AuthUrl(String),
    Defaults(Vec<DefaultRecord>),
    Preferences(Vec<Preference>),
}

impl CachedValue {
    pub fn into_site(self) -> Option<SiteRecord> {
        match self {
            CachedValue::Site(site) => Some(site),
            _ => None,
        }
    }

    pub fn into_auth_url(self) -> Option<String> {
        match self {
            CachedValue::AuthUrl(url) => Some(url),
            _ => None,
        }
    }

    pub fn into_defaults(self) -> Option<Vec<DefaultRecord>> {
        match self {
            CachedValue::Defaults(defaults) => Some(defaults),
            _ => None,
        }
    }

    pub fn into_preferences(self) -> Option<Vec<Preference>> {
        match self {
            CachedValue::Preferences(preferences) => Some(preferences),
            _ => None,
        }
    }
}

/// Key-value cache with per-entry TTL. Individual operations are atomic;
/// there is no cross-key transaction, so a writer that mutates storage and
/// then deletes a key may briefly race a reader (bounded by the entry TTL).
pub trait PreferenceCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<CachedValue>;
    fn set(&self, key: CacheKey, value: CachedValue, ttl: Duration);
    fn delete(&self, key: &CacheKey);
}

struct Entry {
    value: CachedValue,
    expires_at: Instant,
}

/// In-process cache backed by an LRU map with lazy expiry.
///
/// Expired entries are dropped on the read path; capacity pressure is
/// handled by LRU eviction.
pub struct MemoryCache {
    entries: RwLock<LruCache<CacheKey, Entry>>,
}

impl MemoryCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_CAPACITY).unwrap());
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        rw_write(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PreferenceCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                counter!("prefstore_cache_hit_total").increment(1);
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.pop(key);
                counter!("prefstore_cache_miss_total").increment(1);
                None
            }
            None => {
                counter!("prefstore_cache_miss_total").increment(1);
                None
            }
        }
    }

    fn set(&self, key: CacheKey, value: CachedValue, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        let evicted = rw_write(&self.entries, SOURCE, "set").push(key.clone(), entry);
        if let Some((evicted_key, _)) = evicted
            && evicted_key != key
        {
            counter!("prefstore_cache_evict_total").increment(1);
        }
    }

    fn delete(&self, key: &CacheKey) {
        rw_write(&self.entries, SOURCE, "delete").pop(key);
    }
}
