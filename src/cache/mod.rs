//! Cache-aside layer for site metadata, default sets, and merged results.
//!
//! The stores never talk to a process-global cache handle; they receive a
//! [`PreferenceCache`] capability so tests can substitute a plain in-memory
//! map and production can size the bundled [`MemoryCache`].

mod keys;
mod lock;
mod store;

pub use keys::{
    AUTH_URL_TTL, CacheKey, PREFERENCES_TTL, SITE_DEFAULTS_TTL, SITE_TTL,
};
pub use store::{CachedValue, MemoryCache, PreferenceCache};
