//! Cache key definitions and per-key TTL policy.

use std::fmt;
use std::time::Duration;

/// Lazily filled site lookups.
pub const SITE_TTL: Duration = Duration::from_secs(60 * 60);
/// Auth endpoints almost never change, so they get a long TTL. There is no
/// write-path invalidation for sites; this TTL is the staleness ceiling.
pub const AUTH_URL_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 30);
/// The full default set of a site; invalidated on any default write.
pub const SITE_DEFAULTS_TTL: Duration = Duration::from_secs(60 * 60);
/// The merged per-user result; invalidated on any override write.
pub const PREFERENCES_TTL: Duration = Duration::from_secs(600);

/// Identifies a cache entry. `Display` renders the wire form used in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Site { site_url: String },
    SiteAuthUrl { site_url: String },
    SiteDefaults { site_url: String },
    Preferences { site_url: String, user_id: String },
}

impl CacheKey {
    pub fn site(site_url: impl Into<String>) -> Self {
        Self::Site {
            site_url: site_url.into(),
        }
    }

    pub fn site_auth_url(site_url: impl Into<String>) -> Self {
        Self::SiteAuthUrl {
            site_url: site_url.into(),
        }
    }

    pub fn site_defaults(site_url: impl Into<String>) -> Self {
        Self::SiteDefaults {
            site_url: site_url.into(),
        }
    }

    pub fn preferences(site_url: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::Preferences {
            site_url: site_url.into(),
            user_id: user_id.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Site { site_url } => write!(f, "site:{site_url}"),
            CacheKey::SiteAuthUrl { site_url } => write!(f, "site_auth_url:{site_url}"),
            CacheKey::SiteDefaults { site_url } => write!(f, "site_defaults:{site_url}"),
            CacheKey::Preferences { site_url, user_id } => {
                write!(f, "preferences:{site_url}:{user_id}")
            }
        }
    }
}
