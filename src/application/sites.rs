//! Site store: cached lookup of site metadata and auth endpoints.

use std::sync::Arc;

use tracing::warn;

use crate::cache::{AUTH_URL_TTL, CacheKey, CachedValue, PreferenceCache, SITE_TTL};
use crate::domain::entities::SiteRecord;

use super::error::AppError;
use super::repos::SitesRepo;

#[derive(Clone)]
pub struct SiteService {
    repo: Arc<dyn SitesRepo>,
    cache: Arc<dyn PreferenceCache>,
}

impl SiteService {
    pub fn new(repo: Arc<dyn SitesRepo>, cache: Arc<dyn PreferenceCache>) -> Self {
        Self { repo, cache }
    }

    /// Resolve a site, filling the `site:{site_url}` cache entry on miss.
    pub async fn get(&self, site_url: &str) -> Result<SiteRecord, AppError> {
        let key = CacheKey::site(site_url);
        if let Some(site) = self.cache.get(&key).and_then(CachedValue::into_site) {
            return Ok(site);
        }

        let site = self
            .repo
            .find_site(site_url)
            .await?
            .ok_or_else(|| AppError::unknown_site(site_url))?;
        self.cache
            .set(key, CachedValue::Site(site.clone()), SITE_TTL);
        Ok(site)
    }

    /// The site's auth endpoint, cached separately under a long TTL since
    /// auth endpoints change rarely.
    pub async fn auth_endpoint(&self, site_url: &str) -> Result<String, AppError> {
        let key = CacheKey::site_auth_url(site_url);
        if let Some(auth_url) = self.cache.get(&key).and_then(CachedValue::into_auth_url) {
            return Ok(auth_url);
        }

        let auth_url = self.get(site_url).await?.auth_url;
        self.cache
            .set(key, CachedValue::AuthUrl(auth_url.clone()), AUTH_URL_TTL);
        Ok(auth_url)
    }

    /// Create or replace a site record.
    ///
    /// Site caches have no write-path invalidation: already-cached lookups
    /// refresh only when their TTL expires.
    pub async fn upsert(&self, site: SiteRecord) -> Result<SiteRecord, AppError> {
        let record = self.repo.upsert_site(site).await?;
        warn!(
            site_url = %record.url,
            "site record written; cached site/auth lookups refresh on TTL expiry only"
        );
        Ok(record)
    }
}
