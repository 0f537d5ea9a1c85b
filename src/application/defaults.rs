//! Default store: a site's declared preference schema and baseline values.

use std::sync::Arc;

use serde_json::Value;

use crate::cache::{CacheKey, CachedValue, PreferenceCache, SITE_DEFAULTS_TTL};
use crate::domain::entities::DefaultRecord;
use crate::domain::kinds::Kind;

use super::error::AppError;
use super::repos::{DefaultsRepo, UpsertDefaultParams};
use super::sites::SiteService;

/// An admin-supplied default, with the value still in its JSON form.
#[derive(Debug, Clone)]
pub struct UpsertDefaultCommand {
    pub site_url: String,
    pub key: String,
    pub kind: Kind,
    pub value: Value,
    pub deprecated: bool,
}

#[derive(Clone)]
pub struct DefaultsService {
    sites: Arc<SiteService>,
    repo: Arc<dyn DefaultsRepo>,
    cache: Arc<dyn PreferenceCache>,
}

impl DefaultsService {
    pub fn new(
        sites: Arc<SiteService>,
        repo: Arc<dyn DefaultsRepo>,
        cache: Arc<dyn PreferenceCache>,
    ) -> Self {
        Self { sites, repo, cache }
    }

    /// The site's full default set, cached under `site_defaults:{site_url}`.
    pub async fn list(&self, site_url: &str) -> Result<Vec<DefaultRecord>, AppError> {
        // Resolving the site first keeps the unknown-site failure mode ahead
        // of an empty-list success.
        self.sites.get(site_url).await?;

        let key = CacheKey::site_defaults(site_url);
        if let Some(defaults) = self.cache.get(&key).and_then(CachedValue::into_defaults) {
            return Ok(defaults);
        }

        let defaults = self.repo.list_defaults(site_url).await?;
        self.cache
            .set(key, CachedValue::Defaults(defaults.clone()), SITE_DEFAULTS_TTL);
        Ok(defaults)
    }

    /// Point lookup for a single default. Deliberately uncached: a freshly
    /// corrected record must win over a stale cached list.
    pub async fn default_for_key(
        &self,
        site_url: &str,
        key: &str,
    ) -> Result<DefaultRecord, AppError> {
        self.sites.get(site_url).await?;
        self.repo
            .find_default(site_url, key)
            .await?
            .ok_or_else(|| AppError::invalid_key(key))
    }

    /// Create or update a default, serializing the supplied JSON value under
    /// the declared kind. Drops the cached default set for the site.
    pub async fn upsert(&self, command: UpsertDefaultCommand) -> Result<DefaultRecord, AppError> {
        self.sites.get(&command.site_url).await?;

        let serialized = command
            .kind
            .serialize(&command.value)
            .map_err(|_| AppError::type_mismatch(command.kind, command.key.clone()))?;

        let record = self
            .repo
            .upsert_default(UpsertDefaultParams {
                site_url: command.site_url.clone(),
                key: command.key,
                kind: command.kind,
                value: serialized,
                deprecated: command.deprecated,
            })
            .await?;

        self.cache
            .delete(&CacheKey::site_defaults(&command.site_url));
        Ok(record)
    }

    /// Delete a default. Drops the cached default set for the site; any
    /// orphaned overrides for the key stop surfacing in merges.
    pub async fn delete(&self, site_url: &str, key: &str) -> Result<bool, AppError> {
        self.sites.get(site_url).await?;
        let existed = self.repo.delete_default(site_url, key).await?;
        self.cache.delete(&CacheKey::site_defaults(site_url));
        Ok(existed)
    }
}
