//! The preference resolver: merges defaults and overrides into the
//! effective preference set for a user, and applies update-or-reset writes.
//!
//! Overrides are a space/write optimization. Only deviations from the
//! default are persisted, so reads stay one cached blob and writes only
//! happen on actual deviation.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheKey, CachedValue, PREFERENCES_TTL, PreferenceCache};
use crate::domain::entities::{OverrideRecord, Preference};

use super::defaults::DefaultsService;
use super::error::AppError;
use super::identity::IdentityResolver;
use super::overrides::OverrideStore;
use super::repos::UpsertOverrideParams;
use super::sites::SiteService;

#[derive(Clone)]
pub struct PreferenceService {
    sites: Arc<SiteService>,
    defaults: Arc<DefaultsService>,
    overrides: Arc<OverrideStore>,
    identity: Arc<dyn IdentityResolver>,
    cache: Arc<dyn PreferenceCache>,
}

impl PreferenceService {
    pub fn new(
        sites: Arc<SiteService>,
        defaults: Arc<DefaultsService>,
        overrides: Arc<OverrideStore>,
        identity: Arc<dyn IdentityResolver>,
        cache: Arc<dyn PreferenceCache>,
    ) -> Self {
        Self {
            sites,
            defaults,
            overrides,
            identity,
            cache,
        }
    }

    async fn resolve_user(&self, site_url: &str, auth_token: &str) -> Result<String, AppError> {
        let auth_url = self.sites.auth_endpoint(site_url).await?;
        Ok(self.identity.resolve_user_id(&auth_url, auth_token).await?)
    }

    /// The effective preference list for the token's user: site defaults
    /// overlaid with the user's overrides, cached for ten minutes per
    /// (site, user) pair.
    ///
    /// The merge iterates the site's current defaults in key order and
    /// replaces matching entries with overrides. An override whose key has
    /// no surviving default (possible when an admin deletes a default after
    /// overrides exist for it) is dropped from the result.
    pub async fn get(
        &self,
        auth_token: &str,
        site_url: &str,
    ) -> Result<Vec<Preference>, AppError> {
        let user_id = self.resolve_user(site_url, auth_token).await?;
        let cache_key = CacheKey::preferences(site_url, &user_id);
        if let Some(preferences) = self
            .cache
            .get(&cache_key)
            .and_then(CachedValue::into_preferences)
        {
            return Ok(preferences);
        }

        let defaults = self.defaults.list(site_url).await?;
        let overrides = self.overrides.list(site_url, &user_id).await?;
        let mut by_key: HashMap<String, OverrideRecord> = overrides
            .into_iter()
            .map(|record| (record.key.clone(), record))
            .collect();

        let mut merged = Vec::with_capacity(defaults.len());
        for default in &defaults {
            let preference = match by_key.remove(&default.key) {
                Some(record) => record
                    .to_preference()
                    .map_err(|err| AppError::corrupt(&record.key, err))?,
                None => default
                    .to_preference(&user_id)
                    .map_err(|err| AppError::corrupt(&default.key, err))?,
            };
            merged.push(preference);
        }
        for orphan in by_key.keys() {
            debug!(site_url, user_id, key = %orphan, "dropping override with no matching default");
        }

        self.cache.set(
            cache_key,
            CachedValue::Preferences(merged.clone()),
            PREFERENCES_TTL,
        );
        Ok(merged)
    }

    /// Create or delete an override for the token's user.
    ///
    /// A value equal to the default (compared in canonical serialized form)
    /// resets the key: any existing override is removed and the default wins
    /// again. A different value upserts the single override row for
    /// (site, user, key). Both branches drop the merged-result cache entry.
    pub async fn update(
        &self,
        auth_token: &str,
        site_url: &str,
        key: &str,
        value: &Value,
    ) -> Result<Preference, AppError> {
        let user_id = self.resolve_user(site_url, auth_token).await?;
        let default = self.defaults.default_for_key(site_url, key).await?;
        let kind = default.kind;

        let serialized = kind
            .serialize(value)
            .map_err(|_| AppError::type_mismatch(kind, key))?;

        // Re-serialize the stored default through the same kind so the
        // comparison is canonical on both sides.
        let default_value = kind
            .deserialize(&default.value)
            .map_err(|err| AppError::corrupt(key, err))?;
        let default_canonical = kind
            .serialize(&default_value)
            .map_err(|err| AppError::corrupt(key, err))?;

        if serialized == default_canonical {
            self.overrides.delete(site_url, &user_id, key).await?;
            return default
                .to_preference(&user_id)
                .map_err(|err| AppError::corrupt(key, err));
        }

        let record = self
            .overrides
            .upsert(UpsertOverrideParams {
                site_url: site_url.to_string(),
                user_id,
                key: key.to_string(),
                kind,
                value: serialized,
            })
            .await?;
        record
            .to_preference()
            .map_err(|err| AppError::corrupt(key, err))
    }
}
