//! Override store: per-user deviations from a site's defaults.
//!
//! Reads go straight to the persistent store; the resolver caches the merged
//! result instead. Every mutation drops the merged-result cache entry for
//! the affected (site, user) pair.

use std::sync::Arc;

use crate::cache::{CacheKey, PreferenceCache};
use crate::domain::entities::OverrideRecord;

use super::error::AppError;
use super::repos::{OverridesRepo, UpsertOverrideParams};

#[derive(Clone)]
pub struct OverrideStore {
    repo: Arc<dyn OverridesRepo>,
    cache: Arc<dyn PreferenceCache>,
}

impl OverrideStore {
    pub fn new(repo: Arc<dyn OverridesRepo>, cache: Arc<dyn PreferenceCache>) -> Self {
        Self { repo, cache }
    }

    pub async fn list(
        &self,
        site_url: &str,
        user_id: &str,
    ) -> Result<Vec<OverrideRecord>, AppError> {
        Ok(self.repo.list_overrides(site_url, user_id).await?)
    }

    pub async fn upsert(&self, params: UpsertOverrideParams) -> Result<OverrideRecord, AppError> {
        let record = self.repo.upsert_override(params).await?;
        self.cache
            .delete(&CacheKey::preferences(&record.site_url, &record.user_id));
        Ok(record)
    }

    /// Idempotent: removing an override that does not exist is a no-op, but
    /// the merged-result entry is dropped either way.
    pub async fn delete(
        &self,
        site_url: &str,
        user_id: &str,
        key: &str,
    ) -> Result<bool, AppError> {
        let existed = self.repo.delete_override(site_url, user_id, key).await?;
        self.cache
            .delete(&CacheKey::preferences(site_url, user_id));
        Ok(existed)
    }
}
