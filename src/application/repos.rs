//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{DefaultRecord, OverrideRecord, SiteRecord};
use crate::domain::kinds::Kind;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("integrity error: {message}")]
    Integrity { message: String },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[async_trait]
pub trait SitesRepo: Send + Sync {
    async fn find_site(&self, site_url: &str) -> Result<Option<SiteRecord>, RepoError>;

    /// Create or replace a site record, keyed by its URL.
    async fn upsert_site(&self, site: SiteRecord) -> Result<SiteRecord, RepoError>;
}

#[derive(Debug, Clone)]
pub struct UpsertDefaultParams {
    pub site_url: String,
    pub key: String,
    pub kind: Kind,
    /// Serialized under `kind`.
    pub value: String,
    pub deprecated: bool,
}

#[async_trait]
pub trait DefaultsRepo: Send + Sync {
    /// All defaults for a site, ordered by key.
    async fn list_defaults(&self, site_url: &str) -> Result<Vec<DefaultRecord>, RepoError>;

    async fn find_default(
        &self,
        site_url: &str,
        key: &str,
    ) -> Result<Option<DefaultRecord>, RepoError>;

    async fn upsert_default(&self, params: UpsertDefaultParams)
    -> Result<DefaultRecord, RepoError>;

    /// Returns whether a record existed.
    async fn delete_default(&self, site_url: &str, key: &str) -> Result<bool, RepoError>;
}

#[derive(Debug, Clone)]
pub struct UpsertOverrideParams {
    pub site_url: String,
    pub user_id: String,
    pub key: String,
    pub kind: Kind,
    /// Serialized under `kind`.
    pub value: String,
}

#[async_trait]
pub trait OverridesRepo: Send + Sync {
    async fn list_overrides(
        &self,
        site_url: &str,
        user_id: &str,
    ) -> Result<Vec<OverrideRecord>, RepoError>;

    /// Create or update the unique override for (site, user, key). Must be a
    /// single atomic operation at the storage boundary, not an exists-check
    /// followed by a write.
    async fn upsert_override(
        &self,
        params: UpsertOverrideParams,
    ) -> Result<OverrideRecord, RepoError>;

    /// Returns whether a record existed; deleting a missing override is a
    /// benign no-op.
    async fn delete_override(
        &self,
        site_url: &str,
        user_id: &str,
        key: &str,
    ) -> Result<bool, RepoError>;
}
