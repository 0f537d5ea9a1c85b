//! Persistent records and the effective preference value type.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::error::KindError;
use super::kinds::Kind;

/// A website that uses preferences. Identified by its URL-like string;
/// `auth_url` points at the identity service that resolves tokens for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub url: String,
    pub auth_url: String,
}

/// A site-wide default for a preference key. The full set of a site's
/// defaults doubles as its preference schema: overrides may only exist for
/// keys declared here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultRecord {
    pub site_url: String,
    pub key: String,
    pub kind: Kind,
    /// Serialized under `kind`.
    pub value: String,
    pub deprecated: bool,
}

impl DefaultRecord {
    /// Materialize the default as the effective preference for a user.
    pub fn to_preference(&self, user_id: &str) -> Result<Preference, KindError> {
        Ok(Preference {
            site_url: self.site_url.clone(),
            user_id: user_id.to_string(),
            kind: self.kind,
            key: self.key.clone(),
            value: self.kind.deserialize(&self.value)?,
        })
    }
}

/// A user's explicit deviation from a default, persisted only while it
/// differs from the default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRecord {
    pub id: Uuid,
    pub site_url: String,
    pub user_id: String,
    pub key: String,
    pub kind: Kind,
    /// Serialized under `kind`.
    pub value: String,
}

impl OverrideRecord {
    pub fn to_preference(&self) -> Result<Preference, KindError> {
        Ok(Preference {
            site_url: self.site_url.clone(),
            user_id: self.user_id.clone(),
            kind: self.kind,
            key: self.key.clone(),
            value: self.kind.deserialize(&self.value)?,
        })
    }
}

/// The effective, resolved value for a (site, user, key) triple after
/// merging a default with any override. Ephemeral: never persisted, always
/// carries the value in its deserialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    pub site_url: String,
    pub user_id: String,
    pub kind: Kind,
    pub key: String,
    pub value: Value,
}
