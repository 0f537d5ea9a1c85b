use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entities::Preference;
use crate::domain::kinds::Kind;

/// Success envelope: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct PreferencesData {
    pub preferences: Vec<Preference>,
}

#[derive(Debug, Serialize)]
pub struct PreferenceData {
    pub preference: Preference,
}

#[derive(Debug, Deserialize)]
pub struct PreferenceUpdateRequest {
    /// Defaulted so an absent field reports "missing key", not a parse error.
    #[serde(default)]
    pub key: String,
    /// `None` when the body carries no value attribute.
    pub value: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SiteUpsertRequest {
    pub auth_url: String,
}

#[derive(Debug, Deserialize)]
pub struct DefaultUpsertRequest {
    pub kind: Kind,
    pub value: Value,
    #[serde(default)]
    pub deprecated: bool,
}

#[derive(Debug, Serialize)]
pub struct DeletedData {
    pub deleted: bool,
}
