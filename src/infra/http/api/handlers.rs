//! Preference and admin handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use tracing::info;

use crate::application::defaults::UpsertDefaultCommand;
use crate::domain::entities::SiteRecord;

use super::error::ApiError;
use super::middleware::AuthToken;
use super::models::{
    DefaultUpsertRequest, DeletedData, Envelope, PreferenceData, PreferenceUpdateRequest,
    PreferencesData, SiteUpsertRequest,
};
use super::state::ApiState;

pub async fn get_preferences(
    State(state): State<ApiState>,
    Path(site): Path<String>,
    AuthToken(token): AuthToken,
) -> Result<impl IntoResponse, ApiError> {
    let preferences = state.preferences.get(&token, &site).await?;
    Ok(Json(Envelope {
        data: PreferencesData { preferences },
    }))
}

pub async fn update_preference(
    State(state): State<ApiState>,
    Path(site): Path<String>,
    AuthToken(token): AuthToken,
    Json(payload): Json<PreferenceUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.key.is_empty() {
        return Err(ApiError::bad_request("Body missing key attribute."));
    }
    let Some(value) = payload.value else {
        return Err(ApiError::bad_request("Body missing value attribute."));
    };

    let preference = state
        .preferences
        .update(&token, &site, &payload.key, &value)
        .await?;
    Ok(Json(Envelope {
        data: PreferenceData { preference },
    }))
}

pub async fn put_site(
    State(state): State<ApiState>,
    Path(site): Path<String>,
    Json(payload): Json<SiteUpsertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .sites
        .upsert(SiteRecord {
            url: site,
            auth_url: payload.auth_url,
        })
        .await?;
    info!(site_url = %record.url, "site upserted");
    Ok(Json(Envelope { data: record }))
}

pub async fn put_default(
    State(state): State<ApiState>,
    Path((site, key)): Path<(String, String)>,
    Json(payload): Json<DefaultUpsertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .defaults
        .upsert(UpsertDefaultCommand {
            site_url: site,
            key,
            kind: payload.kind,
            value: payload.value,
            deprecated: payload.deprecated,
        })
        .await?;
    info!(site_url = %record.site_url, key = %record.key, "default upserted");
    Ok(Json(Envelope { data: record }))
}

pub async fn delete_default(
    State(state): State<ApiState>,
    Path((site, key)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.defaults.delete(&site, &key).await?;
    info!(site_url = %site, key = %key, deleted, "default delete requested");
    Ok(Json(Envelope {
        data: DeletedData { deleted },
    }))
}
