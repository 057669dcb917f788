//! HTTP handlers for the preference routes
//!
//! Every route identifies the caller by the configured user header; a
//! request without it is rejected before the store is touched.

use axum::{
    Json,
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::error::ApiError;
use crate::core::validation::{PayloadRules, ValidatedJson, ValidatedPayload, filters, validators};
use crate::core::{PreferenceStore, SavedSearch, SearchCriteria, UserPreferences};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PreferenceStore>,
    pub config: Arc<ServerConfig>,
}

/// The calling user, taken from the configured header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl FromRequestParts<AppState> for UserId {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = state.config.user_header.as_str();
        let user_id = parts
            .headers
            .get(header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::Unauthorized {
                message: format!("missing '{}' header", header),
            })?;

        Ok(UserId(user_id.to_string()))
    }
}

/// Body of `POST save-search`
#[derive(Debug, Deserialize)]
pub struct SaveSearchRequest {
    pub name: String,
    #[serde(default, deserialize_with = "crate::core::criteria::null_as_default")]
    pub criteria: SearchCriteria,
}

impl ValidatedPayload<AppState> for SaveSearchRequest {
    fn rules(state: &AppState) -> PayloadRules {
        PayloadRules::new("saved_search")
            .filter("name", filters::trim())
            .validator("name", validators::required_text())
            .validator("name", validators::string_length(1, state.config.max_name_length))
    }
}

/// Body of `POST save-columns`
#[derive(Debug, Deserialize)]
pub struct SaveColumnsRequest {
    pub columns: Vec<String>,
}

impl ValidatedPayload<AppState> for SaveColumnsRequest {
    fn rules(state: &AppState) -> PayloadRules {
        PayloadRules::new("display_columns")
            .filter("columns", filters::trim_entries())
            .validator("columns", validators::string_list())
            .validator("columns", validators::max_items(state.config.max_columns))
            .validator("columns", validators::column_identifiers())
            .validator("columns", validators::unique_entries())
    }
}

/// Insert or replace a saved search; echoes the stored search
pub async fn save_search(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    ValidatedJson(payload): ValidatedJson<SaveSearchRequest>,
) -> Result<Json<SavedSearch>, ApiError> {
    tracing::info!(user = %user_id, name = %payload.name, "saving search");

    let search = SavedSearch::new(payload.name, payload.criteria);
    let saved = state.store.save_search(&user_id, search).await?;

    Ok(Json(saved))
}

/// Replace the display column order; returns the whole document
pub async fn save_columns(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    ValidatedJson(payload): ValidatedJson<SaveColumnsRequest>,
) -> Result<Json<UserPreferences>, ApiError> {
    tracing::info!(user = %user_id, count = payload.columns.len(), "saving display columns");

    let prefs = state.store.save_columns(&user_id, payload.columns).await?;

    Ok(Json(prefs))
}

/// Fetch the caller's preferences; an unknown user gets an empty document
pub async fn get_preferences(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<UserPreferences>, ApiError> {
    let prefs = state.store.get(&user_id).await?;
    tracing::debug!(user = %user_id, found = prefs.is_some(), "loaded preferences");

    Ok(Json(prefs.unwrap_or_default()))
}

/// Remove a saved search by name
pub async fn delete_search(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(name): Path<String>,
) -> Result<Json<UserPreferences>, ApiError> {
    tracing::info!(user = %user_id, name = %name, "deleting search");

    let prefs = state
        .store
        .delete_search(&user_id, &name)
        .await?
        .ok_or(ApiError::PreferencesNotFound { user_id })?;

    Ok(Json(prefs))
}
