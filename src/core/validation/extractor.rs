//! Axum extractor for validated request bodies
//!
//! `ValidatedJson<T>` parses the body as JSON, runs the payload's
//! [`PayloadRules`], then deserializes the filtered value into `T`.

use super::config::PayloadRules;
use crate::core::error::{ApiError, ValidationError};
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Request payloads that carry validation rules
///
/// Rules are built from the router state so limits can come from
/// configuration.
pub trait ValidatedPayload<S>: DeserializeOwned {
    fn rules(state: &S) -> PayloadRules;
}

/// Axum extractor that validates and filters a JSON body
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn save_search(
///     ValidatedJson(payload): ValidatedJson<SaveSearchRequest>,
/// ) -> Result<Json<SavedSearch>, ApiError> {
///     // payload is already trimmed and validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: ValidatedPayload<S> + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let rules = T::rules(state);

        let Json(payload): Json<Value> = Json::from_request(req, state)
            .await
            .map_err(|e| {
                ApiError::Validation(ValidationError::InvalidJson {
                    message: e.body_text(),
                })
            })?;

        let filtered = rules
            .validate_and_filter(payload)
            .map_err(|errors| ApiError::Validation(errors.into()))?;

        let value = serde_json::from_value(filtered)
            .map_err(|e| ApiError::Validation(ValidationError::from(e)))?;

        Ok(ValidatedJson(value))
    }
}
