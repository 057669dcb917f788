//! Typed error handling for prefs-rs
//!
//! Client-side failures are normalized into a single [`PreferenceError`] that
//! always carries a human-readable message, so a UI can show it directly.
//! The reference service uses [`ApiError`], which knows its HTTP status and
//! serializes into the error body the client understands.
//!
//! # Error Categories
//!
//! - [`PreferenceError`]: Everything a [`crate::client::PreferenceApi`] call can return
//! - [`ConfigError`]: Errors related to configuration parsing and validation
//! - [`ValidationError`]: Errors related to input validation
//! - [`ApiError`]: Errors returned by the reference preferences service
//!
//! # Example
//!
//! ```rust,ignore
//! match client.save_search(&search).await {
//!     Ok(stored) => println!("Saved: {}", stored),
//!     Err(PreferenceError::Transport { .. }) => eprintln!("Backend unreachable"),
//!     Err(e) => eprintln!("{}", e.message()),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Message used when a failed response carries no usable error text
pub fn fallback_message(status: u16) -> String {
    format!("Request failed with status {}", status)
}

// =============================================================================
// Client Errors
// =============================================================================

/// The error type returned by every preference client operation
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// No response was received (connection refused, DNS, timeout, ...)
    #[error("{message}")]
    Transport { message: String },

    /// The backend answered with a non-2xx status
    ///
    /// `message` is taken from the body's `message`, `detail` or `error`
    /// field, or is a generic fallback when the body could not be parsed.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A 2xx response whose body does not have the expected shape
    #[error("Unexpected response from preferences service: {message}")]
    Decode { message: String },

    /// Client configuration is unusable
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input rejected before any request was made
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl PreferenceError {
    /// Human-readable message, suitable for a notification
    ///
    /// Never empty.
    pub fn message(&self) -> String {
        let message = match self {
            PreferenceError::Validation(e) => e.user_message(),
            other => other.to_string(),
        };
        if message.trim().is_empty() {
            match self.status() {
                Some(status) => fallback_message(status),
                None => "An unexpected error occurred".to_string(),
            }
        } else {
            message
        }
    }

    /// HTTP status of the failed response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            PreferenceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            PreferenceError::Transport { .. } => "TRANSPORT_ERROR",
            PreferenceError::Status { .. } => "HTTP_STATUS_ERROR",
            PreferenceError::Decode { .. } => "DECODE_ERROR",
            PreferenceError::Config(_) => "CONFIG_ERROR",
            PreferenceError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

impl From<reqwest::Error> for PreferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PreferenceError::Decode {
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            PreferenceError::Status {
                status: status.as_u16(),
                message: fallback_message(status.as_u16()),
            }
        } else {
            PreferenceError::Transport {
                message: format!("Network error: {}", err),
            }
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse config{}: {}", .file.as_ref().map(|f| format!(" file '{}'", f)).unwrap_or_default(), .message)]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError {
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Single field validation error
    #[error("Validation error for field '{field}': {message}")]
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    #[error("Validation errors: {}", .0.iter().map(|e| format!("{}: {}", e.field, e.message)).collect::<Vec<_>>().join(", "))]
    FieldErrors(Vec<FieldValidationError>),

    /// Invalid JSON format
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    /// The message a form should display, without the field prefix
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::FieldError { message, .. } => message.clone(),
            ValidationError::FieldErrors(errors) if errors.len() == 1 => errors[0].message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<Vec<FieldValidationError>> for ValidationError {
    fn from(mut errors: Vec<FieldValidationError>) -> Self {
        if errors.len() == 1 {
            let err = errors.remove(0);
            ValidationError::FieldError {
                field: err.field,
                message: err.message,
            }
        } else {
            ValidationError::FieldErrors(errors)
        }
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::InvalidJson {
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Service Errors
// =============================================================================

/// Errors returned by the reference preferences service
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request did not identify a user
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The user has no stored preferences
    #[error("User preferences not found for '{user_id}'")]
    PreferencesNotFound { user_id: String },

    /// The payload failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store failed
    #[error("Storage error: {message}")]
    Storage { message: String },
}

/// Error body sent by the reference service
///
/// `detail` mirrors `message` so clients reading either field see the text.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Same text as `message`
    pub detail: String,
    /// Per-field validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldValidationError>>,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::PreferencesNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::PreferencesNotFound { .. } => "PREFERENCES_NOT_FOUND",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Storage { .. } => "STORAGE_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            ApiError::Validation(e) => e.user_message(),
            other => other.to_string(),
        };
        let fields = match self {
            ApiError::Validation(ValidationError::FieldErrors(errors)) => Some(errors.clone()),
            _ => None,
        };
        ErrorResponse {
            code: self.error_code().to_string(),
            detail: message.clone(),
            message,
            fields,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Storage {
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for preference client operations
pub type PreferenceResult<T> = Result<T, PreferenceError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_displays_backend_message() {
        let err = PreferenceError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.message(), "boom");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_empty_status_message_falls_back() {
        let err = PreferenceError::Status {
            status: 502,
            message: "   ".to_string(),
        };
        assert_eq!(err.message(), "Request failed with status 502");
    }

    #[test]
    fn test_validation_message_has_no_field_prefix() {
        let err: PreferenceError = ValidationError::FieldError {
            field: "name".to_string(),
            message: "Please enter a name for your search".to_string(),
        }
        .into();
        assert_eq!(err.message(), "Please enter a name for your search");
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_field_errors_display_lists_fields() {
        let err = ValidationError::FieldErrors(vec![
            FieldValidationError {
                field: "name".to_string(),
                message: "required".to_string(),
            },
            FieldValidationError {
                field: "columns".to_string(),
                message: "duplicate entry".to_string(),
            },
        ]);
        let display = err.to_string();
        assert!(display.contains("name: required"));
        assert!(display.contains("columns: duplicate entry"));
    }

    #[test]
    fn test_single_field_error_collapses() {
        let err: ValidationError = vec![FieldValidationError {
            field: "name".to_string(),
            message: "required".to_string(),
        }]
        .into();
        assert!(matches!(err, ValidationError::FieldError { .. }));
    }

    #[test]
    fn test_config_parse_error_mentions_file() {
        let err = ConfigError::ParseError {
            file: Some("prefs.yaml".to_string()),
            message: "bad indent".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse config file 'prefs.yaml': bad indent"
        );

        let err = ConfigError::ParseError {
            file: None,
            message: "bad indent".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to parse config: bad indent");
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::Unauthorized {
                message: "missing user".to_string()
            }
            .status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::PreferencesNotFound {
                user_id: "u1".to_string()
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Storage {
                message: "lock poisoned".to_string()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_response_mirrors_detail() {
        let err = ApiError::Validation(ValidationError::FieldError {
            field: "name".to_string(),
            message: "must not be empty".to_string(),
        });
        let response = err.to_response();
        assert_eq!(response.code, "VALIDATION_ERROR");
        assert_eq!(response.message, "must not be empty");
        assert_eq!(response.detail, response.message);
        assert!(response.fields.is_none());
    }
}
