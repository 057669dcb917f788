//! # prefs-rs
//!
//! Client and reference service for per-user search preferences: named
//! saved searches and the order of a results table's display columns.
//!
//! ## Features
//!
//! - **Typed criteria**: search text, filters and sort settings with a closed set of filter kinds
//! - **Form assembly**: turn raw search-form values into criteria, and back
//! - **HTTP client**: one request per action, every failure normalized to a displayable message
//! - **Notifications**: a toast store that reports outcomes to subscribers
//! - **Reference service**: axum routes over a pluggable store
//! - **Configuration**: YAML files with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use prefs::prelude::*;
//!
//! let client = PreferenceClient::new(ClientConfig::from_env()?)?;
//! let notifications = NotificationCenter::default();
//!
//! let mut form = CriteriaForm::new();
//! form.set("fileType", json!("pdf")).set("division", json!(""));
//!
//! match form.prepare_save("My Search") {
//!     Ok(search) => match client.save_search(&search).await {
//!         Ok(_) => notifications.report_success("Search saved"),
//!         Err(e) => notifications.report_error(&e),
//!     },
//!     Err(e) => notifications.report_error(&e.into()),
//! };
//! ```

pub mod client;
pub mod config;
pub mod core;
pub mod notify;
pub mod server;
pub mod storage;

/// Re-exports of the most used types
pub mod prelude {
    pub use crate::client::{PreferenceApi, PreferenceClient, error_message_from_body};
    pub use crate::config::{ClientConfig, EndpointPaths, ServerConfig};
    pub use crate::core::{
        ApiError, ConfigError, CriteriaForm, DateRange, FilterMap, FilterValue,
        NAME_REQUIRED_MESSAGE, PreferenceError, PreferenceResult, PreferenceStore, SavedSearch,
        SearchCriteria, UserPreferences, ValidationError, assemble_filters, is_truthy,
    };
    pub use crate::notify::{NotificationCenter, Toast, ToastSpec, ToastState, ToastVariant};
    pub use crate::server::PreferenceServer;
    pub use crate::storage::InMemoryPreferenceStore;

    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
}
