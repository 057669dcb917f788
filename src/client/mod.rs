//! HTTP client for the preferences backend
//!
//! [`PreferenceClient`] turns save/load actions into single requests against
//! the backend and normalizes every failure into a [`PreferenceError`]
//! carrying a displayable message. There is no retry, cache, or
//! pagination: each call is one request and its outcome.
//!
//! ```rust,ignore
//! let config = ClientConfig::new("http://localhost:8000").with_user("alice");
//! let client = PreferenceClient::new(config)?;
//!
//! let search = form.prepare_save("My Search")?;
//! client.save_search(&search).await?;
//!
//! let prefs = client.get_preferences().await?;
//! form.apply(&prefs.find_search("My Search").unwrap().criteria);
//! ```

mod response;

pub use response::error_message_from_body;

use crate::config::ClientConfig;
use crate::core::{ConfigError, PreferenceError, PreferenceResult, SavedSearch, UserPreferences};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Operations of the preferences backend
#[async_trait]
pub trait PreferenceApi: Send + Sync {
    /// Create or update a named search; returns the backend's echo unvalidated
    async fn save_search(&self, search: &SavedSearch) -> PreferenceResult<Value>;

    /// Fetch saved searches and display columns
    async fn get_preferences(&self) -> PreferenceResult<UserPreferences>;

    /// Persist the display column order
    async fn save_display_columns(&self, columns: &[String]) -> PreferenceResult<Value>;

    /// Remove a saved search by name
    async fn delete_search(&self, name: &str) -> PreferenceResult<UserPreferences>;
}

#[derive(Serialize)]
struct SaveColumnsBody<'a> {
    columns: &'a [String],
}

/// reqwest-backed [`PreferenceApi`]
#[derive(Debug, Clone)]
pub struct PreferenceClient {
    http: reqwest::Client,
    config: ClientConfig,
    headers: HeaderMap,
}

impl PreferenceClient {
    /// Build a client from configuration
    ///
    /// Fails when the base URL or a configured header is invalid.
    pub fn new(config: ClientConfig) -> PreferenceResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|e| PreferenceError::Transport {
            message: format!("Failed to build HTTP client: {}", e),
        })?;
        Self::with_http_client(http, config)
    }

    /// Use an existing reqwest client
    ///
    /// The configured headers and user identity are still sent with every
    /// request; `timeout_secs` is ignored in favor of the client's own.
    pub fn with_http_client(http: reqwest::Client, config: ClientConfig) -> PreferenceResult<Self> {
        config.base()?;
        let headers = Self::request_headers(&config)?;
        Ok(Self {
            http,
            config,
            headers,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request_headers(config: &ClientConfig) -> Result<HeaderMap, ConfigError> {
        let identity = config
            .user_id
            .as_ref()
            .map(|user_id| (&config.user_header, user_id));

        let mut headers = HeaderMap::new();
        for (name, value) in config.headers.iter().chain(identity) {
            let invalid = |message: String| ConfigError::InvalidValue {
                field: "headers".to_string(),
                value: name.clone(),
                message,
            };
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
            let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url).headers(self.headers.clone())
    }

    /// Send one request and decode a 2xx body
    ///
    /// An empty 2xx body decodes from JSON `null`.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> PreferenceResult<T> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        tracing::debug!(%method, %path, "preferences request");

        let response = self.http.execute(request).await.map_err(|e| {
            tracing::warn!(%method, %path, "preferences request failed: {}", e);
            PreferenceError::from(e)
        })?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = error_message_from_body(status.as_u16(), &body);
            tracing::warn!(%method, %path, status = status.as_u16(), "{}", message);
            return Err(PreferenceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &body
        };
        serde_json::from_slice(body).map_err(|e| PreferenceError::Decode {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl PreferenceApi for PreferenceClient {
    async fn save_search(&self, search: &SavedSearch) -> PreferenceResult<Value> {
        let url = self.config.endpoint_url(&self.config.paths.save_search)?;
        self.send(self.request(Method::POST, url).json(search)).await
    }

    async fn get_preferences(&self) -> PreferenceResult<UserPreferences> {
        let url = self.config.endpoint_url(&self.config.paths.get_preferences)?;
        let prefs: Option<UserPreferences> = self.send(self.request(Method::GET, url)).await?;
        Ok(prefs.unwrap_or_default())
    }

    async fn save_display_columns(&self, columns: &[String]) -> PreferenceResult<Value> {
        let url = self.config.endpoint_url(&self.config.paths.save_columns)?;
        self.send(
            self.request(Method::POST, url)
                .json(&SaveColumnsBody { columns }),
        )
        .await
    }

    async fn delete_search(&self, name: &str) -> PreferenceResult<UserPreferences> {
        let mut url = self.config.endpoint_url(&self.config.paths.delete_search)?;
        url.path_segments_mut()
            .map_err(|_| ConfigError::InvalidValue {
                field: "base_url".to_string(),
                value: self.config.base_url.clone(),
                message: "URL cannot carry path segments".to_string(),
            })?
            .pop_if_empty()
            .push(name);
        let prefs: Option<UserPreferences> = self.send(self.request(Method::DELETE, url)).await?;
        Ok(prefs.unwrap_or_default())
    }
}
