//! Configuration loading and management
//!
//! Both the client and the reference service are configured from YAML, with
//! a handful of environment variables taking precedence:
//!
//! | Variable             | Field                       |
//! |----------------------|-----------------------------|
//! | `PREFS_BASE_URL`     | `ClientConfig::base_url`    |
//! | `PREFS_USER_ID`      | `ClientConfig::user_id`     |
//! | `PREFS_TIMEOUT_SECS` | `ClientConfig::timeout_secs`|
//! | `PREFS_BIND`         | `ServerConfig::bind`        |

use crate::core::ConfigError;
use indexmap::IndexMap;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::path::Path;

pub const DEFAULT_USER_HEADER: &str = "x-user-id";
pub const DEFAULT_ROUTE_PREFIX: &str = "/user-preferences";

fn read_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => ConfigError::from(e),
    })?;
    serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
        file: Some(path.display().to_string()),
        message: e.to_string(),
    })
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Paths of the preference endpoints, relative to the base URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointPaths {
    pub save_search: String,
    pub save_columns: String,
    pub get_preferences: String,
    /// Collection path; the search name is appended as one path segment
    pub delete_search: String,
}

impl EndpointPaths {
    /// Paths for a backend mounted under `prefix`
    ///
    /// A missing leading `/` is added, trailing ones are dropped.
    pub fn with_prefix(prefix: &str) -> Self {
        let prefix = format!("/{}", prefix.trim_matches('/'));
        let prefix = prefix.trim_end_matches('/');
        Self {
            save_search: format!("{}/save-search", prefix),
            save_columns: format!("{}/save-columns", prefix),
            get_preferences: format!("{}/get-preferences", prefix),
            delete_search: format!("{}/search", prefix),
        }
    }
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_ROUTE_PREFIX)
    }
}

/// Configuration for [`crate::client::PreferenceClient`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the preferences backend, may include a path prefix
    pub base_url: String,

    pub paths: EndpointPaths,

    /// Identity sent in `user_header` on every request
    pub user_id: Option<String>,

    pub user_header: String,

    /// Request timeout; no timeout is applied when unset
    pub timeout_secs: Option<u64>,

    /// Extra headers sent on every request
    pub headers: IndexMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            paths: EndpointPaths::default(),
            user_id: None,
            user_header: DEFAULT_USER_HEADER.to_string(),
            timeout_secs: None,
            headers: IndexMap::new(),
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at `base_url`, everything else default
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        read_yaml_file(path.as_ref())
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Default configuration with environment overrides applied
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Apply `PREFS_*` environment variables
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_overrides(env_lookup)
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("PREFS_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(user_id) = lookup("PREFS_USER_ID") {
            self.user_id = Some(user_id);
        }
        if let Some(timeout) = lookup("PREFS_TIMEOUT_SECS") {
            let secs = timeout
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue {
                    field: "timeout_secs".to_string(),
                    value: timeout.clone(),
                    message: e.to_string(),
                })?;
            self.timeout_secs = Some(secs);
        }
        Ok(self)
    }

    /// Parsed base URL; must be http or https
    pub fn base(&self) -> Result<Url, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            field: "base_url".to_string(),
            value: self.base_url.clone(),
            message,
        };
        let url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme '{}'", other))),
        }
    }

    /// Absolute URL for an endpoint path
    ///
    /// The path is appended to the base URL, keeping any prefix the base
    /// already has (`http://host/api` + `/user-preferences/...`).
    pub fn endpoint_url(&self, path: &str) -> Result<Url, ConfigError> {
        let base = self.base()?;
        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| ConfigError::InvalidValue {
            field: "paths".to_string(),
            value: path.to_string(),
            message: e.to_string(),
        })
    }
}

/// Configuration for the reference preferences service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,

    /// Path prefix of the preference routes
    pub route_prefix: String,

    /// Header carrying the caller's user id
    pub user_header: String,

    /// Longest accepted search name, in characters
    pub max_name_length: usize,

    /// Largest accepted display column list
    pub max_columns: usize,

    /// Origins allowed by CORS; empty disables the CORS layer
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
            user_header: DEFAULT_USER_HEADER.to_string(),
            max_name_length: 100,
            max_columns: 50,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        read_yaml_file(path.as_ref())
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply `PREFS_BIND` from the environment
    pub fn with_env_overrides(self) -> Self {
        self.apply_overrides(env_lookup)
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("PREFS_BIND") {
            self.bind = bind;
        }
        self
    }

    /// Endpoint paths a client needs to talk to this service
    pub fn endpoint_paths(&self) -> EndpointPaths {
        EndpointPaths::with_prefix(&self.route_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_paths() {
        let paths = EndpointPaths::default();
        assert_eq!(paths.save_search, "/user-preferences/save-search");
        assert_eq!(paths.save_columns, "/user-preferences/save-columns");
        assert_eq!(paths.get_preferences, "/user-preferences/get-preferences");
        assert_eq!(paths.delete_search, "/user-preferences/search");
    }

    #[test]
    fn test_prefix_is_normalized() {
        let expected = EndpointPaths::with_prefix("/user-preferences");
        assert_eq!(EndpointPaths::with_prefix("user-preferences"), expected);
        assert_eq!(EndpointPaths::with_prefix("user-preferences/"), expected);
        assert_eq!(EndpointPaths::with_prefix("").save_search, "/save-search");
        assert_eq!(EndpointPaths::with_prefix("/").delete_search, "/search");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ClientConfig::from_yaml_str(
            r#"
base_url: "http://prefs.internal/api"
user_id: "alice"
headers:
  x-client: admin-dashboard
"#,
        )
        .unwrap();

        assert_eq!(config.base_url, "http://prefs.internal/api");
        assert_eq!(config.user_id.as_deref(), Some("alice"));
        assert_eq!(config.user_header, DEFAULT_USER_HEADER);
        assert_eq!(config.timeout_secs, None);
        assert_eq!(config.paths, EndpointPaths::default());
        assert_eq!(config.headers.get("x-client").map(String::as_str), Some("admin-dashboard"));
    }

    #[test]
    fn test_yaml_serialization() {
        let config = ClientConfig::new("http://localhost:9000").with_user("bob");
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = ClientConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_endpoint_url_keeps_base_prefix() {
        let config = ClientConfig::new("http://prefs.internal/api/");
        let url = config.endpoint_url(&config.paths.save_search).unwrap();
        assert_eq!(
            url.as_str(),
            "http://prefs.internal/api/user-preferences/save-search"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ClientConfig::new("not a url").base().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "base_url"));

        let err = ClientConfig::new("ftp://prefs.internal").base().unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PREFS_BASE_URL", "http://override:1234"),
            ("PREFS_USER_ID", "carol"),
            ("PREFS_TIMEOUT_SECS", " 15 "),
        ]);
        let config = ClientConfig::default()
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.base_url, "http://override:1234");
        assert_eq!(config.user_id.as_deref(), Some("carol"));
        assert_eq!(config.timeout_secs, Some(15));
    }

    #[test]
    fn test_invalid_timeout_override() {
        let err = ClientConfig::default()
            .apply_overrides(|k| (k == "PREFS_TIMEOUT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "timeout_secs"
        ));
    }

    #[test]
    fn test_server_config() {
        let config = ServerConfig::from_yaml_str(
            r#"
route_prefix: "/api/user-preferences/"
max_columns: 3
"#,
        )
        .unwrap()
        .apply_overrides(|k| (k == "PREFS_BIND").then(|| "0.0.0.0:9000".to_string()));

        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.max_columns, 3);
        assert_eq!(config.max_name_length, 100);
        assert_eq!(
            config.endpoint_paths().get_preferences,
            "/api/user-preferences/get-preferences"
        );
    }

    #[test]
    fn test_missing_file() {
        let err = ServerConfig::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
