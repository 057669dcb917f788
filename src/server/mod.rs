//! Reference preferences service
//!
//! `PreferenceServer` wires a [`PreferenceStore`] behind the routes the
//! client talks to:
//! - `POST {prefix}/save-search`
//! - `POST {prefix}/save-columns`
//! - `GET {prefix}/get-preferences`
//! - `DELETE {prefix}/search/{name}`
//! - `GET /health` and `GET /healthz`

pub mod handlers;

pub use handlers::{AppState, SaveColumnsRequest, SaveSearchRequest, UserId};

use crate::config::ServerConfig;
use crate::core::PreferenceStore;
use crate::core::error::ConfigError;
use crate::storage::InMemoryPreferenceStore;
use anyhow::Result;
use axum::http::HeaderValue;
use axum::{
    Json, Router,
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builder for the preferences HTTP service
///
/// # Example
///
/// ```ignore
/// let app = PreferenceServer::new(ServerConfig::default())
///     .with_store(InMemoryPreferenceStore::new())
///     .build()?;
/// ```
pub struct PreferenceServer {
    config: ServerConfig,
    store: Option<Arc<dyn PreferenceStore>>,
    custom_routes: Vec<Router>,
}

impl PreferenceServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            store: None,
            custom_routes: Vec::new(),
        }
    }

    /// Set the preference store; defaults to an in-memory store
    pub fn with_store(mut self, store: impl PreferenceStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Share an existing store handle
    pub fn with_shared_store(mut self, store: Arc<dyn PreferenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Merge additional routes into the service
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router
    ///
    /// Fails when a configured CORS origin is not a valid header value.
    pub fn build(self) -> Result<Router> {
        let cors = cors_layer(&self.config.cors_origins)?;
        let paths = self.config.endpoint_paths();
        let delete_path = format!("{}/{{name}}", paths.delete_search.trim_end_matches('/'));

        let store: Arc<dyn PreferenceStore> = match self.store {
            Some(store) => store,
            None => Arc::new(InMemoryPreferenceStore::new()),
        };
        let state = AppState {
            store,
            config: Arc::new(self.config),
        };

        let preference_routes = Router::new()
            .route(&paths.save_search, post(handlers::save_search))
            .route(&paths.save_columns, post(handlers::save_columns))
            .route(&paths.get_preferences, get(handlers::get_preferences))
            .route(&delete_path, delete(handlers::delete_search))
            .with_state(state);

        let mut app = health_routes().merge(preference_routes);
        for custom in self.custom_routes {
            app = app.merge(custom);
        }

        if let Some(cors) = cors {
            app = app.layer(cors);
        }

        Ok(app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http())))
    }

    /// Serve on the configured bind address with graceful shutdown
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind.clone();
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Preferences service listening on {}", addr);

        self.serve_on(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve_on(self, listener: TcpListener) -> Result<()> {
        let app = self.build()?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Preferences service shutdown complete");
        Ok(())
    }
}

fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "prefs-rs"
    }))
}

fn cors_layer(origins: &[String]) -> Result<Option<CorsLayer>, ConfigError> {
    if origins.is_empty() {
        return Ok(None);
    }
    if origins.iter().any(|origin| origin == "*") {
        return Ok(Some(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        ));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::InvalidValue {
                field: "cors_origins".to_string(),
                value: origin.clone(),
                message: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any),
    ))
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_route() {
        let app = PreferenceServer::new(ServerConfig::default()).build().unwrap();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_custom_routes_are_merged() {
        let custom = Router::new().route("/version", get(|| async { "1" }));
        let app = PreferenceServer::new(ServerConfig::default())
            .with_custom_routes(custom)
            .build()
            .unwrap();

        let response = app
            .oneshot(Request::builder().uri("/version").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_build_with_defaults() {
        assert!(PreferenceServer::new(ServerConfig::default()).build().is_ok());
    }

    #[test]
    fn test_build_with_cors_origins() {
        let config = ServerConfig {
            cors_origins: vec!["http://localhost:3000".to_string()],
            ..ServerConfig::default()
        };
        assert!(PreferenceServer::new(config).build().is_ok());

        let wildcard = ServerConfig {
            cors_origins: vec!["*".to_string()],
            ..ServerConfig::default()
        };
        assert!(PreferenceServer::new(wildcard).build().is_ok());
    }

    #[test]
    fn test_build_rejects_invalid_origin() {
        let config = ServerConfig {
            cors_origins: vec!["bad\norigin".to_string()],
            ..ServerConfig::default()
        };
        assert!(PreferenceServer::new(config).build().is_err());
    }
}
