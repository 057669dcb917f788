//! Reference preferences service backed by the in-memory store
//!
//! Usage: `prefs-server [config.yaml]`. Without a file the defaults apply;
//! `PREFS_BIND` overrides the listen address either way.

use anyhow::Result;
use prefs::config::ServerConfig;
use prefs::server::PreferenceServer;
use prefs::storage::InMemoryPreferenceStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path);
            ServerConfig::from_yaml_file(&path)?
        }
        None => ServerConfig::default(),
    }
    .with_env_overrides();

    PreferenceServer::new(config)
        .with_store(InMemoryPreferenceStore::new())
        .serve()
        .await
}
