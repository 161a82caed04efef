//! A development stand-in for the headless content backend.
//!
//! It serves the same recipe and upload routes from memory and a local upload
//! directory, so the client can be run and tested without the real backend.

use std::net::SocketAddr;

use anyhow::{Context, Result};

pub mod config;
pub mod content;
pub mod errors;
pub mod routes;
pub mod storage;

use config::Config;
use content::ContentStore;
use mise::RecipeDraft;
use routes::AppState;
use storage::LocalStorage;

/// Build the shared state: upload directory, empty collection, then the optional seed recipes.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let storage = LocalStorage::new(config.upload.clone()).context("Preparing upload directory")?;
    let content = ContentStore::default();
    if let Some(seed) = &config.content.seed {
        let yml = tokio::fs::read_to_string(seed)
            .await
            .with_context(|| format!("Reading seed file {}", seed.display()))?;
        let drafts: Vec<RecipeDraft> = serde_yaml::from_str(&yml).context("Parsing seed file")?;
        tracing::info!("Seeding {} recipes", drafts.len());
        for draft in drafts {
            content.create(draft).await;
        }
    }
    Ok(AppState {
        content,
        storage,
        config: config.content.clone(),
    })
}

/// Bind the configured address and serve in the background. Returns the bound address.
pub async fn spawn(config: &Config) -> Result<(SocketAddr, AppState)> {
    let state = build_state(config).await?;
    let listener = tokio::net::TcpListener::bind(&config.server.address)
        .await
        .with_context(|| format!("Binding {}", config.server.address))?;
    let addr = listener.local_addr()?;
    let app = routes::router(state.clone());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server stopped: {}", e);
        }
    });
    tracing::info!("Listening on {}", addr);
    Ok((addr, state))
}
