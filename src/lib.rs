// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod gateway;
pub mod metrics;
pub mod news;
pub mod sentiment;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router as router, AppState};
pub use crate::config::GatewayConfig;
pub use crate::gateway::{ErrorKind, GatewayError};
pub use crate::news::{NewsGateway, NormalizedArticle};
pub use crate::sentiment::{SentimentGateway, SentimentScore};

/// Build both gateways over one shared reqwest-backed transport.
pub fn build_state(cfg: &GatewayConfig) -> anyhow::Result<AppState> {
    let transport = Arc::new(gateway::HttpTransport::new().context("building HTTP client")?);
    Ok(AppState::new(
        NewsGateway::new(&cfg.news, transport.clone()),
        SentimentGateway::new(&cfg.sentiment, transport),
    ))
}

/// Full router from config; `/metrics` is mounted when a recorder is given.
pub fn app_with_config(
    cfg: &GatewayConfig,
    metrics: Option<&crate::metrics::Metrics>,
) -> anyhow::Result<Router> {
    let router = api::create_router(build_state(cfg)?);
    Ok(match metrics {
        Some(m) => router.merge(m.router()),
        None => router,
    })
}

/// Router built from `.env` + `GatewayConfig::from_env()`, without metrics.
pub async fn app() -> anyhow::Result<Router> {
    let _ = dotenvy::dotenv();
    let cfg = GatewayConfig::from_env()?;
    app_with_config(&cfg, None)
}
