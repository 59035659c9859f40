//! Crypto news gateway service entrypoint.
//! Boots the Axum HTTP server with both upstream gateways, request tracing and
//! the Prometheus `/metrics` route.

use crypto_news_gateway::{app_with_config, metrics::Metrics, GatewayConfig};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON when GATEWAY_LOG_JSON=1.
/// Best-effort: the runtime may already own the global subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crypto_news_gateway=info,gateway=info,tower_http=info,warn"));

    let json = std::env::var("GATEWAY_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = GatewayConfig::from_env()?;
    tracing::info!(
        news = %cfg.news.base_url,
        sentiment = %cfg.sentiment.base_url,
        api_key = cfg.news.api_key.is_some(),
        "gateway config loaded"
    );

    let metrics = match Metrics::install() {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics disabled");
            None
        }
    };

    let router = app_with_config(&cfg, metrics.as_ref())?;
    Ok(router.into())
}
