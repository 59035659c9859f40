//! One-shot probe: sentiment service health, then the latest headlines.
//! Usage: gateway_probe [limit]

use crypto_news_gateway::news::LatestQuery;
use crypto_news_gateway::{build_state, GatewayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let limit = std::env::args()
        .nth(1)
        .map(|s| s.parse::<i64>())
        .transpose()?
        .unwrap_or(5);

    let cfg = GatewayConfig::from_env()?;
    let state = build_state(&cfg)?;

    match state.sentiment.health().await {
        Ok(h) => println!("sentiment: {} ({})", h.status, h.service),
        Err(e) => println!("sentiment: down [{}] {}", e.kind, e.message),
    }

    let q = LatestQuery {
        limit: Some(limit),
        language: None,
    };
    match state.news.latest(&q).await {
        Ok(items) => {
            for a in &items {
                let coins: Vec<&str> = a.related_coins.iter().map(String::as_str).collect();
                println!("{} [{}] {} {:?}", a.published_at, a.sentiment, a.title, coins);
            }
            println!("news: {} item(s)", items.len());
        }
        Err(e) => println!("news: failed [{}] {}", e.kind, e.message),
    }

    Ok(())
}
