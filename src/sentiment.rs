// src/sentiment.rs
//! Sentiment gateway: proxies text scoring and health probes to the
//! sentiment-analysis service (`POST /analyze`, `GET /health`).

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::SentimentConfig;
use crate::gateway::request::require_text;
use crate::gateway::{GatewayError, RequestSpec, Transport, TransportCode, Upstream};

pub const SENTIMENT_TIMEOUT: Duration = Duration::from_secs(10);
pub const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Compound scores inside (-0.05, 0.05) are neutral.
const NEUTRAL_BAND: f64 = 0.05;

const GATEWAY: &str = "sentiment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= NEUTRAL_BAND {
            SentimentLabel::Positive
        } else if score <= -NEUTRAL_BAND {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Compound score in [-1.0, 1.0].
    pub score: f64,
    pub label: SentimentLabel,
}

impl SentimentScore {
    pub fn new(raw: f64) -> Self {
        let score = raw.clamp(-1.0, 1.0);
        Self {
            score,
            label: SentimentLabel::from_score(score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamHealth {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Deserialize)]
struct AnalyzeResp {
    #[serde(default)]
    sentiment: Option<f64>,
}

pub struct SentimentGateway {
    upstream: Upstream,
}

impl SentimentGateway {
    pub fn new(cfg: &SentimentConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            upstream: Upstream::new(GATEWAY, cfg.base_url.clone(), transport),
        }
    }

    pub async fn analyze(&self, text: &str) -> Result<SentimentScore, GatewayError> {
        let text = require_text("text", text)?;
        let spec = RequestSpec::post_json("/analyze", json!({ "text": text }));
        let resp: AnalyzeResp = self
            .upstream
            .call_json("analyze", &spec, SENTIMENT_TIMEOUT)
            .await?;

        match resp.sentiment {
            Some(s) if s.is_finite() => Ok(SentimentScore::new(s)),
            _ => Err(GatewayError::from_failure(
                GATEWAY,
                "analyze",
                Some(200),
                Some(TransportCode::InvalidBody),
                "response has no numeric 'sentiment' field",
            )),
        }
    }

    /// Lightweight probe with its own short timeout.
    pub async fn health(&self) -> Result<UpstreamHealth, GatewayError> {
        let spec = RequestSpec::get("/health");
        self.upstream
            .call_json("health", &spec, HEALTH_PROBE_TIMEOUT)
            .await
    }
}
