// src/news/mod.rs
//! News gateway: latest headlines, search, single-article lookup, categories
//! and per-coin feeds from the upstream news provider.

pub mod coins;
pub mod normalize;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::config::NewsConfig;
use crate::gateway::request::{require_text, resolve_language, resolve_limit};
use crate::gateway::{GatewayError, RequestSpec, Transport, TransportCode, Upstream};

pub use types::{NewsCategory, NewsResponse, NormalizedArticle};

/// Fixed per-call timeout for every news operation.
pub const NEWS_TIMEOUT: Duration = Duration::from_secs(15);

const GATEWAY: &str = "news";

#[derive(Debug, Clone, Default)]
pub struct LatestQuery {
    pub limit: Option<i64>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub term: String,
    pub source_key: String,
    pub limit: Option<i64>,
    pub language: Option<String>,
}

pub struct NewsGateway {
    upstream: Upstream,
    api_key: Option<String>,
    default_language: String,
    default_limit: i64,
}

impl NewsGateway {
    pub fn new(cfg: &NewsConfig, transport: Arc<dyn Transport>) -> Self {
        let api_key = cfg
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);
        if api_key.is_none() {
            tracing::warn!(
                target: "gateway",
                gateway = GATEWAY,
                "no news API key configured; calls go out unauthenticated"
            );
        }
        Self {
            upstream: Upstream::new(GATEWAY, cfg.base_url.clone(), transport),
            api_key,
            default_language: cfg.language.clone(),
            default_limit: cfg.default_limit,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    // ---- request builders (no I/O) ----

    pub fn latest_request(&self, q: &LatestQuery) -> Result<RequestSpec, GatewayError> {
        let limit = resolve_limit(q.limit, self.default_limit)?;
        Ok(RequestSpec::get("/article/list")
            .param("lang", self.language(q.language.as_deref()))
            .param("limit", limit)
            .with_api_key(self.api_key.as_deref()))
    }

    pub fn search_request(&self, q: &SearchQuery) -> Result<RequestSpec, GatewayError> {
        let term = require_text("search term", &q.term)?;
        let source_key = require_text("source key", &q.source_key)?;
        let limit = resolve_limit(q.limit, self.default_limit)?;
        Ok(RequestSpec::get("/search")
            .param("search_string", term)
            .param("source_key", source_key)
            .param("lang", self.language(q.language.as_deref()))
            .param("limit", limit)
            .with_api_key(self.api_key.as_deref()))
    }

    pub fn article_request(&self, source_key: &str, guid: &str) -> Result<RequestSpec, GatewayError> {
        let source_key = require_text("source key", source_key)?;
        let guid = require_text("guid", guid)?;
        Ok(RequestSpec::get("/article/get")
            .param("source_key", source_key)
            .param("guid", guid)
            .with_api_key(self.api_key.as_deref()))
    }

    pub fn coin_request(
        &self,
        symbol: &str,
        q: &LatestQuery,
    ) -> Result<RequestSpec, GatewayError> {
        let symbol = require_text("coin symbol", symbol)?;
        if !symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
            return Err(GatewayError::bad_request(format!(
                "coin symbol must be alphanumeric, got '{symbol}'"
            )));
        }
        let limit = resolve_limit(q.limit, self.default_limit)?;
        Ok(RequestSpec::get("/article/list")
            .param("categories", coins::normalize_symbol(&symbol))
            .param("lang", self.language(q.language.as_deref()))
            .param("limit", limit)
            .with_api_key(self.api_key.as_deref()))
    }

    // ---- operations ----

    pub async fn latest(&self, q: &LatestQuery) -> Result<Vec<NormalizedArticle>, GatewayError> {
        let spec = self.latest_request(q)?;
        let data = self.fetch_data("latest", &spec).await?;
        Ok(data.as_ref().map(normalize::normalize_articles).unwrap_or_default())
    }

    pub async fn search(&self, q: &SearchQuery) -> Result<Vec<NormalizedArticle>, GatewayError> {
        let spec = self.search_request(q)?;
        let data = self.fetch_data("search", &spec).await?;
        Ok(data.as_ref().map(normalize::normalize_articles).unwrap_or_default())
    }

    /// Single-article lookup. An upstream "not found" (HTTP 404 or an `Err`
    /// envelope typed 404) is a valid outcome and comes back as `Ok(None)`;
    /// every other failure propagates.
    pub async fn article(
        &self,
        source_key: &str,
        guid: &str,
    ) -> Result<Option<NormalizedArticle>, GatewayError> {
        let spec = self.article_request(source_key, guid)?;
        let Some(envelope) = self
            .upstream
            .lookup_json::<types::Envelope>("article", &spec, NEWS_TIMEOUT)
            .await?
        else {
            return Ok(None);
        };
        let missing = envelope.data.as_ref().map_or(true, types::is_blank);
        if missing && envelope.err.as_ref().and_then(|e| e.status_hint()) == Some(404) {
            tracing::debug!(target: "gateway", gateway = GATEWAY, op = "article", "article not found");
            return Ok(None);
        }
        let data = self.unwrap_envelope("article", envelope)?;
        Ok(data.as_ref().and_then(normalize::normalize_single))
    }

    pub async fn categories(&self) -> Result<Vec<NewsCategory>, GatewayError> {
        let spec = RequestSpec::get("/category/list").with_api_key(self.api_key.as_deref());
        let data = self.fetch_data("categories", &spec).await?;
        Ok(data.as_ref().map(normalize::normalize_categories).unwrap_or_default())
    }

    /// Latest articles tagged with one coin (`bitcoin` and `BTC` are equivalent).
    pub async fn by_coin(
        &self,
        symbol: &str,
        q: &LatestQuery,
    ) -> Result<Vec<NormalizedArticle>, GatewayError> {
        let spec = self.coin_request(symbol, q)?;
        let data = self.fetch_data("coin", &spec).await?;
        Ok(data.as_ref().map(normalize::normalize_articles).unwrap_or_default())
    }

    fn language(&self, requested: Option<&str>) -> String {
        resolve_language(requested, &self.default_language)
    }

    async fn fetch_data(
        &self,
        op: &'static str,
        spec: &RequestSpec,
    ) -> Result<Option<Value>, GatewayError> {
        let envelope: types::Envelope = self.upstream.call_json(op, spec, NEWS_TIMEOUT).await?;
        self.unwrap_envelope(op, envelope)
    }

    /// A populated `Err` fails the call unless `Data` carries content; the
    /// provider pairs its error records with `Data: {}` or `Data: []`.
    /// Blank `Data` without an error is `Ok(None)`.
    fn unwrap_envelope(
        &self,
        op: &'static str,
        envelope: types::Envelope,
    ) -> Result<Option<Value>, GatewayError> {
        let data = envelope.data.filter(|d| !types::is_blank(d));
        match (data, envelope.err) {
            (Some(data), _) => Ok(Some(data)),
            (None, Some(err)) if !err.is_empty() => {
                let status = err.status_hint();
                let code = status.is_none().then_some(TransportCode::InvalidBody);
                Err(GatewayError::from_failure(
                    GATEWAY,
                    op,
                    status,
                    code,
                    err.message
                        .unwrap_or_else(|| "upstream reported an error".to_string()),
                ))
            }
            (None, _) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{ErrorKind, ScriptedTransport};

    fn gateway(t: ScriptedTransport, key: Option<&str>) -> NewsGateway {
        let cfg = NewsConfig {
            api_key: key.map(str::to_string),
            ..NewsConfig::default()
        };
        NewsGateway::new(&cfg, Arc::new(t))
    }

    #[test]
    fn latest_request_clamps_limit() {
        let g = gateway(ScriptedTransport::new(), Some("k"));
        let spec = g
            .latest_request(&LatestQuery {
                limit: Some(1000),
                language: Some("en".into()),
            })
            .unwrap();
        assert_eq!(spec.path, "/article/list");
        assert_eq!(spec.query["limit"], "100");
        assert_eq!(spec.query["lang"], "EN");
        assert_eq!(spec.auth_header.as_deref(), Some("Apikey k"));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let g = gateway(ScriptedTransport::new(), Some("   "));
        assert!(!g.has_api_key());
        let spec = g.latest_request(&LatestQuery::default()).unwrap();
        assert!(spec.auth_header.is_none());
    }

    #[test]
    fn coin_request_canonicalizes_aliases() {
        let g = gateway(ScriptedTransport::new(), None);
        let spec = g.coin_request("bitcoin", &LatestQuery::default()).unwrap();
        assert_eq!(spec.query["categories"], "BTC");

        let err = g.coin_request("btc/../x", &LatestQuery::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn err_envelope_with_status_type_is_classified() {
        let t = ScriptedTransport::new()
            .respond(200, r#"{"Err": {"type": 429, "message": "rate limit"}}"#);
        let err = gateway(t, None)
            .latest(&LatestQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn err_envelope_without_status_is_bad_response() {
        let t = ScriptedTransport::new()
            .respond(200, r#"{"Err": {"type": 2, "message": "bad param"}}"#);
        let err = gateway(t, None).categories().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadUpstreamResponse);
    }

    #[tokio::test]
    async fn null_data_lookup_is_absent() {
        let t = ScriptedTransport::new().respond(200, r#"{"Data": null, "Err": {}}"#);
        let got = gateway(t, None).article("coindesk", "g-1").await.unwrap();
        assert!(got.is_none());
    }
}
