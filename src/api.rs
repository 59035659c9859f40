// src/api.rs
//! Local HTTP surface over the news and sentiment gateways.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::gateway::GatewayError;
use crate::news::{LatestQuery, NewsCategory, NewsGateway, NewsResponse, NormalizedArticle, SearchQuery};
use crate::sentiment::{SentimentGateway, SentimentScore};

#[derive(Clone)]
pub struct AppState {
    pub news: Arc<NewsGateway>,
    pub sentiment: Arc<SentimentGateway>,
}

impl AppState {
    pub fn new(news: NewsGateway, sentiment: SentimentGateway) -> Self {
        Self {
            news: Arc::new(news),
            sentiment: Arc::new(sentiment),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/news", get(latest_news))
        .route("/news/search", get(search_news))
        .route("/news/categories", get(news_categories))
        .route("/news/article", get(news_article))
        .route("/news/coin/{symbol}", get(coin_news))
        .route("/sentiment/analyze", post(analyze_sentiment))
        .route("/sentiment/health", get(sentiment_health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// ------------------------------------------------------------
// Error boundary
// ------------------------------------------------------------

/// Gateway error rendered as `{error, message, upstreamStatus?}` with the
/// kind's stable status code.
pub struct ApiError(pub GatewayError);

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        Self(e)
    }
}

// Malformed query strings and bodies are caller errors like any other
// validation failure: 400 with the usual error body.
impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self {
        Self(GatewayError::bad_request(r.body_text()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        Self(GatewayError::bad_request(r.body_text()))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    error: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_status: Option<u16>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.kind.http_status())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let body = ErrorBody {
            error: self.0.kind.as_str(),
            message: &self.0.message,
            upstream_status: self.0.upstream_status,
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ------------------------------------------------------------
// News
// ------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct LatestParams {
    limit: Option<i64>,
    lang: Option<String>,
}

impl From<LatestParams> for LatestQuery {
    fn from(p: LatestParams) -> Self {
        LatestQuery {
            limit: p.limit,
            language: p.lang,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    #[serde(default)]
    source: String,
    limit: Option<i64>,
    lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ArticleParams {
    #[serde(default)]
    source_key: String,
    #[serde(default)]
    guid: String,
}

async fn latest_news(
    State(state): State<AppState>,
    params: Result<Query<LatestParams>, QueryRejection>,
) -> ApiResult<NewsResponse<NormalizedArticle>> {
    let Query(p) = params?;
    let items = state.news.latest(&p.into()).await?;
    Ok(Json(NewsResponse::new(items)))
}

async fn search_news(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<NewsResponse<NormalizedArticle>> {
    let Query(p) = params?;
    let q = SearchQuery {
        term: p.q,
        source_key: p.source,
        limit: p.limit,
        language: p.lang,
    };
    let items = state.news.search(&q).await?;
    Ok(Json(NewsResponse::new(items)))
}

async fn news_categories(State(state): State<AppState>) -> ApiResult<NewsResponse<NewsCategory>> {
    let items = state.news.categories().await?;
    Ok(Json(NewsResponse::new(items)))
}

async fn news_article(
    State(state): State<AppState>,
    params: Result<Query<ArticleParams>, QueryRejection>,
) -> ApiResult<NewsResponse<NormalizedArticle>> {
    let Query(p) = params?;
    let found = state.news.article(&p.source_key, &p.guid).await?;
    Ok(Json(NewsResponse::new(found.into_iter().collect())))
}

async fn coin_news(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    params: Result<Query<LatestParams>, QueryRejection>,
) -> ApiResult<NewsResponse<NormalizedArticle>> {
    let Query(p) = params?;
    let items = state.news.by_coin(&symbol, &p.into()).await?;
    Ok(Json(NewsResponse::new(items)))
}

// ------------------------------------------------------------
// Sentiment
// ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AnalyzeReq {
    #[serde(default)]
    text: String,
}

async fn analyze_sentiment(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeReq>, JsonRejection>,
) -> ApiResult<SentimentScore> {
    let Json(body) = body?;
    let score = state.sentiment.analyze(&body.text).await?;
    Ok(Json(score))
}

async fn sentiment_health(State(state): State<AppState>) -> Response {
    match state.sentiment.health().await {
        Ok(h) => Json(json!({ "status": "up", "upstream": h })).into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "down", "error": e.kind, "message": e.message })),
        )
            .into_response(),
    }
}
