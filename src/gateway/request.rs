// src/gateway/request.rs
//! Request Builder: turns typed per-call options into an outbound [`RequestSpec`].
//! Owns no state; all validation happens here, before any network call.

use std::collections::BTreeMap;

use reqwest::Method;
use serde_json::Value;

use super::error::GatewayError;

/// Upper bound for any `limit` sent to an upstream.
pub const MAX_LIMIT: i64 = 100;

/// Immutable description of one outbound call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub auth_header: Option<String>,
    pub body: Option<Value>,
}

impl RequestSpec {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: BTreeMap::new(),
            auth_header: None,
            body: None,
        }
    }

    pub fn post_json(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: BTreeMap::new(),
            auth_header: None,
            body: Some(body),
        }
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }

    /// Attach `Authorization: Apikey <key>` when a key is configured.
    pub fn with_api_key(mut self, api_key: Option<&str>) -> Self {
        self.auth_header = api_key.map(api_key_header);
        self
    }

    /// Full URL without the query string.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path)
    }
}

pub fn api_key_header(key: &str) -> String {
    format!("Apikey {key}")
}

/// Resolve an optional caller limit: default when absent, reject non-positive,
/// clamp to [`MAX_LIMIT`].
pub fn resolve_limit(limit: Option<i64>, default: i64) -> Result<i64, GatewayError> {
    match limit {
        None => Ok(default.clamp(1, MAX_LIMIT)),
        Some(n) if n <= 0 => Err(GatewayError::bad_request(format!(
            "limit must be positive, got {n}"
        ))),
        Some(n) => Ok(n.min(MAX_LIMIT)),
    }
}

/// Trimmed, non-empty text or a `BadRequest` naming the field.
pub fn require_text(field: &str, value: &str) -> Result<String, GatewayError> {
    let t = value.trim();
    if t.is_empty() {
        return Err(GatewayError::bad_request(format!("{field} must not be empty")));
    }
    Ok(t.to_string())
}

/// Upper-cased language code, falling back to `default` when blank.
pub fn resolve_language(language: Option<&str>, default: &str) -> String {
    language
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(default)
        .to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::error::ErrorKind;

    #[test]
    fn limit_is_clamped_and_validated() {
        assert_eq!(resolve_limit(Some(250), 20).unwrap(), 100);
        assert_eq!(resolve_limit(Some(100), 20).unwrap(), 100);
        assert_eq!(resolve_limit(Some(7), 20).unwrap(), 7);
        assert_eq!(resolve_limit(None, 20).unwrap(), 20);
        assert_eq!(resolve_limit(None, 500).unwrap(), 100);

        let err = resolve_limit(Some(0), 20).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadRequest);
        assert!(resolve_limit(Some(-5), 20).is_err());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert_eq!(require_text("q", "  btc ").unwrap(), "btc");
        let err = require_text("q", " \t ").unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadRequest);
        assert!(err.message.contains("q"));
    }

    #[test]
    fn api_key_header_uses_apikey_scheme() {
        let spec = RequestSpec::get("/article/list").with_api_key(Some("abc"));
        assert_eq!(spec.auth_header.as_deref(), Some("Apikey abc"));
        let anon = RequestSpec::get("/article/list").with_api_key(None);
        assert!(anon.auth_header.is_none());
    }

    #[test]
    fn url_joins_without_double_slash() {
        let spec = RequestSpec::get("/search");
        assert_eq!(spec.url("https://x.test/news/v1/"), "https://x.test/news/v1/search");
        assert_eq!(spec.url("https://x.test/news/v1"), "https://x.test/news/v1/search");
    }

    #[test]
    fn language_defaults_and_uppercases() {
        assert_eq!(resolve_language(None, "EN"), "EN");
        assert_eq!(resolve_language(Some(" "), "EN"), "EN");
        assert_eq!(resolve_language(Some("es"), "EN"), "ES");
    }
}
