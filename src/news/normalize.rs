// src/news/normalize.rs
//! Response Normalizer: raw provider payloads → stable DTOs.
//! Never fails; missing or malformed fields fall back to documented defaults.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::coins::related_coins;
use super::types::{NewsCategory, NormalizedArticle, RawArticle, RawCategory};

pub const DEFAULT_SENTIMENT: &str = "NEUTRAL";

/// Normalize a payload that should be an array of article records.
/// Anything else yields an empty list (logged, not raised).
pub fn normalize_articles(data: &Value) -> Vec<NormalizedArticle> {
    let now = Utc::now();
    let Some(items) = data.as_array() else {
        tracing::warn!(target: "normalize", kind = json_kind(data), "expected an article array");
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match RawArticle::deserialize_value(item) {
            Some(raw) => Some(normalize_article_at(raw, now)),
            None => {
                tracing::warn!(target: "normalize", index = i, kind = json_kind(item), "skipping non-record article entry");
                None
            }
        })
        .collect()
}

/// Normalize a single-record payload (article lookup).
pub fn normalize_single(data: &Value) -> Option<NormalizedArticle> {
    match RawArticle::deserialize_value(data) {
        Some(raw) => Some(normalize_article(raw)),
        None => {
            tracing::warn!(target: "normalize", kind = json_kind(data), "expected an article record");
            None
        }
    }
}

pub fn normalize_article(raw: RawArticle) -> NormalizedArticle {
    normalize_article_at(raw, Utc::now())
}

/// `now` stands in for a missing or unrepresentable publish time.
pub fn normalize_article_at(raw: RawArticle, now: DateTime<Utc>) -> NormalizedArticle {
    let source = raw.source_data.unwrap_or_default();

    let categories: Vec<String> = raw
        .category_data
        .into_iter()
        .filter_map(|c| c.name)
        .collect();
    let keywords = parse_keywords(raw.keywords.as_deref().unwrap_or_default());
    let related = related_coins(
        categories
            .iter()
            .chain(keywords.iter())
            .map(String::as_str),
    );

    let sentiment = raw
        .sentiment
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SENTIMENT.to_string());

    NormalizedArticle {
        id: raw.id.unwrap_or_default(),
        guid: raw.guid.unwrap_or_default(),
        title: raw.title.unwrap_or_default(),
        subtitle: raw.subtitle,
        body: raw.body.unwrap_or_default(),
        url: raw.url.unwrap_or_default(),
        image_url: raw.image_url,
        authors: raw.authors.unwrap_or_default(),
        source: source.name.unwrap_or_default(),
        source_key: source.source_key.unwrap_or_default(),
        source_image_url: source.image_url,
        categories,
        keywords,
        sentiment,
        published_at: published_at(raw.published_on, now),
        related_coins: related,
    }
}

/// `"BTC| Cryptocurrency ||Market"` → `["BTC", "Cryptocurrency", "Market"]`
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Upstream epochs are seconds; convert to milliseconds before building the timestamp.
pub fn published_at(epoch_secs: Option<i64>, now: DateTime<Utc>) -> DateTime<Utc> {
    epoch_secs
        .and_then(|s| s.checked_mul(1000))
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or(now)
}

/// Normalize `/category/list`. Entries without a name are dropped.
pub fn normalize_categories(data: &Value) -> Vec<NewsCategory> {
    let Some(items) = data.as_array() else {
        tracing::warn!(target: "normalize", kind = json_kind(data), "expected a category array");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|v| serde_json::from_value::<RawCategory>(v.clone()).ok())
        .filter_map(|c| {
            let name = c.name.or(c.category)?;
            Some(NewsCategory {
                id: c.id.unwrap_or_default(),
                name,
            })
        })
        .collect()
}

impl RawArticle {
    fn deserialize_value(v: &Value) -> Option<Self> {
        if !v.is_object() {
            return None;
        }
        serde_json::from_value(v.clone()).ok()
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn keywords_are_split_trimmed_and_filtered() {
        assert_eq!(
            parse_keywords("BTC|Cryptocurrency|Market"),
            vec!["BTC", "Cryptocurrency", "Market"]
        );
        assert_eq!(parse_keywords(" a || b |"), vec!["a", "b"]);
        assert!(parse_keywords("").is_empty());
    }

    #[test]
    fn missing_fields_get_defaults() {
        let a = normalize_article_at(RawArticle::default(), fixed_now());
        assert_eq!(a.id, "");
        assert!(a.is_degraded());
        assert_eq!(a.sentiment, "NEUTRAL");
        assert!(a.subtitle.is_none());
        assert!(a.image_url.is_none());
        assert!(a.source_image_url.is_none());
        assert!(a.categories.is_empty());
        assert!(a.keywords.is_empty());
        assert!(a.related_coins.is_empty());
        assert_eq!(a.published_at, fixed_now());
    }

    #[test]
    fn epoch_seconds_become_millis() {
        let ts = published_at(Some(1_706_184_000), fixed_now());
        assert_eq!(ts.timestamp_millis(), 1_706_184_000_000);
        // Out of range falls back to now.
        assert_eq!(published_at(Some(i64::MAX), fixed_now()), fixed_now());
    }

    #[test]
    fn related_coins_come_from_categories_and_keywords() {
        let raw: RawArticle = serde_json::from_value(json!({
            "ID": 1,
            "KEYWORDS": "bitcoin|ETF",
            "CATEGORY_DATA": [{"NAME": "ETH"}, {"NAME": "Regulation"}]
        }))
        .unwrap();
        let a = normalize_article_at(raw, fixed_now());
        assert_eq!(a.categories, vec!["ETH", "Regulation"]);
        assert!(a.related_coins.contains("BTC"));
        assert!(a.related_coins.contains("ETH"));
        assert_eq!(a.related_coins.len(), 2);
    }

    #[test]
    fn non_array_payload_is_empty() {
        assert!(normalize_articles(&json!({"not": "a list"})).is_empty());
        assert!(normalize_articles(&Value::Null).is_empty());
        assert!(normalize_categories(&json!("nope")).is_empty());
    }

    #[test]
    fn non_record_entries_are_skipped() {
        let out = normalize_articles(&json!([{"ID": 5, "TITLE": "ok"}, "junk", 3]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "5");
    }

    #[test]
    fn categories_fall_back_to_category_field() {
        let out = normalize_categories(&json!([
            {"ID": 1, "NAME": "BTC"},
            {"ID": 2, "CATEGORY": "ETH"},
            {"ID": 3}
        ]));
        assert_eq!(out.len(), 2);
        assert_eq!(out[1], NewsCategory { id: "2".into(), name: "ETH".into() });
    }
}
