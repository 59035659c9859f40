// src/news/types.rs
//! Raw upstream shapes (loosely typed) and the stable DTOs handed to callers.
//!
//! Raw records accept mixed casing and mixed JSON types; every field is
//! optional. Only `news::normalize` turns them into the strongly typed DTOs.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

// ------------------------------------------------------------
// Upstream envelope
// ------------------------------------------------------------

/// `{Data: <array-or-record>, Err: <optional-error-record>}`
#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    #[serde(rename = "Data", alias = "data", default)]
    pub data: Option<Value>,
    #[serde(rename = "Err", alias = "err", default, deserialize_with = "lenient::record")]
    pub err: Option<UpstreamErr>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct UpstreamErr {
    #[serde(rename = "type", alias = "TYPE", alias = "code", default, deserialize_with = "lenient::int")]
    pub kind: Option<i64>,
    #[serde(alias = "MESSAGE", alias = "Message", default, deserialize_with = "lenient::text")]
    pub message: Option<String>,
}

impl UpstreamErr {
    /// The provider sends `Err: {}` on success.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.message.as_deref().map_or(true, |m| m.trim().is_empty())
    }

    /// The numeric `type`, when it looks like an HTTP status.
    pub fn status_hint(&self) -> Option<u16> {
        self.kind
            .filter(|k| (400..=599).contains(k))
            .and_then(|k| u16::try_from(k).ok())
    }
}

/// `null`, `{}` or `[]`: a `Data` slot with nothing in it.
pub fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Object(m) => m.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

// ------------------------------------------------------------
// Raw records
// ------------------------------------------------------------

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawArticle {
    #[serde(rename = "ID", alias = "id", alias = "Id", default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(rename = "GUID", alias = "guid", default, deserialize_with = "lenient::text")]
    pub guid: Option<String>,
    #[serde(rename = "TITLE", alias = "title", default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(rename = "SUBTITLE", alias = "subtitle", default, deserialize_with = "lenient::text")]
    pub subtitle: Option<String>,
    #[serde(rename = "BODY", alias = "body", default, deserialize_with = "lenient::text")]
    pub body: Option<String>,
    #[serde(rename = "URL", alias = "url", default, deserialize_with = "lenient::text")]
    pub url: Option<String>,
    #[serde(rename = "IMAGE_URL", alias = "imageurl", alias = "image_url", default, deserialize_with = "lenient::text")]
    pub image_url: Option<String>,
    #[serde(rename = "AUTHORS", alias = "authors", default, deserialize_with = "lenient::text")]
    pub authors: Option<String>,
    #[serde(rename = "SENTIMENT", alias = "sentiment", default, deserialize_with = "lenient::text")]
    pub sentiment: Option<String>,
    #[serde(rename = "KEYWORDS", alias = "keywords", alias = "tags", default, deserialize_with = "lenient::text")]
    pub keywords: Option<String>,
    #[serde(rename = "PUBLISHED_ON", alias = "published_on", default, deserialize_with = "lenient::int")]
    pub published_on: Option<i64>,
    #[serde(rename = "SOURCE_DATA", alias = "source_info", alias = "source_data", default, deserialize_with = "lenient::record")]
    pub source_data: Option<RawSource>,
    #[serde(rename = "CATEGORY_DATA", alias = "category_data", default, deserialize_with = "lenient::list")]
    pub category_data: Vec<RawCategory>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawSource {
    #[serde(rename = "NAME", alias = "name", default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(rename = "SOURCE_KEY", alias = "source_key", alias = "key", default, deserialize_with = "lenient::text")]
    pub source_key: Option<String>,
    #[serde(rename = "IMAGE_URL", alias = "img", alias = "image_url", default, deserialize_with = "lenient::text")]
    pub image_url: Option<String>,
}

/// Category record, both nested in articles and from `/category/list`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawCategory {
    #[serde(rename = "ID", alias = "id", default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(rename = "NAME", alias = "name", default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(rename = "CATEGORY", alias = "category", default, deserialize_with = "lenient::text")]
    pub category: Option<String>,
}

// ------------------------------------------------------------
// Normalized DTOs
// ------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedArticle {
    /// Empty when the upstream omitted its id (degraded record).
    pub id: String,
    pub guid: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub body: String,
    pub url: String,
    pub image_url: Option<String>,
    pub authors: String,
    pub source: String,
    pub source_key: String,
    pub source_image_url: Option<String>,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
    pub sentiment: String,
    /// Substituted with the fetch time when the upstream omits it.
    #[serde(serialize_with = "iso_millis")]
    pub published_at: DateTime<Utc>,
    pub related_coins: BTreeSet<String>,
}

impl NormalizedArticle {
    pub fn is_degraded(&self) -> bool {
        self.id.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsCategory {
    pub id: String,
    pub name: String,
}

/// Envelope returned by the local `/news*` routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse<T> {
    pub data: Vec<T>,
    pub count: usize,
    pub fetched_at: DateTime<Utc>,
}

impl<T> NewsResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
            fetched_at: Utc::now(),
        }
    }
}

/// `2024-01-25T12:00:00.000Z`
pub fn format_iso_millis(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn iso_millis<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_iso_millis(ts))
}

// ------------------------------------------------------------
// Lenient field decoders: accept whatever JSON arrives, keep what fits.
// ------------------------------------------------------------

pub(crate) mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        })
    }

    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            _ => None,
        })
    }

    pub fn record<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(v @ Value::Object(_)) => serde_json::from_value(v).ok(),
            _ => None,
        })
    }

    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect(),
            _ => Vec::new(),
        })
    }
}
