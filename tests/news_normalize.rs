// tests/news_normalize.rs
use crypto_news_gateway::news::normalize::{normalize_article, normalize_articles};
use crypto_news_gateway::news::types::RawArticle;
use serde_json::{json, Value};

fn fixture() -> Value {
    let raw = std::fs::read_to_string("tests/fixtures/article_list.json")
        .expect("missing tests/fixtures/article_list.json");
    serde_json::from_str(&raw).expect("fixture is valid json")
}

#[test]
fn keywords_split_and_btc_is_related() {
    let raw: RawArticle = serde_json::from_value(json!({
        "ID": 1,
        "KEYWORDS": "BTC|Cryptocurrency|Market"
    }))
    .unwrap();
    let a = normalize_article(raw);
    assert_eq!(a.keywords, vec!["BTC", "Cryptocurrency", "Market"]);
    assert!(a.related_coins.contains("BTC"));
}

#[test]
fn published_on_seconds_serialize_as_iso_millis() {
    let raw: RawArticle =
        serde_json::from_value(json!({ "ID": 1, "PUBLISHED_ON": 1706184000 })).unwrap();
    let a = normalize_article(raw);
    let v = serde_json::to_value(&a).unwrap();
    assert_eq!(v["publishedAt"], "2024-01-25T12:00:00.000Z");
}

#[test]
fn missing_sentiment_is_neutral() {
    let raw: RawArticle = serde_json::from_value(json!({ "ID": 1, "TITLE": "x" })).unwrap();
    assert_eq!(normalize_article(raw).sentiment, "NEUTRAL");
}

#[test]
fn non_array_payload_yields_empty() {
    assert!(normalize_articles(&json!({"ID": 1})).is_empty());
    assert!(normalize_articles(&json!("oops")).is_empty());
    assert!(normalize_articles(&json!(42)).is_empty());
}

#[test]
fn fixture_records_normalize_across_casings() {
    let data = fixture()["Data"].clone();
    let items = normalize_articles(&data);
    assert_eq!(items.len(), 3);

    let first = &items[0];
    assert_eq!(first.id, "39412345");
    assert_eq!(first.source, "CoinDesk");
    assert_eq!(first.source_key, "coindesk");
    assert_eq!(
        first.source_image_url.as_deref(),
        Some("https://images.example.com/coindesk.png")
    );
    assert_eq!(first.categories, vec!["BTC", "MARKET"]);
    assert_eq!(first.sentiment, "POSITIVE");
    assert!(first.subtitle.is_none());

    let second = &items[1];
    assert_eq!(second.id, "39412346");
    assert_eq!(second.source_key, "theblock");
    assert_eq!(second.keywords, vec!["Ethereum", "Upgrade"]);
    assert_eq!(second.related_coins.len(), 1);
    assert!(second.related_coins.contains("ETH"));

    let third = &items[2];
    assert!(third.is_degraded());
    assert_eq!(third.sentiment, "NEUTRAL");
    assert_eq!(third.source, "");
}

#[test]
fn serialized_shape_is_camel_case() {
    let data = fixture()["Data"].clone();
    let items = normalize_articles(&data);
    let v = serde_json::to_value(&items[0]).unwrap();
    for key in [
        "id",
        "guid",
        "title",
        "subtitle",
        "body",
        "url",
        "imageUrl",
        "authors",
        "source",
        "sourceKey",
        "sourceImageUrl",
        "categories",
        "keywords",
        "sentiment",
        "publishedAt",
        "relatedCoins",
    ] {
        assert!(v.get(key).is_some(), "missing '{key}' in {v}");
    }
    assert_eq!(v["relatedCoins"], json!(["BTC"]));
}
