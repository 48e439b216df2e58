use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One analyzed news article. The `id` comes from the source document and
/// is never generated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub url: String,
}

/// One entity occurrence within one article, with the occurrence count and
/// sentiment score reported for that article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub id: String,
    pub text: String,
    pub count: i64,
    pub sentiment: f64,
    pub date: DateTime<Utc>,
    pub article_id: String,
}

/// One ranked aggregation group: all in-window mentions sharing the same
/// lowercased entity text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionAggregate {
    pub entity_key: String,
    pub total_count: i64,
    pub average_sentiment: f64,
}

/// Publication-date bounds over all stored articles. Both ends are `None`
/// when the store is empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub min: Option<DateTime<Utc>>,
    pub max: Option<DateTime<Utc>>,
}

/// Builds the deterministic mention key for an (entity text, article) pair.
///
/// The ordering (entity text first, then article id) matches the ids
/// already in storage and must not change: re-ingesting the same pair has
/// to land on the same row.
pub fn mention_id(text: &str, article_id: &str) -> String {
    format!("{}{}", text, article_id)
}
