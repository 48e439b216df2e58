use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::models::{mention_id, Article, Mention};

// Entity text shorter than this is noise and never persists.
const MIN_ENTITY_TEXT_CHARS: usize = 2;

/// One analysis document as delivered by the text-enrichment service.
///
/// The nested layers are optional: a document that was never enriched
/// arrives with `source` or `source.enriched` missing, and adapts to
/// nothing rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentDocument {
    pub id: String,
    /// Publication time in seconds since the epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<DocumentSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enriched: Option<EnrichedContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedContent {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub entities: Vec<EntityOccurrence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityOccurrence {
    pub text: String,
    pub count: i64,
    pub sentiment: SentimentScore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentScore {
    pub score: f64,
}

impl EnrichmentDocument {
    /// Parses a raw enrichment document from its JSON wire form.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Converts one enrichment document into persistable records.
///
/// Returns `None` when the document has no enriched payload, when its
/// timestamp does not map to a valid instant, or when no valid entities
/// remain after filtering. An article is never stored without at least
/// one mention.
pub fn adapt(doc: &EnrichmentDocument) -> Option<(Article, Vec<Mention>)> {
    let enriched = doc.source.as_ref()?.enriched.as_ref()?;
    let date = DateTime::from_timestamp(doc.timestamp, 0)?;

    let mentions: Vec<Mention> = enriched
        .entities
        .iter()
        .filter(|entity| entity.text.chars().count() >= MIN_ENTITY_TEXT_CHARS)
        .map(|entity| Mention {
            id: mention_id(&entity.text, &doc.id),
            text: entity.text.clone(),
            count: entity.count,
            sentiment: entity.sentiment.score,
            date,
            article_id: doc.id.clone(),
        })
        .collect();

    if mentions.is_empty() {
        return None;
    }

    let article = Article {
        id: doc.id.clone(),
        title: enriched.title.clone(),
        date,
        url: enriched.url.clone(),
    };

    Some((article, mentions))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(id: &str, entities: Vec<EntityOccurrence>) -> EnrichmentDocument {
        EnrichmentDocument {
            id: id.to_string(),
            timestamp: 1_700_000_000,
            source: Some(DocumentSource {
                enriched: Some(EnrichedContent {
                    title: "Quarterly results".to_string(),
                    url: "https://news.example/quarterly-results".to_string(),
                    entities,
                }),
            }),
        }
    }

    fn entity(text: &str, count: i64, score: f64) -> EntityOccurrence {
        EntityOccurrence {
            text: text.to_string(),
            count,
            sentiment: SentimentScore { score },
        }
    }

    #[test]
    fn test_adapt_produces_article_and_mentions() {
        let doc = document("doc-1", vec![entity("Tesla", 3, 0.5), entity("Ford", 1, -0.2)]);
        let (article, mentions) = adapt(&doc).unwrap();

        assert_eq!(article.id, "doc-1");
        assert_eq!(article.title, "Quarterly results");
        assert_eq!(article.date.timestamp(), 1_700_000_000);
        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[0].id, "Tesladoc-1");
        assert_eq!(mentions[0].article_id, "doc-1");
        assert_eq!(mentions[0].date, article.date);
        assert_eq!(mentions[1].sentiment, -0.2);
    }

    #[test]
    fn test_adapt_rejects_document_without_enrichment() {
        let doc = EnrichmentDocument {
            id: "doc-2".to_string(),
            timestamp: 1_700_000_000,
            source: None,
        };
        assert!(adapt(&doc).is_none());

        let doc = EnrichmentDocument {
            id: "doc-3".to_string(),
            timestamp: 1_700_000_000,
            source: Some(DocumentSource { enriched: None }),
        };
        assert!(adapt(&doc).is_none());
    }

    #[test]
    fn test_adapt_filters_degenerate_entities() {
        let doc = document("doc-4", vec![entity("a", 10, 0.9), entity("", 2, 0.1), entity("AI", 4, 0.3)]);
        let (_, mentions) = adapt(&doc).unwrap();

        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].text, "AI");
    }

    #[test]
    fn test_adapt_rejects_document_with_only_degenerate_entities() {
        let doc = document("doc-5", vec![entity("x", 1, 0.0), entity("", 1, 0.0)]);
        assert!(adapt(&doc).is_none());
    }

    #[test]
    fn test_adapt_rejects_document_with_no_entities() {
        let doc = document("doc-6", vec![]);
        assert!(adapt(&doc).is_none());
    }

    #[test]
    fn test_from_json_wire_shape() {
        let raw = r#"{
            "id": "doc-7",
            "timestamp": 1700000000,
            "source": {
                "enriched": {
                    "title": "Rates held steady",
                    "url": "https://news.example/rates",
                    "entities": [
                        { "text": "Federal Reserve", "count": 5, "sentiment": { "score": -0.1 } }
                    ]
                }
            }
        }"#;
        let doc = EnrichmentDocument::from_json(raw).unwrap();
        let (article, mentions) = adapt(&doc).unwrap();

        assert_eq!(article.url, "https://news.example/rates");
        assert_eq!(mentions[0].id, "Federal Reservedoc-7");
        assert_eq!(mentions[0].count, 5);
    }

    #[test]
    fn test_from_json_tolerates_missing_source() {
        let raw = r#"{ "id": "doc-8", "timestamp": 1700000000 }"#;
        let doc = EnrichmentDocument::from_json(raw).unwrap();
        assert!(doc.source.is_none());
        assert!(adapt(&doc).is_none());
    }
}
