use anyhow::{Context, Result};
use std::collections::HashSet;

use crate::db::Database;
use crate::models::{Article, DateRange, MentionAggregate};

/// Groups returned per aggregation when the caller does not say otherwise.
pub const DEFAULT_AGGREGATE_LIMIT: i64 = 100;

// Far-future sentinel for open-ended windows.
const WINDOW_END_SENTINEL_MS: i64 = i64::MAX;

fn window(start_ms: Option<i64>, end_ms: Option<i64>) -> (i64, i64) {
    (
        start_ms.unwrap_or(0),
        end_ms.unwrap_or(WINDOW_END_SENTINEL_MS),
    )
}

/// Ranked mention statistics over the half-open window `[start, end)`,
/// grouped case-insensitively by entity text and sorted by descending
/// total count. An empty window yields an empty list.
pub async fn aggregate_mentions(
    db: &Database,
    start_ms: Option<i64>,
    end_ms: Option<i64>,
    limit: Option<i64>,
) -> Result<Vec<MentionAggregate>> {
    let (start, end) = window(start_ms, end_ms);
    let limit = limit.unwrap_or(DEFAULT_AGGREGATE_LIMIT);

    db.aggregate_mentions(start, end, limit)
        .await
        .context("Failed to aggregate mentions")
}

/// Distinct ids of articles mentioning the entity within the window.
/// An entity with no matching mentions yields an empty set.
pub async fn article_ids_for_entity(
    db: &Database,
    entity_text: &str,
    start_ms: Option<i64>,
    end_ms: Option<i64>,
) -> Result<HashSet<String>> {
    let (start, end) = window(start_ms, end_ms);

    db.article_ids_for_entity(entity_text, start, end)
        .await
        .with_context(|| format!("Failed to look up article ids for '{}'", entity_text))
}

/// Full article records mentioning the entity within the window, newest
/// first. An empty id set short-circuits without touching the article
/// collection.
pub async fn articles_for_entity(
    db: &Database,
    entity_text: &str,
    start_ms: Option<i64>,
    end_ms: Option<i64>,
) -> Result<Vec<Article>> {
    let ids = article_ids_for_entity(db, entity_text, start_ms, end_ms).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    db.get_articles_by_ids(&ids)
        .await
        .with_context(|| format!("Failed to resolve articles for '{}'", entity_text))
}

/// Publication-date bounds over all stored articles; both `None` when the
/// store is empty.
pub async fn min_and_max_dates(db: &Database) -> Result<DateRange> {
    db.get_min_and_max_dates()
        .await
        .context("Failed to read article date bounds")
}
