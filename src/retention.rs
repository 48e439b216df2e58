use chrono::{Duration, NaiveTime, Utc};
use tracing::{error, info};

use crate::db::Database;

// Module-level constant
pub const TARGET_RETENTION: &str = "retention";

/// Rolling age window applied when the caller does not say otherwise.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Cutoff anchored to the start of the current UTC day, not the current
/// instant: every sweep run on the same day computes the same cutoff.
fn cutoff_millis(threshold_days: i64) -> i64 {
    let start_of_day = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
    (start_of_day - Duration::days(threshold_days)).timestamp_millis()
}

/// Removes all articles and mentions dated strictly before
/// `startOfToday - threshold_days`.
///
/// The two collections are swept independently under the same cutoff, with
/// no cross-collection transaction. Failures are logged and absorbed here;
/// the next scheduled sweep picks up whatever this one missed.
pub async fn prune_older_than(db: &Database, threshold_days: Option<i64>) {
    let days = threshold_days.unwrap_or(DEFAULT_RETENTION_DAYS);
    let cutoff = cutoff_millis(days);

    match db.delete_mentions_older_than(cutoff).await {
        Ok(removed) => {
            info!(
                target: TARGET_RETENTION,
                "Removed {} mentions older than {} days", removed, days
            );
        }
        Err(e) => {
            error!(target: TARGET_RETENTION, "Failed to prune mentions: {}", e);
        }
    }

    match db.delete_articles_older_than(cutoff).await {
        Ok(removed) => {
            info!(
                target: TARGET_RETENTION,
                "Removed {} articles older than {} days", removed, days
            );
        }
        Err(e) => {
            error!(target: TARGET_RETENTION, "Failed to prune articles: {}", e);
        }
    }
}

/// Removes mentions whose entity text is a single character or empty.
/// Ingestion filters these out; the sweep clears rows that predate the
/// filter.
pub async fn prune_degenerate_mentions(db: &Database) {
    match db.delete_degenerate_mentions().await {
        Ok(removed) => {
            info!(
                target: TARGET_RETENTION,
                "Removed {} degenerate mentions", removed
            );
        }
        Err(e) => {
            error!(
                target: TARGET_RETENTION,
                "Failed to prune degenerate mentions: {}", e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{mention_id, Article, Mention};
    use chrono::{DateTime, Utc};

    fn article(id: &str, date: DateTime<Utc>) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Article {}", id),
            date,
            url: format!("https://news.example/{}", id),
        }
    }

    fn mention(text: &str, article_id: &str, date: DateTime<Utc>) -> Mention {
        Mention {
            id: mention_id(text, article_id),
            text: text.to_string(),
            count: 1,
            sentiment: 0.0,
            date,
            article_id: article_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_prune_removes_only_records_past_the_cutoff() {
        let db = Database::new_in_memory().await.unwrap();

        let stale = Utc::now() - Duration::days(31);
        let fresh = Utc::now() - Duration::days(29);

        db.upsert_article(&article("stale", stale)).await.unwrap();
        db.upsert_article(&article("fresh", fresh)).await.unwrap();
        db.upsert_mention(&mention("Tesla", "stale", stale)).await.unwrap();
        db.upsert_mention(&mention("Tesla", "fresh", fresh)).await.unwrap();

        prune_older_than(&db, Some(30)).await;

        let stats = db.collect_stats().await.unwrap();
        assert_eq!(stats.articles, 1);
        assert_eq!(stats.mentions, 1);

        let remaining = crate::query::articles_for_entity(&db, "tesla", None, None)
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "fresh");
    }

    #[tokio::test]
    async fn test_prune_default_threshold_is_thirty_days() {
        let db = Database::new_in_memory().await.unwrap();

        let stale = Utc::now() - Duration::days(31);
        db.upsert_mention(&mention("OPEC", "a1", stale)).await.unwrap();

        prune_older_than(&db, None).await;

        let stats = db.collect_stats().await.unwrap();
        assert_eq!(stats.mentions, 0);
    }

    #[tokio::test]
    async fn test_degenerate_sweep_removes_single_character_mentions() {
        let db = Database::new_in_memory().await.unwrap();
        let now = Utc::now();

        // A historical row that predates the ingestion-side filter.
        db.upsert_mention(&mention("x", "a1", now)).await.unwrap();
        db.upsert_mention(&mention("AI", "a1", now)).await.unwrap();

        prune_degenerate_mentions(&db).await;

        let stats = db.collect_stats().await.unwrap();
        assert_eq!(stats.mentions, 1);

        let groups = crate::query::aggregate_mentions(&db, None, None, None)
            .await
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].entity_key, "ai");
    }

    #[tokio::test]
    async fn test_degenerate_sweep_is_independent_of_age() {
        let db = Database::new_in_memory().await.unwrap();

        let old = Utc::now() - Duration::days(365);
        db.upsert_mention(&mention("Boeing", "a1", old)).await.unwrap();

        prune_degenerate_mentions(&db).await;

        // Age alone never qualifies a mention for the degenerate sweep.
        let stats = db.collect_stats().await.unwrap();
        assert_eq!(stats.mentions, 1);
    }
}
