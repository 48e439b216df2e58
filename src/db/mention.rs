use sqlx::Row;
use std::collections::HashSet;
use tracing::{debug, instrument};

use super::core::{with_lock_retry, Database};
use crate::models::{Mention, MentionAggregate};
use crate::TARGET_DB;

impl Database {
    /// Insert or overwrite a mention, keyed by its content-derived id.
    #[instrument(target = "db", level = "info", skip(self, mention))]
    pub async fn upsert_mention(&self, mention: &Mention) -> Result<(), sqlx::Error> {
        let date_ms = mention.date.timestamp_millis();
        debug!(target: TARGET_DB, "Adding/updating mention: {}", mention.id);

        with_lock_retry("upsert mention", move || async move {
            sqlx::query(
                r#"
                INSERT INTO mentions (id, text, count, sentiment, date, article_id)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    text = excluded.text,
                    count = excluded.count,
                    sentiment = excluded.sentiment,
                    date = excluded.date,
                    article_id = excluded.article_id
                "#,
            )
            .bind(&mention.id)
            .bind(&mention.text)
            .bind(mention.count)
            .bind(mention.sentiment)
            .bind(date_ms)
            .bind(&mention.article_id)
            .execute(self.pool())
            .await
            .map(|_| ())
        })
        .await
    }

    /// Ranked mention statistics over the half-open window `[start, end)`,
    /// grouped by lowercased entity text. The average sentiment is the
    /// unweighted mean across grouped mentions.
    pub async fn aggregate_mentions(
        &self,
        start_ms: i64,
        end_ms: i64,
        limit: i64,
    ) -> Result<Vec<MentionAggregate>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT LOWER(text) AS entity_key,
                   SUM(count) AS total_count,
                   AVG(sentiment) AS average_sentiment
            FROM mentions
            WHERE date >= ?1 AND date < ?2
            GROUP BY LOWER(text)
            ORDER BY total_count DESC
            LIMIT ?3
            "#,
        )
        .bind(start_ms)
        .bind(end_ms)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| MentionAggregate {
                entity_key: row.get("entity_key"),
                total_count: row.get("total_count"),
                average_sentiment: row.get("average_sentiment"),
            })
            .collect())
    }

    /// Distinct ids of articles mentioning the entity within the window.
    /// The match is case-insensitive and anchored to the whole text.
    pub async fn article_ids_for_entity(
        &self,
        entity_text: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<HashSet<String>, sqlx::Error> {
        let rows = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT article_id
            FROM mentions
            WHERE LOWER(text) = LOWER(?1)
              AND date >= ?2 AND date < ?3
            "#,
        )
        .bind(entity_text)
        .bind(start_ms)
        .bind(end_ms)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Delete mentions dated strictly before the cutoff. Returns the number
    /// of rows removed.
    pub async fn delete_mentions_older_than(&self, cutoff_ms: i64) -> Result<u64, sqlx::Error> {
        let result = with_lock_retry("delete old mentions", move || async move {
            sqlx::query("DELETE FROM mentions WHERE date < ?1")
                .bind(cutoff_ms)
                .execute(self.pool())
                .await
        })
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete mentions whose text is too short to carry signal. Corrective
    /// sweep for rows stored before the ingestion-side filter existed.
    pub async fn delete_degenerate_mentions(&self) -> Result<u64, sqlx::Error> {
        let result = with_lock_retry("delete degenerate mentions", move || async move {
            sqlx::query("DELETE FROM mentions WHERE LENGTH(text) <= 1")
                .execute(self.pool())
                .await
        })
        .await?;

        Ok(result.rows_affected())
    }
}
