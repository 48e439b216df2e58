use chrono::DateTime;
use sqlx::Row;
use std::collections::HashSet;
use tracing::{debug, instrument};

use super::core::{with_lock_retry, Database};
use crate::models::{Article, DateRange};
use crate::TARGET_DB;

impl Database {
    /// Insert or overwrite an article, keyed by its source-supplied id.
    #[instrument(target = "db", level = "info", skip(self, article))]
    pub async fn upsert_article(&self, article: &Article) -> Result<(), sqlx::Error> {
        let date_ms = article.date.timestamp_millis();
        debug!(target: TARGET_DB, "Adding/updating article: {}", article.id);

        with_lock_retry("upsert article", move || async move {
            sqlx::query(
                r#"
                INSERT INTO articles (id, title, date, url)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    date = excluded.date,
                    url = excluded.url
                "#,
            )
            .bind(&article.id)
            .bind(&article.title)
            .bind(date_ms)
            .bind(&article.url)
            .execute(self.pool())
            .await
            .map(|_| ())
        })
        .await
    }

    /// Resolve a set of article ids to full records, newest first.
    pub async fn get_articles_by_ids(
        &self,
        ids: &HashSet<String>,
    ) -> Result<Vec<Article>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let query = format!(
            "SELECT id, title, date, url
             FROM articles
             WHERE id IN ({})
             ORDER BY date DESC",
            placeholders
        );

        let mut query_builder = sqlx::query(&query);
        for id in ids {
            query_builder = query_builder.bind(id);
        }

        let rows = query_builder.fetch_all(self.pool()).await?;

        rows.into_iter()
            .map(|row| {
                let date_ms: i64 = row.get("date");
                let date = DateTime::from_timestamp_millis(date_ms).ok_or_else(|| {
                    sqlx::Error::Protocol(format!("Invalid stored article date: {}", date_ms))
                })?;
                Ok(Article {
                    id: row.get("id"),
                    title: row.get("title"),
                    date,
                    url: row.get("url"),
                })
            })
            .collect()
    }

    /// Publication-date bounds over all stored articles.
    pub async fn get_min_and_max_dates(&self) -> Result<DateRange, sqlx::Error> {
        let (min_ms, max_ms) = sqlx::query_as::<_, (Option<i64>, Option<i64>)>(
            "SELECT MIN(date), MAX(date) FROM articles",
        )
        .fetch_one(self.pool())
        .await?;

        Ok(DateRange {
            min: min_ms.and_then(DateTime::from_timestamp_millis),
            max: max_ms.and_then(DateTime::from_timestamp_millis),
        })
    }

    /// Delete articles dated strictly before the cutoff. Returns the number
    /// of rows removed.
    pub async fn delete_articles_older_than(&self, cutoff_ms: i64) -> Result<u64, sqlx::Error> {
        let result = with_lock_retry("delete old articles", move || async move {
            sqlx::query("DELETE FROM articles WHERE date < ?1")
                .bind(cutoff_ms)
                .execute(self.pool())
                .await
        })
        .await?;

        Ok(result.rows_affected())
    }
}
