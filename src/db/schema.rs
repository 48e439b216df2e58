use tracing::info;

use super::core::Database;
use crate::TARGET_DB;

impl Database {
    pub(crate) async fn initialize_schema(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.pool().acquire().await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                date INTEGER NOT NULL,
                url TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_articles_date ON articles (date);

            -- One row per (entity text, article) pair; the id encodes both.
            CREATE TABLE IF NOT EXISTS mentions (
                id TEXT PRIMARY KEY,
                text TEXT NOT NULL,
                count INTEGER NOT NULL,
                sentiment REAL NOT NULL,
                date INTEGER NOT NULL,
                article_id TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_mentions_date ON mentions (date);
            CREATE INDEX IF NOT EXISTS idx_mentions_article_id ON mentions (article_id);
            CREATE INDEX IF NOT EXISTS idx_mentions_text_lower ON mentions (LOWER(text));
            "#,
        )
        .execute(&mut *conn)
        .await?;
        info!(target: TARGET_DB, "Tables ensured to exist");

        Ok(())
    }
}
