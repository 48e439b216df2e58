use rand::Rng;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    Pool, Sqlite,
};
use std::future::Future;
use std::str::FromStr;
use tokio::time::{sleep, Duration};
use tracing::{info, instrument};

use crate::TARGET_DB;

#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Get access to the database pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

// Helper method to check if an sqlx error is a database lock error
pub trait DbLockErrorExt {
    fn is_database_lock_error(&self) -> bool;
}

impl DbLockErrorExt for sqlx::Error {
    fn is_database_lock_error(&self) -> bool {
        match self {
            sqlx::Error::Database(err) => {
                err.code().map_or(false, |c| c == "5" || c == "6") // SQLITE_BUSY or SQLITE_LOCKED
            }
            _ => false,
        }
    }
}

/// Row counts for both record collections, for operational logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub articles: i64,
    pub mentions: i64,
}

const MAX_WRITE_RETRIES: u32 = 5;

/// Runs a write against the store, retrying with exponential backoff and
/// jitter while the store reports a lock timeout. Any other error returns
/// immediately.
pub(crate) async fn with_lock_retry<T, F, Fut>(op_name: &str, mut op: F) -> Result<T, sqlx::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut backoff: u64 = 100; // initial delay in milliseconds
    for attempt in 1..=MAX_WRITE_RETRIES {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_database_lock_error() => {
                info!(target: TARGET_DB, "Database is locked, waiting {}ms before retrying attempt {}/{}: {}", backoff, attempt, MAX_WRITE_RETRIES, op_name);
                sleep(Duration::from_millis(backoff)).await;
                // Jitter keeps concurrent writers from retrying in lockstep.
                backoff = backoff.saturating_mul(2) + rand::rng().random_range(0..100);
            }
            Err(err) => return Err(err),
        }
    }

    Err(sqlx::Error::Protocol(format!(
        "Maximum retries exceeded for {}",
        op_name
    )))
}

impl Database {
    #[instrument(target = "db", level = "info")]
    pub async fn new(database_path: &str) -> Result<Self, sqlx::Error> {
        info!(target: TARGET_DB, "Creating database pool for: {}", database_path);

        let connect_options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", database_path))?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5))
                .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;

        info!(target: TARGET_DB, "Database pool created");

        // Initialize schema
        let db = Database { pool };
        db.initialize_schema().await?;

        Ok(db)
    }

    /// An isolated in-memory store. A single connection keeps every query
    /// on the same underlying database.
    pub async fn new_in_memory() -> Result<Self, sqlx::Error> {
        let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await?;

        let db = Database { pool };
        db.initialize_schema().await?;

        Ok(db)
    }

    /// Collect row counts from both record collections
    pub async fn collect_stats(&self) -> Result<StoreStats, sqlx::Error> {
        let articles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(self.pool())
            .await?;
        let mentions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mentions")
            .fetch_one(self.pool())
            .await?;

        Ok(StoreStats { articles, mentions })
    }
}
