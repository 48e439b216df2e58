use tracing::{debug, error, info};

use crate::db::Database;
use crate::enrichment::{self, EnrichmentDocument};

// Module-level constant
pub const TARGET_INGEST: &str = "ingest";

/// Outcome of one ingestion batch. Per-record failures are logged as they
/// happen; the counts make them observable to the caller without
/// propagating.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub documents_adapted: usize,
    pub articles_written: usize,
    pub mentions_written: usize,
    pub failures: usize,
}

/// Persists a batch of enrichment documents, best-effort.
///
/// Absent documents are skipped silently, documents without a usable
/// enriched payload produce nothing, and each record is upserted
/// independently: one failed write never aborts sibling records or the
/// rest of the batch. There is no batch atomicity; partial application
/// under failure is an accepted outcome.
pub async fn ingest_documents(
    db: &Database,
    docs: &[Option<EnrichmentDocument>],
) -> IngestSummary {
    let mut summary = IngestSummary::default();

    for doc in docs.iter().flatten() {
        let (article, mentions) = match enrichment::adapt(doc) {
            Some(adapted) => adapted,
            None => {
                debug!(
                    target: TARGET_INGEST,
                    "Document {} produced no records", doc.id
                );
                continue;
            }
        };
        summary.documents_adapted += 1;

        match db.upsert_article(&article).await {
            Ok(()) => summary.articles_written += 1,
            Err(e) => {
                error!(
                    target: TARGET_INGEST,
                    "Failed to upsert article {}: {}", article.id, e
                );
                summary.failures += 1;
                // Mentions are still attempted: upserts are independent.
            }
        }

        for mention in &mentions {
            match db.upsert_mention(mention).await {
                Ok(()) => summary.mentions_written += 1,
                Err(e) => {
                    error!(
                        target: TARGET_INGEST,
                        "Failed to upsert mention {}: {}", mention.id, e
                    );
                    summary.failures += 1;
                }
            }
        }
    }

    info!(
        target: TARGET_INGEST,
        "Ingested {} documents: {} articles, {} mentions, {} failures",
        summary.documents_adapted,
        summary.articles_written,
        summary.mentions_written,
        summary.failures
    );

    summary
}
