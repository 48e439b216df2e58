pub mod db;
pub mod enrichment;
pub mod environment;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod query;
pub mod retention;

pub const TARGET_DB: &str = "db_query";
