// Re-export the Database struct and other public items
mod article;
pub mod core;
mod mention;
mod schema;

// Re-export Database and essential traits
pub use self::core::Database;
pub use self::core::DbLockErrorExt;
pub use self::core::StoreStats;
pub use sqlx::Row;
