use std::env;

const DATABASE_PATH_ENV: &str = "DATABASE_PATH";
const DEFAULT_DATABASE_PATH: &str = "panoptes.db";

/// Resolves the SQLite database path from the environment, falling back to
/// a file in the working directory.
pub fn database_path() -> String {
    env::var(DATABASE_PATH_ENV).unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string())
}
