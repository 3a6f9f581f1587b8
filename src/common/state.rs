// Application state shared across all modules

use sqlx::SqlitePool;

use crate::common::config::Config;

/// Application state containing the database pool and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}
