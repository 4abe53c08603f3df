//! Database initialization
//!
//! Opens the SQLite pool and brings the schema up to date. With
//! `reload_schema` the schema is torn down first, which wipes all songs.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::{info, warn};

use super::migrations;

/// Default pool size for the service
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Open a connection pool for `database_url`
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    // WAL allows concurrent readers alongside the single writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    info!("Connected to database: {}", redact_url(database_url));
    Ok(pool)
}

/// Connect and migrate; optionally drop the schema first
pub async fn init_database(database_url: &str, reload_schema: bool) -> Result<SqlitePool> {
    let pool = connect(database_url, DEFAULT_MAX_CONNECTIONS).await?;

    if reload_schema {
        warn!("Reloading schema: all stored songs will be removed");
        migrations::down(&pool).await?;
    }
    migrations::up(&pool).await?;

    info!("Database ready with all migrations applied");
    Ok(pool)
}

/// Hide credentials or query options when logging a connection URL
fn redact_url(database_url: &str) -> &str {
    database_url.split('?').next().unwrap_or(database_url)
}
