//! Database schema migrations
//!
//! Each migration is a versioned list of statements applied inside one
//! transaction and recorded in `schema_version`. Migrations only ever add;
//! `down` exists solely for the startup reload switch and drops everything.

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Songs table, unique `(group, title)` key and one index per filter column.
/// The unique index is what makes insert-if-absent a single statement.
const V1_SONGS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS songs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        group_name TEXT NOT NULL,
        song_name TEXT NOT NULL,
        song_text TEXT NOT NULL DEFAULT '',
        release_date TEXT NOT NULL DEFAULT '',
        link TEXT NOT NULL DEFAULT ''
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_songs_group_song ON songs (group_name, song_name)",
    "CREATE INDEX IF NOT EXISTS idx_songs_song_name ON songs (song_name)",
    "CREATE INDEX IF NOT EXISTS idx_songs_song_text ON songs (song_text)",
    "CREATE INDEX IF NOT EXISTS idx_songs_release_date ON songs (release_date)",
    "CREATE INDEX IF NOT EXISTS idx_songs_link ON songs (link)",
];

/// Ordered by version; the last entry is the version this build expects
const MIGRATIONS: &[(i32, &str, &[&str])] = &[(1, "create songs table", V1_SONGS)];

pub(crate) fn latest_version() -> i32 {
    MIGRATIONS.last().map_or(0, |(version, _, _)| *version)
}

/// Highest applied version, 0 for a fresh database.
/// Requires the `schema_version` table to exist.
pub(crate) async fn applied_version(pool: &SqlitePool) -> Result<i32> {
    let version: i32 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
        .fetch_one(pool)
        .await?;
    Ok(version)
}

/// Apply all pending migrations
pub async fn up(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let applied = applied_version(pool).await?;
    if applied > latest_version() {
        warn!(applied, known = latest_version(), "database schema is newer than this build");
        return Ok(());
    }

    let pending: Vec<_> = MIGRATIONS.iter().filter(|(v, _, _)| *v > applied).collect();
    if pending.is_empty() {
        info!("Database schema is up to date (v{})", applied);
        return Ok(());
    }

    for (version, name, statements) in pending {
        let mut tx = pool.begin().await?;
        for statement in statements.iter() {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(*version)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("✓ Migration v{} applied: {}", version, name);
    }

    Ok(())
}

/// Drop the songs table and the version history
pub async fn down(pool: &SqlitePool) -> Result<()> {
    for table in ["songs", "schema_version"] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }

    info!("Dropped songs schema");
    Ok(())
}
