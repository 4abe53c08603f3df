//! SQLite implementation of the song store

use async_trait::async_trait;
use mlib_common::{Error, Result, Song, SongFilter};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, error};

use super::query::{build_filter_query, QueryParam, SONG_COLUMNS};
use super::SongStore;

/// Song store backed by the `songs` table
#[derive(Clone)]
pub struct SqliteSongStore {
    pool: SqlitePool,
}

impl SqliteSongStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn song_from_row(row: &SqliteRow) -> std::result::Result<Song, sqlx::Error> {
    Ok(Song {
        group: row.try_get("group_name")?,
        title: row.try_get("song_name")?,
        lyrics: row.try_get("song_text")?,
        release_date: row.try_get("release_date")?,
        link: row.try_get("link")?,
    })
}

/// Check that a keyed write touched exactly one row
fn expect_single_row(rows_affected: u64, id: i64, operation: &str) -> Result<()> {
    match rows_affected {
        1 => Ok(()),
        0 => Err(Error::NotFound(format!("song {}", id))),
        actual => {
            error!(layer = "db", operation, id, actual, "unexpected number of changed rows");
            Err(Error::UnexpectedRowCount {
                expected: 1,
                actual,
            })
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[async_trait]
impl SongStore for SqliteSongStore {
    async fn find_by_filter(
        &self,
        filter: &SongFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Song>> {
        let query = build_filter_query(filter, limit, offset);
        debug!(sql = %query.sql, params = query.params.len(), "listing songs");

        let mut statement = sqlx::query(&query.sql);
        for param in &query.params {
            statement = match param {
                QueryParam::Text(value) => statement.bind(value.as_str()),
                QueryParam::Integer(value) => statement.bind(*value),
            };
        }

        let rows = statement.fetch_all(&self.pool).await.map_err(|e| {
            error!(layer = "db", operation = "find_by_filter", "query failed: {}", e);
            e
        })?;

        let songs = rows
            .iter()
            .map(song_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!("found {} songs", songs.len());
        Ok(songs)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Song>> {
        let sql = format!("SELECT {} FROM songs WHERE id = ?", SONG_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(song_from_row).transpose()?)
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id, rows_affected = result.rows_affected(), "deleted song");
        expect_single_row(result.rows_affected(), id, "delete_by_id")
    }

    async fn update_by_id(&self, id: i64, song: &Song) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE songs
            SET group_name = ?,
                song_name = ?,
                song_text = ?,
                release_date = ?,
                link = ?
            WHERE id = ?
            "#,
        )
        .bind(&song.group)
        .bind(&song.title)
        .bind(&song.lyrics)
        .bind(&song.release_date)
        .bind(&song.link)
        .bind(id)
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(e) if is_unique_violation(&e) => {
                return Err(Error::Conflict(format!("{} - {}", song.group, song.title)));
            }
            Err(e) => return Err(e.into()),
        };

        debug!(id, rows_affected = result.rows_affected(), "updated song");
        expect_single_row(result.rows_affected(), id, "update_by_id")
    }

    async fn insert(&self, song: &Song) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO songs (group_name, song_name, song_text, release_date, link)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(group_name, song_name) DO NOTHING
            "#,
        )
        .bind(&song.group)
        .bind(&song.title)
        .bind(&song.lyrics)
        .bind(&song.release_date)
        .bind(&song.link)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::Conflict(format!("{} - {}", song.group, song.title)));
        }

        debug!(group = %song.group, title = %song.title, "inserted song");
        Ok(())
    }
}
