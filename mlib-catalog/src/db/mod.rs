//! Storage port for songs and its SQLite adapter
//!
//! The catalog service only sees [`SongStore`]; the SQLite adapter is one
//! implementation, tests substitute their own.

use async_trait::async_trait;
use mlib_common::{Result, Song, SongFilter};

pub mod query;
mod songs;

pub use query::{build_filter_query, QueryParam, SongQuery};
pub use songs::SqliteSongStore;

/// Persistence capability required by the catalog service.
///
/// Every method is a single statement against storage. Write methods report
/// absence as `Error::NotFound`, a duplicate `(group, title)` as
/// `Error::Conflict`, and a row count other than one as
/// `Error::UnexpectedRowCount`.
#[async_trait]
pub trait SongStore: Send + Sync {
    /// Songs matching a normalized filter, one page at a time
    async fn find_by_filter(&self, filter: &SongFilter, limit: i64, offset: i64)
        -> Result<Vec<Song>>;

    /// Song with the given storage id, if any
    async fn find_by_id(&self, id: i64) -> Result<Option<Song>>;

    /// Remove the song with the given storage id
    async fn delete_by_id(&self, id: i64) -> Result<()>;

    /// Replace every field of the song with the given storage id
    async fn update_by_id(&self, id: i64, song: &Song) -> Result<()>;

    /// Insert a song unless its `(group, title)` is already stored
    async fn insert(&self, song: &Song) -> Result<()>;
}
