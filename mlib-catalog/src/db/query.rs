//! Filter-to-SQL translation for song listing
//!
//! Produces a statement of fixed shape:
//! `SELECT <5 columns> FROM songs [WHERE p1 AND p2 ...] LIMIT ? OFFSET ?`
//! Predicates always appear in column order (group, title, lyrics,
//! release date, link) so the same filter yields the same statement.

use mlib_common::SongFilter;

/// Column list shared by every song read
pub const SONG_COLUMNS: &str = "group_name, song_name, song_text, release_date, link";

/// A value bound to a positional `?` parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    Text(String),
    Integer(i64),
}

/// SQL text plus its parameters, in binding order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongQuery {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

/// Build the listing statement for an already normalized filter.
///
/// Release date is matched as a suffix (`LIKE '%' || ?`), so a four-digit
/// value selects every song released in that year. All other fields use
/// exact equality. `limit` and `offset` are always the last two parameters.
pub fn build_filter_query(filter: &SongFilter, limit: i64, offset: i64) -> SongQuery {
    let candidates = [
        ("group_name = ?", &filter.group),
        ("song_name = ?", &filter.title),
        ("song_text = ?", &filter.lyrics),
        ("release_date LIKE '%' || ?", &filter.release_date),
        ("link = ?", &filter.link),
    ];

    let mut predicates = Vec::new();
    let mut params = Vec::new();
    for (predicate, value) in candidates {
        if let Some(value) = value {
            predicates.push(predicate);
            params.push(QueryParam::Text(value.clone()));
        }
    }

    let mut sql = format!("SELECT {} FROM songs", SONG_COLUMNS);
    if !filter.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }
    sql.push_str(" LIMIT ? OFFSET ?");

    params.push(QueryParam::Integer(limit));
    params.push(QueryParam::Integer(offset));

    SongQuery { sql, params }
}
