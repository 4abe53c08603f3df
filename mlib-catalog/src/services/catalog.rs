//! Catalog service
//!
//! Owns every business rule: parsing of page parameters and ids, field
//! validation, and turning an empty lyrics page into an error. Storage and
//! metadata lookups are reached only through their traits.

use chrono::Datelike;
use mlib_common::validation::{is_valid_link, is_valid_year, parse_date};
use mlib_common::verses::page_of_verses;
use mlib_common::{Song, SongFilter};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db::SongStore;
use crate::enrichment::MetadataClient;
use crate::error::{CatalogError, CatalogResult};

/// Song catalog operations
pub struct CatalogService {
    store: Arc<dyn SongStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn SongStore>) -> Self {
        Self { store }
    }

    /// List one page of songs matching `filter`.
    ///
    /// `page` and `page_size` arrive as raw query text and must be positive
    /// integers. A release-date filter must be a four-digit year no later
    /// than the current one; a link filter must be an absolute URL.
    pub async fn list_by_filter(
        &self,
        filter: SongFilter,
        page_size: &str,
        page: &str,
    ) -> CatalogResult<Vec<Song>> {
        let page = parse_positive(page).ok_or_else(|| {
            warn!(layer = "service", operation = "list_by_filter", page, "rejected page");
            CatalogError::InvalidPage
        })?;
        let limit = parse_positive(page_size).ok_or_else(|| {
            warn!(layer = "service", operation = "list_by_filter", page_size, "rejected page size");
            CatalogError::InvalidPageSize
        })?;
        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or(CatalogError::InvalidPage)?;

        let filter = filter.normalized();
        debug!(filters = filter.len(), limit, offset, "listing songs");

        if let Some(year) = &filter.release_date {
            if !is_valid_year(year, current_year()) {
                warn!(layer = "service", operation = "list_by_filter", year = %year, "rejected year filter");
                return Err(CatalogError::InvalidYear);
            }
        }
        if let Some(link) = &filter.link {
            if !is_valid_link(link) {
                warn!(layer = "service", operation = "list_by_filter", link = %link, "rejected link filter");
                return Err(CatalogError::InvalidLink);
            }
        }

        let songs = self
            .store
            .find_by_filter(&filter, limit, offset)
            .await
            .map_err(|e| {
                warn!(layer = "service", operation = "list_by_filter", "storage failed: {}", e);
                CatalogError::from(e)
            })?;

        debug!("listed {} songs", songs.len());
        Ok(songs)
    }

    /// Return one page of a song's lyrics, `page_size` verses per page.
    ///
    /// A page past the last verse is an error rather than an empty success.
    pub async fn get_text_page(
        &self,
        song_id: &str,
        page_size: &str,
        page: &str,
    ) -> CatalogResult<String> {
        let page_size = parse_positive(page_size).ok_or(CatalogError::InvalidPageSize)?;
        let page = parse_positive(page).ok_or(CatalogError::InvalidPage)?;
        let id = parse_id(song_id)?;

        let song = self.store.find_by_id(id).await?.ok_or_else(|| {
            debug!(id, "song not found");
            CatalogError::NotFound
        })?;

        let (Ok(page_size), Ok(page)) = (usize::try_from(page_size), usize::try_from(page)) else {
            return Err(CatalogError::NoTextAtPage);
        };
        let text = page_of_verses(&song.lyrics, page_size, page);
        debug!(id, page_size, page, chars = text.chars().count(), "paginated lyrics");

        if text.is_empty() {
            return Err(CatalogError::NoTextAtPage);
        }
        Ok(text)
    }

    /// Delete the song with the given id
    pub async fn delete_by_id(&self, song_id: &str) -> CatalogResult<()> {
        let id = parse_id(song_id)?;
        self.store.delete_by_id(id).await?;

        info!(id, "song deleted");
        Ok(())
    }

    /// Replace every field of the song with the given id
    pub async fn update_by_id(&self, song_id: &str, song: Song) -> CatalogResult<()> {
        let id = parse_id(song_id)?;
        validate_song(&song)?;

        self.store.update_by_id(id, &song).await?;

        info!(id, group = %song.group, title = %song.title, "song updated");
        Ok(())
    }

    /// Store a new song; `(group, title)` must not already exist
    pub async fn create(&self, song: Song) -> CatalogResult<()> {
        validate_song(&song)?;

        self.store.insert(&song).await?;

        info!(group = %song.group, title = %song.title, "song created");
        Ok(())
    }

    /// Fetch details for `group`/`title` from the metadata service and store
    /// the merged song. Group and title always come from the caller.
    pub async fn enrich_and_create(
        &self,
        group: &str,
        title: &str,
        metadata: &dyn MetadataClient,
    ) -> CatalogResult<()> {
        let details = metadata.fetch_details(group, title).await.map_err(|e| {
            warn!(layer = "service", operation = "enrich_and_create", group, title, "enrichment failed: {}", e);
            CatalogError::from(e)
        })?;

        let song = Song {
            lyrics: details.text,
            release_date: details.release_date,
            link: details.link,
            ..Song::new(group, title)
        };
        self.create(song).await
    }
}

/// Positive integer from raw request text
fn parse_positive(value: &str) -> Option<i64> {
    value.parse::<i64>().ok().filter(|v| *v > 0)
}

fn parse_id(song_id: &str) -> CatalogResult<i64> {
    song_id
        .parse::<i64>()
        .map_err(|_| CatalogError::InvalidId(song_id.to_string()))
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Release date and link rules shared by create and update.
/// Both fields are required; an empty value fails like a malformed one.
fn validate_song(song: &Song) -> CatalogResult<()> {
    let date_ok = parse_date(&song.release_date).is_some_and(|d| d.year() <= current_year());
    if !date_ok {
        warn!(layer = "service", release_date = %song.release_date, "rejected release date");
        return Err(CatalogError::InvalidDate);
    }
    if !is_valid_link(&song.link) {
        warn!(layer = "service", link = %song.link, "rejected link");
        return Err(CatalogError::InvalidLink);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::{EnrichmentError, SongDetails};
    use async_trait::async_trait;
    use mlib_common::Error;
    use std::sync::Mutex;

    const LYRICS: &str = "verse one\nline two\n\nverse two\nline two\n\nverse three\n";

    /// In-process store keyed by insertion order, ids start at 1
    #[derive(Default)]
    struct MemoryStore {
        songs: Mutex<Vec<Option<Song>>>,
        last_filter: Mutex<Option<(SongFilter, i64, i64)>>,
    }

    #[async_trait]
    impl SongStore for MemoryStore {
        async fn find_by_filter(
            &self,
            filter: &SongFilter,
            limit: i64,
            offset: i64,
        ) -> mlib_common::Result<Vec<Song>> {
            *self.last_filter.lock().unwrap() = Some((filter.clone(), limit, offset));
            let songs = self.songs.lock().unwrap();
            Ok(songs
                .iter()
                .flatten()
                .filter(|s| filter.group.as_ref().map_or(true, |g| &s.group == g))
                .filter(|s| {
                    filter
                        .release_date
                        .as_ref()
                        .map_or(true, |y| s.release_date.ends_with(y.as_str()))
                })
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn find_by_id(&self, id: i64) -> mlib_common::Result<Option<Song>> {
            let songs = self.songs.lock().unwrap();
            Ok(usize::try_from(id - 1)
                .ok()
                .and_then(|i| songs.get(i).cloned().flatten()))
        }

        async fn delete_by_id(&self, id: i64) -> mlib_common::Result<()> {
            let mut songs = self.songs.lock().unwrap();
            match usize::try_from(id - 1).ok().and_then(|i| songs.get_mut(i)) {
                Some(slot) if slot.is_some() => {
                    *slot = None;
                    Ok(())
                }
                _ => Err(Error::NotFound(format!("song {}", id))),
            }
        }

        async fn update_by_id(&self, id: i64, song: &Song) -> mlib_common::Result<()> {
            let mut songs = self.songs.lock().unwrap();
            match usize::try_from(id - 1).ok().and_then(|i| songs.get_mut(i)) {
                Some(slot) if slot.is_some() => {
                    *slot = Some(song.clone());
                    Ok(())
                }
                _ => Err(Error::NotFound(format!("song {}", id))),
            }
        }

        async fn insert(&self, song: &Song) -> mlib_common::Result<()> {
            let mut songs = self.songs.lock().unwrap();
            let duplicate = songs
                .iter()
                .flatten()
                .any(|s| s.group == song.group && s.title == song.title);
            if duplicate {
                return Err(Error::Conflict(song.title.clone()));
            }
            songs.push(Some(song.clone()));
            Ok(())
        }
    }

    /// Store whose every call fails the way a broken database would
    struct BrokenStore;

    #[async_trait]
    impl SongStore for BrokenStore {
        async fn find_by_filter(&self, _: &SongFilter, _: i64, _: i64) -> mlib_common::Result<Vec<Song>> {
            Err(Error::Database(sqlx::Error::PoolClosed))
        }
        async fn find_by_id(&self, _: i64) -> mlib_common::Result<Option<Song>> {
            Err(Error::Database(sqlx::Error::PoolClosed))
        }
        async fn delete_by_id(&self, _: i64) -> mlib_common::Result<()> {
            Err(Error::UnexpectedRowCount { expected: 1, actual: 2 })
        }
        async fn update_by_id(&self, _: i64, _: &Song) -> mlib_common::Result<()> {
            Err(Error::UnexpectedRowCount { expected: 1, actual: 2 })
        }
        async fn insert(&self, _: &Song) -> mlib_common::Result<()> {
            Err(Error::Database(sqlx::Error::PoolClosed))
        }
    }

    struct FixedMetadata(Result<SongDetails, u16>);

    #[async_trait]
    impl MetadataClient for FixedMetadata {
        async fn fetch_details(&self, _: &str, _: &str) -> Result<SongDetails, EnrichmentError> {
            self.0.clone().map_err(EnrichmentError::Status)
        }
    }

    fn song(group: &str, title: &str) -> Song {
        Song {
            group: group.to_string(),
            title: title.to_string(),
            lyrics: LYRICS.to_string(),
            release_date: "16.07.2006".to_string(),
            link: "https://example.com/song".to_string(),
        }
    }

    async fn service_with(songs: &[Song]) -> (CatalogService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let service = CatalogService::new(store.clone());
        for s in songs {
            service.create(s.clone()).await.unwrap();
        }
        (service, store)
    }

    #[tokio::test]
    async fn test_list_rejects_bad_page() {
        let (service, _) = service_with(&[]).await;
        for page in ["0", "-1", "abc", ""] {
            let result = service.list_by_filter(SongFilter::default(), "10", page).await;
            assert!(matches!(result, Err(CatalogError::InvalidPage)), "page={:?}", page);
        }
    }

    #[tokio::test]
    async fn test_list_rejects_bad_page_size() {
        let (service, _) = service_with(&[]).await;
        let result = service.list_by_filter(SongFilter::default(), "0", "1").await;
        assert!(matches!(result, Err(CatalogError::InvalidPageSize)));
    }

    #[tokio::test]
    async fn test_list_computes_offset_and_drops_empty_filters() {
        let (service, store) = service_with(&[song("Muse", "Uprising")]).await;
        let filter = SongFilter {
            group: Some("Muse".to_string()),
            title: Some(String::new()),
            ..SongFilter::default()
        };

        service.list_by_filter(filter, "5", "3").await.unwrap();

        let (seen, limit, offset) = store.last_filter.lock().unwrap().clone().unwrap();
        assert_eq!(seen.group.as_deref(), Some("Muse"));
        assert!(seen.title.is_none());
        assert_eq!((limit, offset), (5, 10));
    }

    #[tokio::test]
    async fn test_list_by_year() {
        let mut resistance = song("Muse", "Resistance");
        resistance.release_date = "22.02.2009".to_string();
        let (service, _) = service_with(&[song("Muse", "Supermassive"), resistance]).await;

        let filter = SongFilter {
            release_date: Some("2009".to_string()),
            ..SongFilter::default()
        };
        let songs = service.list_by_filter(filter, "10", "1").await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "Resistance");
    }

    #[tokio::test]
    async fn test_list_rejects_bad_year_and_link() {
        let (service, _) = service_with(&[]).await;

        for year in ["20", "9999", "16.07.2006", "abcd"] {
            let filter = SongFilter {
                release_date: Some(year.to_string()),
                ..SongFilter::default()
            };
            let result = service.list_by_filter(filter, "10", "1").await;
            assert!(matches!(result, Err(CatalogError::InvalidYear)), "year={}", year);
        }

        let filter = SongFilter {
            link: Some("example.com".to_string()),
            ..SongFilter::default()
        };
        let result = service.list_by_filter(filter, "10", "1").await;
        assert!(matches!(result, Err(CatalogError::InvalidLink)));
    }

    #[tokio::test]
    async fn test_list_propagates_storage_errors() {
        let service = CatalogService::new(Arc::new(BrokenStore));
        let result = service.list_by_filter(SongFilter::default(), "10", "1").await;
        assert!(matches!(result, Err(CatalogError::Storage(_))));
    }

    #[tokio::test]
    async fn test_get_text_page() {
        let (service, _) = service_with(&[song("Muse", "Uprising")]).await;

        let text = service.get_text_page("1", "1", "2").await.unwrap();
        assert_eq!(text, "\nverse two\nline two\n");

        let result = service.get_text_page("1", "1", "4").await;
        assert!(matches!(result, Err(CatalogError::NoTextAtPage)));
    }

    #[tokio::test]
    async fn test_get_text_page_parameter_errors() {
        let (service, _) = service_with(&[song("Muse", "Uprising")]).await;

        assert!(matches!(
            service.get_text_page("1", "0", "1").await,
            Err(CatalogError::InvalidPageSize)
        ));
        assert!(matches!(
            service.get_text_page("1", "1", "-2").await,
            Err(CatalogError::InvalidPage)
        ));
        assert!(matches!(
            service.get_text_page("one", "1", "1").await,
            Err(CatalogError::InvalidId(_))
        ));
        assert!(matches!(
            service.get_text_page("7", "1", "1").await,
            Err(CatalogError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_create_twice_is_already_exists() {
        let (service, _) = service_with(&[song("Muse", "Uprising")]).await;
        let result = service.create(song("Muse", "Uprising")).await;
        assert!(matches!(result, Err(CatalogError::AlreadyExists)));
    }

    #[tokio::test]
    async fn test_create_validates_fields() {
        let (service, _) = service_with(&[]).await;

        let mut bad_date = song("Muse", "Uprising");
        bad_date.release_date = "29.02.2023".to_string();
        assert!(matches!(service.create(bad_date).await, Err(CatalogError::InvalidDate)));

        let mut future = song("Muse", "Uprising");
        future.release_date = "01.01.9999".to_string();
        assert!(matches!(service.create(future).await, Err(CatalogError::InvalidDate)));

        let mut bad_link = song("Muse", "Uprising");
        bad_link.link = "not a url".to_string();
        assert!(matches!(service.create(bad_link).await, Err(CatalogError::InvalidLink)));

        let mut no_link = song("Muse", "Uprising");
        no_link.link.clear();
        assert!(matches!(service.create(no_link).await, Err(CatalogError::InvalidLink)));

        assert!(matches!(
            service.create(Song::new("Muse", "Uprising")).await,
            Err(CatalogError::InvalidDate)
        ));
    }

    #[tokio::test]
    async fn test_update_rejects_missing_fields() {
        let (service, store) = service_with(&[song("Muse", "Uprising")]).await;

        let result = service.update_by_id("1", Song::new("Muse", "Uprising")).await;
        assert!(matches!(result, Err(CatalogError::InvalidDate)));
        assert_eq!(store.find_by_id(1).await.unwrap(), Some(song("Muse", "Uprising")));
    }

    #[tokio::test]
    async fn test_enrich_and_create_rejects_missing_details() {
        let (service, store) = service_with(&[]).await;
        let metadata = FixedMetadata(Ok(SongDetails::default()));

        let result = service.enrich_and_create("Muse", "Uprising", &metadata).await;
        assert!(matches!(result, Err(CatalogError::InvalidDate)));
        assert_eq!(store.find_by_id(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_are_not_found() {
        let (service, _) = service_with(&[]).await;
        assert!(matches!(
            service.update_by_id("3", song("Muse", "Uprising")).await,
            Err(CatalogError::NotFound)
        ));
        assert!(matches!(service.delete_by_id("3").await, Err(CatalogError::NotFound)));
        assert!(matches!(service.delete_by_id("x").await, Err(CatalogError::InvalidId(_))));
    }

    #[tokio::test]
    async fn test_update_validates_before_storage() {
        let (service, store) = service_with(&[song("Muse", "Uprising")]).await;
        let mut changed = song("Muse", "Uprising");
        changed.release_date = "32.01.2009".to_string();

        assert!(matches!(
            service.update_by_id("1", changed).await,
            Err(CatalogError::InvalidDate)
        ));
        assert_eq!(store.find_by_id(1).await.unwrap(), Some(song("Muse", "Uprising")));
    }

    #[tokio::test]
    async fn test_unexpected_row_count_is_reported() {
        let service = CatalogService::new(Arc::new(BrokenStore));
        assert!(matches!(
            service.delete_by_id("1").await,
            Err(CatalogError::UnexpectedAffectedRowCount(2))
        ));
        assert!(matches!(
            service.update_by_id("1", song("Muse", "Uprising")).await,
            Err(CatalogError::UnexpectedAffectedRowCount(2))
        ));
    }

    #[tokio::test]
    async fn test_enrich_and_create_merges_fields() {
        let (service, store) = service_with(&[]).await;
        let metadata = FixedMetadata(Ok(SongDetails {
            release_date: "16.07.2006".to_string(),
            text: LYRICS.to_string(),
            link: "https://example.com/song".to_string(),
        }));

        service
            .enrich_and_create("Muse", "Supermassive Black Hole", &metadata)
            .await
            .unwrap();

        let stored = store.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored, song("Muse", "Supermassive Black Hole"));
    }

    #[tokio::test]
    async fn test_enrich_and_create_propagates_upstream_status() {
        let (service, store) = service_with(&[]).await;
        let metadata = FixedMetadata(Err(400));

        let result = service.enrich_and_create("Muse", "Unknown", &metadata).await;
        assert!(matches!(result, Err(CatalogError::Upstream(400))));
        assert_eq!(store.find_by_id(1).await.unwrap(), None);
    }
}
