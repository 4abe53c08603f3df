//! Song data model
//!
//! Field names on the wire follow the public JSON contract
//! (`group`, `song`, `text`, `releaseDate`, `link`).

use serde::{Deserialize, Serialize};

/// A stored song. The storage id is deliberately not part of the wire model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Performing group or artist
    #[serde(default)]
    pub group: String,
    /// Song title
    #[serde(rename = "song", default)]
    pub title: String,
    /// Full lyrics, verses separated by a blank line
    #[serde(rename = "text", default)]
    pub lyrics: String,
    /// Release date in `DD.MM.YYYY` form
    #[serde(rename = "releaseDate", default)]
    pub release_date: String,
    /// Absolute URL to source material
    #[serde(default)]
    pub link: String,
}

impl Song {
    pub fn new(group: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Sparse filter over the song columns.
///
/// `None` and empty strings both mean "unconstrained"; call
/// [`SongFilter::normalized`] before handing a filter to storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    pub group: Option<String>,
    pub title: Option<String>,
    pub lyrics: Option<String>,
    pub release_date: Option<String>,
    pub link: Option<String>,
}

impl SongFilter {
    /// Drop empty values so only real constraints remain
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        Self {
            group: keep(self.group),
            title: keep(self.title),
            lyrics: keep(self.lyrics),
            release_date: keep(self.release_date),
            link: keep(self.link),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_none()
            && self.title.is_none()
            && self.lyrics.is_none()
            && self.release_date.is_none()
            && self.link.is_none()
    }

    /// Number of active constraints
    pub fn len(&self) -> usize {
        [
            &self.group,
            &self.title,
            &self.lyrics,
            &self.release_date,
            &self.link,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }
}
