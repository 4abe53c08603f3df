//! Metadata enrichment client
//!
//! New songs arrive with only a group and a title. The remaining fields
//! (lyrics, release date, link) come from an external metadata service
//! queried as `GET <base>/info?group=<group>&song=<title>`.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("musiclib/", env!("CARGO_PKG_VERSION"));

/// Enrichment client errors
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Metadata service returned status {0}")]
    Status(u16),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Fields supplied by the metadata service
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SongDetails {
    #[serde(rename = "releaseDate", default)]
    pub release_date: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub link: String,
}

/// Source of song details for the create flow
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Look up details for a song by group and title
    async fn fetch_details(&self, group: &str, title: &str)
        -> Result<SongDetails, EnrichmentError>;
}

/// HTTP client for the metadata service
pub struct HttpMetadataClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpMetadataClient {
    /// Every request is bounded by `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn info_url(&self) -> String {
        format!("{}/info", self.base_url)
    }
}

#[async_trait]
impl MetadataClient for HttpMetadataClient {
    async fn fetch_details(
        &self,
        group: &str,
        title: &str,
    ) -> Result<SongDetails, EnrichmentError> {
        let url = self.info_url();
        tracing::debug!(url = %url, group = %group, title = %title, "Querying metadata service");

        let response = self
            .http_client
            .get(&url)
            .query(&[("group", group), ("song", title)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EnrichmentError::Timeout(self.timeout)
                } else {
                    EnrichmentError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), group = %group, title = %title, "Metadata service rejected lookup");
            return Err(EnrichmentError::Status(status.as_u16()));
        }

        let details: SongDetails = response
            .json()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))?;

        tracing::debug!(release_date = %details.release_date, link = %details.link, "Received song details");
        Ok(details)
    }
}
