//! Error types for the catalog service
//!
//! Every failure reaches the client as a 500 with a plain-text message,
//! except a metadata-service rejection, which keeps the upstream status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::enrichment::EnrichmentError;

/// Catalog operation error
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid page")]
    InvalidPage,

    #[error("Invalid page size")]
    InvalidPageSize,

    #[error("Invalid year")]
    InvalidYear,

    #[error("Invalid date")]
    InvalidDate,

    #[error("Invalid link")]
    InvalidLink,

    #[error("Invalid song id: {0}")]
    InvalidId(String),

    #[error("Song not found")]
    NotFound,

    #[error("Song already exists")]
    AlreadyExists,

    #[error("No text at this page")]
    NoTextAtPage,

    #[error("Unexpected number of changed rows: {0}")]
    UnexpectedAffectedRowCount(u64),

    /// The metadata service answered with a non-success status
    #[error("External service returned {0}")]
    Upstream(u16),

    /// The metadata service could not be reached or sent an unreadable body
    #[error("Metadata service unavailable: {0}")]
    MetadataUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(mlib_common::Error),
}

impl From<mlib_common::Error> for CatalogError {
    fn from(err: mlib_common::Error) -> Self {
        match err {
            mlib_common::Error::NotFound(_) => CatalogError::NotFound,
            mlib_common::Error::Conflict(_) => CatalogError::AlreadyExists,
            mlib_common::Error::UnexpectedRowCount { actual, .. } => {
                CatalogError::UnexpectedAffectedRowCount(actual)
            }
            other => CatalogError::Storage(other),
        }
    }
}

impl From<EnrichmentError> for CatalogError {
    fn from(err: EnrichmentError) -> Self {
        match err {
            EnrichmentError::Status(code) => CatalogError::Upstream(code),
            other => CatalogError::MetadataUnavailable(other.to_string()),
        }
    }
}

impl CatalogError {
    /// HTTP status reported to the client.
    ///
    /// Only an upstream rejection keeps its own status; every other failure
    /// is a 500 whose body names the cause.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::Upstream(code) => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
