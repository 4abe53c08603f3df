//! # musiclib common library
//!
//! Shared code for the musiclib services:
//! - Song data model and filter record
//! - Field validation (release dates, source links, filter years)
//! - Verse paginator for lyrics text
//! - Configuration loading
//! - Database bootstrap and schema migrations

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod models;
pub mod validation;
pub mod verses;

pub use error::{Error, Result};
pub use models::{Song, SongFilter};
