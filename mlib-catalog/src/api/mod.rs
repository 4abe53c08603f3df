//! HTTP API handlers for mlib-catalog

pub mod health;
pub mod songs;

pub use health::health_routes;
pub use songs::{add_song, delete_song, get_song_text, list_songs, update_song};
