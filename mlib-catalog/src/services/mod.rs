//! Business logic between the HTTP boundary and storage

pub mod catalog;

pub use catalog::CatalogService;
