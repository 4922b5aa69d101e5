//! Tavola Catalog Library
//!
//! Catalog writer for the upload pipeline: the [`CatalogStore`] trait plus a
//! Postgres backend and an in-memory backend. A catalog row describes one
//! stored object (location, public URL, metadata); it is created only after
//! the object write succeeds and deleted by cleanup when a later step fails.

pub mod memory;
pub mod postgres;
pub mod traits;

// Re-export commonly used types
pub use memory::MemoryCatalog;
pub use postgres::{connect, connect_from_config, PostgresCatalog};
pub use traits::{CatalogError, CatalogRecord, CatalogResult, CatalogStore, NewCatalogRecord};
