//! ProdMatch Store — the product catalog behind a storage trait.
//!
//! `SqliteCatalogStore` keeps the catalog in a single SQLite table with
//! embeddings serialized as JSON arrays. `MemoryCatalogStore` holds it in
//! process and is used by tests and throwaway runs.

pub mod catalog;
pub mod embedding;
pub mod memory;
pub mod schema;
pub mod sqlite;

pub use catalog::CatalogStore;
pub use memory::MemoryCatalogStore;
pub use sqlite::SqliteCatalogStore;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
