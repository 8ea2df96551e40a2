//! Storage trait for the product catalog.

use async_trait::async_trait;
use prodmatch_core::{CatalogEntry, NewCatalogEntry, Result};

/// The catalog as seen by the matcher: read everything, append one row.
///
/// Entries come back in insertion order, which is the order tie-breaks are
/// resolved in. An indexed nearest-neighbour backend can replace the
/// full fetch later without changing the matcher's decision contract.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch every catalog entry in insertion order.
    async fn fetch_all(&self) -> Result<Vec<CatalogEntry>>;

    /// Persist a new entry and return it with its assigned id.
    async fn insert(&self, entry: NewCatalogEntry) -> Result<CatalogEntry>;

    /// Number of entries in the catalog.
    async fn count(&self) -> Result<usize>;

    /// Human-readable location of the catalog (file path or `memory`).
    fn location(&self) -> String;
}
