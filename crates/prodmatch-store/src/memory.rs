//! In-process product catalog.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::catalog::CatalogStore;
use prodmatch_core::{CatalogEntry, NewCatalogEntry, Result};

/// Catalog held in memory; lost when the process exits.
#[derive(Default)]
pub struct MemoryCatalogStore {
    entries: RwLock<Vec<CatalogEntry>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-filled with entries, assigning ids 1..=n in order.
    pub fn with_entries(entries: impl IntoIterator<Item = NewCatalogEntry>) -> Self {
        let store = Self::new();
        {
            let mut rows = store.entries.write();
            for entry in entries {
                let row = Self::materialize(rows.len(), entry);
                rows.push(row);
            }
        }
        store
    }

    /// Snapshot of the current entries.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.entries.read().clone()
    }

    fn materialize(existing: usize, entry: NewCatalogEntry) -> CatalogEntry {
        CatalogEntry {
            id: existing as i64 + 1,
            product_name: entry.product_name,
            product_description: entry.product_description,
            embedding: entry.embedding,
            created_at: crate::now_millis(),
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn fetch_all(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.entries())
    }

    async fn insert(&self, entry: NewCatalogEntry) -> Result<CatalogEntry> {
        let mut rows = self.entries.write();
        let row = Self::materialize(rows.len(), entry);
        rows.push(row.clone());
        Ok(row)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().len())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
