//! Embed and insert an uploaded catalog.

use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::CatalogItem;
use prodmatch_core::{Error, NewCatalogEntry};
use prodmatch_infer::Embedder;
use prodmatch_store::CatalogStore;

/// Counts reported back to the uploader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Uploading stopped at `product_name`; earlier items stay inserted.
#[derive(Error, Debug)]
#[error("Failed to insert '{product_name}': {source}")]
pub struct UploadError {
    pub product_name: String,
    #[source]
    pub source: Error,
}

/// Embed every non-blank item and insert it into the catalog as-is.
///
/// Uploaded products are trusted catalog data, so no similarity check runs.
pub async fn upload_catalog(
    store: &dyn CatalogStore,
    embedder: &dyn Embedder,
    items: Vec<CatalogItem>,
) -> Result<UploadReport, UploadError> {
    let mut report = UploadReport::default();

    for item in items {
        if item.is_blank() {
            warn!("Skipping catalog item with blank fields: {:?}", item.product_name);
            report.skipped += 1;
            continue;
        }

        let wrap = |source| UploadError {
            product_name: item.product_name.clone(),
            source,
        };
        let embedding = embedder
            .embed(&item.product_name, &item.product_description)
            .await
            .map_err(wrap)?;
        let entry = store
            .insert(NewCatalogEntry {
                product_name: item.product_name.clone(),
                product_description: item.product_description.clone(),
                embedding,
            })
            .await
            .map_err(wrap)?;
        info!("Inserted catalog entry {} '{}'", entry.id, entry.product_name);
        report.inserted += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use prodmatch_store::MemoryCatalogStore;

    struct LengthEmbedder;

    #[async_trait]
    impl Embedder for LengthEmbedder {
        async fn embed_text(&self, text: &str) -> prodmatch_core::Result<Vec<f32>> {
            if text.contains("Broken") {
                return Err(Error::Embedding("quota exceeded".into()));
            }
            Ok(vec![text.len() as f32, 1.0])
        }

        fn model(&self) -> &str {
            "length"
        }
    }

    fn item(name: &str, description: &str) -> CatalogItem {
        CatalogItem {
            product_name: name.into(),
            product_description: description.into(),
        }
    }

    #[tokio::test]
    async fn test_upload_inserts_and_skips_blank() {
        let store = MemoryCatalogStore::new();
        let report = upload_catalog(
            &store,
            &LengthEmbedder,
            vec![item("Nike Air", "Sneakers"), item("", "orphan"), item("Desk", "Oak")],
        )
        .await
        .unwrap();

        assert_eq!(report, UploadReport { inserted: 2, skipped: 1 });
        let entries = store.entries();
        assert_eq!(entries[0].product_name, "Nike Air");
        assert_eq!(entries[0].embedding, vec!["Nike Air Sneakers".len() as f32, 1.0]);
        assert_eq!(entries[1].product_description, "Oak");
    }

    #[tokio::test]
    async fn test_upload_failure_names_product() {
        let store = MemoryCatalogStore::new();
        let err = upload_catalog(
            &store,
            &LengthEmbedder,
            vec![item("Desk", "Oak"), item("Broken", "thing"), item("Lamp", "Brass")],
        )
        .await
        .unwrap_err();

        assert_eq!(err.product_name, "Broken");
        assert!(matches!(err.source, Error::Embedding(_)));
        assert_eq!(store.entries().len(), 1);
    }
}
