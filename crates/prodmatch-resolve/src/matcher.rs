//! Threshold matching against the catalog.
//!
//! `classify` is the pure decision: scan every entry, keep the strictly
//! smallest distance (so the earliest entry wins ties), compare against the
//! threshold. `Matcher` wraps it with the embedding call and the catalog
//! read/insert side effects.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::distance::{cosine_distance, norm};
use prodmatch_core::{CatalogEntry, Error, MatchResult, NewCatalogEntry, QueryItem, Result};
use prodmatch_infer::Embedder;
use prodmatch_store::CatalogStore;

/// Result of the pure classification step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// `catalog[index]` is within the threshold.
    Matched { index: usize, distance: f64 },
    /// Nothing within the threshold. `best` is the closest entry, if any.
    NoMatch { best: Option<(usize, f64)> },
}

/// Index and distance of the closest catalog entry, or `None` for an empty catalog.
///
/// Entries with a zero-norm embedding are skipped. A query with zero norm,
/// or an entry whose length differs from the query's, is an error.
pub fn find_closest(query: &[f32], catalog: &[CatalogEntry]) -> Result<Option<(usize, f64)>> {
    if norm(query) == 0.0 {
        return Err(Error::DegenerateVector("query embedding has zero norm".into()));
    }

    let mut best: Option<(usize, f64)> = None;
    for (index, entry) in catalog.iter().enumerate() {
        if entry.embedding.len() != query.len() {
            return Err(Error::DimensionMismatch {
                expected: query.len(),
                actual: entry.embedding.len(),
            });
        }
        let distance = match cosine_distance(query, &entry.embedding) {
            Ok(d) => d,
            Err(Error::DegenerateVector(_)) => {
                warn!("Skipping catalog entry {} with zero-norm embedding", entry.id);
                continue;
            }
            Err(e) => return Err(e),
        };
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((index, distance)),
        }
    }
    Ok(best)
}

/// Decide match vs no-match for a query vector.
pub fn classify(query: &[f32], catalog: &[CatalogEntry], threshold: f64) -> Result<Decision> {
    let best = find_closest(query, catalog)?;
    Ok(match best {
        Some((index, distance)) if distance <= threshold => Decision::Matched { index, distance },
        _ => Decision::NoMatch { best },
    })
}

/// Matching service: embeds queries, classifies them, grows the catalog.
pub struct Matcher {
    store: Arc<dyn CatalogStore>,
    embedder: Arc<dyn Embedder>,
    threshold: f64,
    scan_warn_rows: usize,
    /// Serializes fetch → decide → insert so concurrent no-matches in this
    /// process cannot both insert the same product.
    gate: Mutex<()>,
}

impl Matcher {
    pub fn new(store: Arc<dyn CatalogStore>, embedder: Arc<dyn Embedder>, threshold: f64) -> Self {
        Self {
            store,
            embedder,
            threshold,
            scan_warn_rows: 10_000,
            gate: Mutex::new(()),
        }
    }

    /// Catalog size above which each scan logs a warning.
    pub fn with_scan_warn_rows(mut self, rows: usize) -> Self {
        self.scan_warn_rows = rows;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Classify one invoice line (with its optional clue).
    ///
    /// The combined text is embedded on its own; on no-match the new entry
    /// is named after the bare description and described by the combined text.
    pub async fn check_item(&self, item: &QueryItem) -> Result<MatchResult> {
        let text = item.combined_text();
        let embedding = self.embedder.embed(&text, "").await?;
        self.classify_vector(embedding, &item.description, &text).await
    }

    /// Classify a named product, inserting it as given on no-match.
    pub async fn check_product(&self, name: &str, description: &str) -> Result<MatchResult> {
        let embedding = self.embedder.embed(name, description).await?;
        self.classify_vector(embedding, name, description).await
    }

    /// Classify an embedding against the current catalog and insert it
    /// under `product_name`/`product_description` if nothing matches.
    pub async fn classify_vector(
        &self,
        embedding: Vec<f32>,
        product_name: &str,
        product_description: &str,
    ) -> Result<MatchResult> {
        let _guard = self.gate.lock().await;

        let catalog = self.store.fetch_all().await?;
        if catalog.len() > self.scan_warn_rows {
            warn!(
                "Scanning {} catalog entries linearly; consider an indexed store",
                catalog.len()
            );
        }

        match classify(&embedding, &catalog, self.threshold)? {
            Decision::Matched { index, distance } => {
                let entry = catalog[index].clone();
                debug!(
                    "'{}' matched catalog entry {} ('{}') at distance {:.4}",
                    product_name, entry.id, entry.product_name, distance
                );
                Ok(MatchResult::Matched { entry, distance })
            }
            Decision::NoMatch { best } => {
                let entry = self
                    .store
                    .insert(NewCatalogEntry {
                        product_name: product_name.to_string(),
                        product_description: product_description.to_string(),
                        embedding,
                    })
                    .await?;
                let distance = best.map(|(_, d)| d);
                info!(
                    "No match for '{}' (best distance {:?}); inserted catalog entry {}",
                    product_name, distance, entry.id
                );
                Ok(MatchResult::NoMatch { entry, distance })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use prodmatch_store::MemoryCatalogStore;

    fn entry(id: i64, name: &str, embedding: Vec<f32>) -> CatalogEntry {
        CatalogEntry {
            id,
            product_name: name.into(),
            product_description: String::new(),
            embedding,
            created_at: 0,
        }
    }

    fn seed(name: &str, embedding: Vec<f32>) -> NewCatalogEntry {
        NewCatalogEntry {
            product_name: name.into(),
            product_description: String::new(),
            embedding,
        }
    }

    /// Maps known texts to fixed vectors.
    struct TableEmbedder(HashMap<String, Vec<f32>>);

    impl TableEmbedder {
        fn new(rows: &[(&str, Vec<f32>)]) -> Arc<Self> {
            Arc::new(Self(
                rows.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            ))
        }
    }

    #[async_trait]
    impl Embedder for TableEmbedder {
        async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
            self.0
                .get(text)
                .cloned()
                .ok_or_else(|| Error::Embedding(format!("no vector for {:?}", text)))
        }

        fn model(&self) -> &str {
            "table"
        }
    }

    #[test]
    fn test_near_match_within_threshold() {
        let catalog = vec![entry(1, "Nike Air", vec![1.0, 0.0])];
        match classify(&[0.99, 0.01], &catalog, 0.1).unwrap() {
            Decision::Matched { index, distance } => {
                assert_eq!(index, 0);
                assert!(distance < 1e-3);
            }
            other => panic!("expected match, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_catalog_never_matches() {
        assert_eq!(
            classify(&[1.0, 0.0], &[], 2.0).unwrap(),
            Decision::NoMatch { best: None }
        );
    }

    #[test]
    fn test_tie_goes_to_first_entry() {
        let catalog = vec![
            entry(10, "first", vec![1.0, 0.0]),
            entry(11, "second", vec![1.0, 0.0]),
        ];
        assert_eq!(
            classify(&[1.0, 0.0], &catalog, 0.1).unwrap(),
            Decision::Matched {
                index: 0,
                distance: 0.0
            }
        );

        let catalog = vec![
            entry(1, "far", vec![0.0, 1.0]),
            entry(2, "tie-a", vec![1.0, 1.0]),
            entry(3, "tie-b", vec![2.0, 2.0]),
        ];
        let best = find_closest(&[1.0, 1.0], &catalog).unwrap().unwrap();
        assert_eq!(best.0, 1);
    }

    #[test]
    fn test_boundary_distance_is_a_match() {
        let catalog = vec![entry(1, "orthogonal", vec![0.0, 1.0])];
        assert!(matches!(
            classify(&[1.0, 0.0], &catalog, 1.0).unwrap(),
            Decision::Matched { .. }
        ));
        assert_eq!(
            classify(&[1.0, 0.0], &catalog, 0.999).unwrap(),
            Decision::NoMatch {
                best: Some((0, 1.0))
            }
        );
    }

    #[test]
    fn test_zero_query_is_degenerate() {
        let err = classify(&[0.0, 0.0], &[], 0.1).unwrap_err();
        assert!(matches!(err, Error::DegenerateVector(_)));
    }

    #[test]
    fn test_zero_norm_entry_is_skipped() {
        let catalog = vec![
            entry(1, "broken", vec![0.0, 0.0]),
            entry(2, "good", vec![1.0, 0.0]),
        ];
        assert_eq!(
            find_closest(&[1.0, 0.0], &catalog).unwrap(),
            Some((1, 0.0))
        );
        let only_broken = vec![entry(1, "broken", vec![0.0, 0.0])];
        assert_eq!(find_closest(&[1.0, 0.0], &only_broken).unwrap(), None);
    }

    #[test]
    fn test_dimension_mismatch_in_catalog() {
        let catalog = vec![entry(1, "short", vec![1.0])];
        assert!(matches!(
            classify(&[1.0, 0.0], &catalog, 0.1),
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_match_returns_existing_entry_without_insert() {
        let store = Arc::new(MemoryCatalogStore::with_entries(vec![seed(
            "Nike Air",
            vec![1.0, 0.0],
        )]));
        let embedder = TableEmbedder::new(&[("nike air sneaker", vec![0.99, 0.01])]);
        let matcher = Matcher::new(store.clone(), embedder, 0.1);

        let result = matcher
            .check_item(&QueryItem::new("nike air sneaker"))
            .await
            .unwrap();

        assert!(result.is_match());
        assert_eq!(result.entry().product_name, "Nike Air");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_no_match_inserts_query_once() {
        let store = Arc::new(MemoryCatalogStore::new());
        let embedder = TableEmbedder::new(&[("Widget blue", vec![1.0, 0.0])]);
        let matcher = Matcher::new(store.clone(), embedder, 0.1);

        let item = QueryItem::new("Widget").with_clue("blue");
        let result = matcher.check_item(&item).await.unwrap();

        match &result {
            MatchResult::NoMatch { entry, distance } => {
                assert_eq!(entry.product_name, "Widget");
                assert_eq!(entry.product_description, "Widget blue");
                assert_eq!(entry.embedding, vec![1.0, 0.0]);
                assert_eq!(*distance, None);
            }
            other => panic!("expected no match, got {:?}", other),
        }
        assert_eq!(store.count().await.unwrap(), 1);

        // Same query again now matches what was just inserted.
        let again = matcher.check_item(&item).await.unwrap();
        assert!(again.is_match());
        assert_eq!(again.distance(), Some(0.0));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_no_match_reports_best_distance() {
        let store = Arc::new(MemoryCatalogStore::with_entries(vec![seed(
            "Nike Air",
            vec![1.0, 0.0],
        )]));
        let embedder = TableEmbedder::new(&[("Office chair", vec![0.0, 1.0])]);
        let matcher = Matcher::new(store.clone(), embedder, 0.1);

        let result = matcher.check_product("Office chair", "").await.unwrap();
        assert!(!result.is_match());
        assert!((result.distance().unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_embedding_failure_leaves_catalog_untouched() {
        let store = Arc::new(MemoryCatalogStore::new());
        let matcher = Matcher::new(store.clone(), TableEmbedder::new(&[]), 0.1);

        let err = matcher.check_item(&QueryItem::new("unknown")).await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_identical_no_matches_insert_once() {
        let store = Arc::new(MemoryCatalogStore::new());
        let embedder = TableEmbedder::new(&[("Widget", vec![0.6, 0.8])]);
        let matcher = Arc::new(Matcher::new(store.clone(), embedder, 0.1));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let matcher = matcher.clone();
                tokio::spawn(async move { matcher.check_item(&QueryItem::new("Widget")).await })
            })
            .collect();

        let mut inserted = 0;
        for handle in handles {
            if !handle.await.unwrap().unwrap().is_match() {
                inserted += 1;
            }
        }
        assert_eq!(inserted, 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
