//! Shared application state.

use std::sync::Arc;

use prodmatch_core::ProdMatchConfig;
use prodmatch_infer::Embedder;
use prodmatch_resolve::Matcher;
use prodmatch_store::CatalogStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: ProdMatchConfig,
    pub matcher: Matcher,
}

impl AppState {
    pub fn new(
        config: ProdMatchConfig,
        store: Arc<dyn CatalogStore>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        let matcher = Matcher::new(store, embedder, config.threshold)
            .with_scan_warn_rows(config.storage.scan_warn_rows);
        Self { config, matcher }
    }

    pub fn store(&self) -> &dyn CatalogStore {
        self.matcher.store().as_ref()
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.matcher.embedder().as_ref()
    }
}
