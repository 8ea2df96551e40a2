//! ProdMatch Infer — embedding providers.
//!
//! Provides the `Embedder` trait for turning product text into vectors.
//! `ApiEmbedder` calls an OpenAI-compatible embeddings endpoint with
//! bounded retries; `CachedEmbedder` memoizes any embedder in process.

pub mod api;
pub mod cache;
pub mod embedder;
pub mod error;
pub mod retry;

pub use api::ApiEmbedder;
pub use cache::{CachedEmbedder, EmbeddingCache};
pub use embedder::{compose_text, Embedder};
pub use error::EmbedError;
pub use retry::RetryPolicy;

use std::sync::Arc;
use std::time::Duration;

use prodmatch_core::config::EmbeddingConfig;
use prodmatch_core::Result;

/// Time-to-live for cached embeddings.
const CACHE_TTL: Duration = Duration::from_secs(3600);

/// Create the configured embedder, wrapped in a cache unless disabled.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    let api = ApiEmbedder::new(config.clone())?;
    tracing::info!(
        "Using embedding model {} at {} (timeout={}s per call, retries={})",
        config.model,
        config.api_url,
        config.timeout_secs,
        config.max_retries
    );

    if config.cache_size == 0 {
        return Ok(Arc::new(api));
    }
    let cache = EmbeddingCache::new(config.cache_size, CACHE_TTL);
    Ok(Arc::new(CachedEmbedder::new(api, cache)))
}
