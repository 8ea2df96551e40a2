//! LRU cache for embedding results.
//!
//! Repeated invoice lines and re-uploaded catalog rows are common; the
//! provider is deterministic for a given model, so identical text can reuse
//! the previous vector until the TTL expires.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::embedder::Embedder;
use prodmatch_core::Result;

struct CacheEntry {
    embedding: Vec<f32>,
    inserted_at: Instant,
}

/// Thread-safe LRU cache keyed by embedded text.
pub struct EmbeddingCache {
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    order: Vec<String>,
    max_size: usize,
    ttl: Duration,
}

impl EmbeddingCache {
    /// Create a new cache with the given capacity and TTL.
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::with_capacity(max_size),
                order: Vec::with_capacity(max_size),
                max_size,
                ttl,
            }),
        }
    }

    /// Get a cached embedding. Returns None on miss or expired entry.
    pub fn get(&self, text: &str) -> Option<Vec<f32>> {
        let mut inner = self.inner.lock();
        let ttl = inner.ttl;

        let (embedding, expired) = match inner.entries.get(text) {
            Some(entry) => (entry.embedding.clone(), entry.inserted_at.elapsed() >= ttl),
            None => return None,
        };

        if let Some(pos) = inner.order.iter().position(|k| k == text) {
            inner.order.remove(pos);
        }
        if expired {
            inner.entries.remove(text);
            return None;
        }
        inner.order.push(text.to_string());
        Some(embedding)
    }

    /// Insert an embedding, evicting the least recently used entry when full.
    pub fn put(&self, text: String, embedding: Vec<f32>) {
        let mut inner = self.inner.lock();
        if inner.max_size == 0 {
            return;
        }

        inner.order.retain(|k| k != &text);
        if !inner.entries.contains_key(&text) {
            while inner.entries.len() >= inner.max_size && !inner.order.is_empty() {
                let oldest = inner.order.remove(0);
                inner.entries.remove(&oldest);
            }
        }

        inner.order.push(text.clone());
        inner.entries.insert(
            text,
            CacheEntry {
                embedding,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Wraps an embedder with an `EmbeddingCache`.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: EmbeddingCache,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E, cache: EmbeddingCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }
}

#[async_trait]
impl<E: Embedder> Embedder for CachedEmbedder<E> {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(hit) = self.cache.get(text) {
            debug!("Embedding cache hit");
            return Ok(hit);
        }
        let embedding = self.inner.embed_text(text).await?;
        self.cache.put(text.to_string(), embedding.clone());
        Ok(embedding)
    }

    fn model(&self) -> &str {
        self.inner.model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_cache_hit_and_miss() {
        let cache = EmbeddingCache::new(10, Duration::from_secs(3600));
        assert!(cache.get("hello").is_none());

        cache.put("hello".into(), vec![1.0, 2.0, 3.0]);
        assert_eq!(cache.get("hello"), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_evicts_least_recently_used() {
        let cache = EmbeddingCache::new(2, Duration::from_secs(3600));
        cache.put("a".into(), vec![1.0]);
        cache.put("b".into(), vec![2.0]);

        // Touch "a" so "b" becomes the eviction candidate
        assert!(cache.get("a").is_some());
        cache.put("c".into(), vec![3.0]);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_cache_ttl_expiry() {
        let cache = EmbeddingCache::new(10, Duration::from_millis(1));
        cache.put("ephemeral".into(), vec![1.0]);

        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("ephemeral").is_none());
        assert!(cache.is_empty());
    }

    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32, 1.0])
        }

        fn model(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_cached_embedder_calls_inner_once_per_text() {
        let embedder = CachedEmbedder::new(
            CountingEmbedder {
                calls: AtomicUsize::new(0),
            },
            EmbeddingCache::new(10, Duration::from_secs(60)),
        );

        let first = embedder.embed("Nike Air", "").await.unwrap();
        let second = embedder.embed("Nike Air", "").await.unwrap();
        embedder.embed("Adidas", "").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(embedder.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(embedder.model(), "counting");
    }
}
