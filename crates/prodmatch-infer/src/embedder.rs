//! Embedding trait.

use async_trait::async_trait;
use prodmatch_core::Result;

/// Join a product name and description into the text that gets embedded.
///
/// An empty description contributes nothing, so `("Nike Air", "")` embeds
/// exactly `"Nike Air"`.
pub fn compose_text(name: &str, description: &str) -> String {
    let name = name.trim();
    let description = description.trim();
    if description.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        description.to_string()
    } else {
        format!("{} {}", name, description)
    }
}

/// A source of fixed-dimension embeddings.
///
/// Failures surface as `Error::Embedding` or, when the provider did not
/// answer in time, `Error::Timeout`.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed an already-composed text.
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a (name, description) pair.
    async fn embed(&self, name: &str, description: &str) -> Result<Vec<f32>> {
        self.embed_text(&compose_text(name, description)).await
    }

    /// Model identifier reported in logs and stats.
    fn model(&self) -> &str;
}
