//! OpenAI-compatible embeddings over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embedder::Embedder;
use crate::error::EmbedError;
use crate::retry::RetryPolicy;
use prodmatch_core::config::EmbeddingConfig;
use prodmatch_core::{Error, Result};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embedder backed by a remote `/v1/embeddings`-style endpoint.
pub struct ApiEmbedder {
    config: EmbeddingConfig,
    client: Client,
    retry: RetryPolicy,
}

impl ApiEmbedder {
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Embedding(format!("Failed to build HTTP client: {}", e)))?;
        let retry = RetryPolicy::new(config.max_retries);
        Ok(Self {
            config,
            client,
            retry,
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// One request, no retries.
    async fn request(&self, text: &str) -> std::result::Result<Vec<f32>, EmbedError> {
        let body = EmbeddingRequest {
            model: &self.config.model,
            input: text,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbedError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            let body = response.text().await.unwrap_or_default();
            return Err(EmbedError::from_status(status.as_u16(), body, retry_after));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::from_reqwest(&e))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbedError::InvalidResponse("response contained no embedding".into()))?;

        self.check(&embedding)?;
        Ok(embedding)
    }

    fn check(&self, embedding: &[f32]) -> std::result::Result<(), EmbedError> {
        if embedding.is_empty() {
            return Err(EmbedError::InvalidResponse("empty embedding".into()));
        }
        if let Some(expected) = self.config.dimension {
            if embedding.len() != expected {
                return Err(EmbedError::InvalidResponse(format!(
                    "expected {} dimensions, got {}",
                    expected,
                    embedding.len()
                )));
            }
        }
        if embedding.iter().any(|v| !v.is_finite()) {
            return Err(EmbedError::InvalidResponse("non-finite value in embedding".into()));
        }
        Ok(())
    }

    fn to_core_error(&self, err: EmbedError) -> Error {
        match err {
            EmbedError::Timeout => Error::Timeout {
                operation: "embedding request",
                secs: self.config.timeout_secs,
            },
            other => Error::Embedding(other.to_string()),
        }
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::Validation("cannot embed empty text".into()));
        }
        debug!("Embedding {} chars with {}", text.len(), self.config.model);
        // The budget covers every attempt and backoff; the client timeout
        // only caps a single attempt.
        let attempts = self.retry.run("embedding request", move || self.request(text));
        match tokio::time::timeout(self.config.timeout(), attempts).await {
            Ok(result) => result.map_err(|e| self.to_core_error(e)),
            Err(_) => Err(self.to_core_error(EmbedError::Timeout)),
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
