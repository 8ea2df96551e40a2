//! Configuration loaded from the environment and validated at startup.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_API_URL: &str = "https://api.openai.com/v1/embeddings";
pub const DEFAULT_THRESHOLD: f64 = 0.1;
pub const DEFAULT_PORT: u16 = 7000;

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub model: String,
    pub api_url: String,
    /// Expected vector length; provider output is checked against it when set.
    pub dimension: Option<usize>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Capacity of the in-process embedding cache (0 disables it).
    pub cache_size: usize,
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Catalog storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `catalog.db`.
    pub data_dir: PathBuf,
    pub timeout_secs: u64,
    /// Catalog size above which a full scan logs a warning.
    pub scan_warn_rows: usize,
}

impl StorageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("catalog.db")
    }
}

/// Top-level ProdMatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProdMatchConfig {
    /// HTTP server port.
    pub port: u16,
    /// Maximum cosine distance at which two descriptions count as the same product.
    pub threshold: f64,
    pub embedding: EmbeddingConfig,
    pub storage: StorageConfig,
}

impl ProdMatchConfig {
    /// Create configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Fails if a required variable is missing or any value does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("EMBEDDING_API_KEY")
            .or_else(|| get("OPENAI_API_KEY"))
            .ok_or_else(|| {
                Error::Config("EMBEDDING_API_KEY (or OPENAI_API_KEY) must be set".into())
            })?;

        let threshold = parse_or(&get, "SIMILARITY_THRESHOLD", DEFAULT_THRESHOLD)?;
        if !(0.0..=2.0).contains(&threshold) {
            return Err(Error::Config(format!(
                "SIMILARITY_THRESHOLD must be within [0, 2], got {}",
                threshold
            )));
        }

        let dimension = match get("EMBEDDING_DIMENSION") {
            Some(raw) => Some(parse_value::<usize>("EMBEDDING_DIMENSION", &raw)?),
            None => None,
        };
        if dimension == Some(0) {
            return Err(Error::Config("EMBEDDING_DIMENSION must be positive".into()));
        }

        let embedding = EmbeddingConfig {
            api_key,
            model: get("EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.into()),
            api_url: get("EMBEDDING_API_URL").unwrap_or_else(|| DEFAULT_EMBEDDING_API_URL.into()),
            dimension,
            timeout_secs: parse_or(&get, "EMBEDDING_TIMEOUT_SECS", 30)?,
            max_retries: parse_or(&get, "EMBEDDING_MAX_RETRIES", 3)?,
            cache_size: parse_or(&get, "EMBEDDING_CACHE_SIZE", 1000)?,
        };

        let storage = StorageConfig {
            data_dir: get("PRODMATCH_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            timeout_secs: parse_or(&get, "STORAGE_TIMEOUT_SECS", 10)?,
            scan_warn_rows: parse_or(&get, "CATALOG_SCAN_WARN_ROWS", 10_000)?,
        };

        if embedding.timeout_secs == 0 || storage.timeout_secs == 0 {
            return Err(Error::Config("timeouts must be at least one second".into()));
        }

        Ok(Self {
            port: parse_or(&get, "PORT", DEFAULT_PORT)?,
            threshold,
            embedding,
            storage,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} has an invalid value: {:?}", key, raw)))
}
