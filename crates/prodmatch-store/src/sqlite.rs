//! SQLite-backed product catalog.
//!
//! One table, `product_catalog`, with embeddings as JSON text. Blocking
//! rusqlite calls run on the tokio blocking pool under a per-call timeout.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

use crate::catalog::CatalogStore;
use crate::embedding::{decode_embedding, encode_embedding};
use crate::schema::SCHEMA_SQL;
use prodmatch_core::config::StorageConfig;
use prodmatch_core::{CatalogEntry, Error, NewCatalogEntry, Result};

/// SQLite catalog store.
pub struct SqliteCatalogStore {
    inner: Arc<Inner>,
    /// Held by each blocking task until it finishes, including tasks whose
    /// caller has already timed out.
    in_flight: Arc<tokio::sync::Mutex<()>>,
    timeout: Duration,
}

struct Inner {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteCatalogStore {
    /// Open or create the catalog at `config.data_dir/catalog.db`.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir).map_err(|e| Error::Storage(e.to_string()))?;
        Self::open_path(config.db_path(), config.timeout())
    }

    /// Open or create the catalog at an explicit database path.
    pub fn open_path(db_path: impl AsRef<Path>, timeout: Duration) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        let conn = Self::create_connection(&db_path)?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Storage(format!("Schema init failed: {}", e)))?;

        let store = Self {
            inner: Arc::new(Inner {
                conn: Mutex::new(conn),
                db_path,
            }),
            in_flight: Arc::new(tokio::sync::Mutex::new(())),
            timeout,
        };

        info!(
            "SqliteCatalogStore initialized: {} entries, path={}",
            store.inner.count_rows()?,
            store.inner.db_path.display()
        );
        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Storage(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Storage(e.to_string()))?;
        Ok(conn)
    }

    pub fn db_path(&self) -> &Path {
        &self.inner.db_path
    }

    /// Run a blocking database operation off the async executor.
    ///
    /// On timeout the blocking task keeps running to completion and the
    /// caller gets `Error::Timeout`. Operations are queued behind any task
    /// still in flight, so a write that outlived its caller is visible to
    /// every later read.
    async fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Inner) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let in_flight = Arc::clone(&self.in_flight);
        let work = async move {
            let permit = in_flight.lock_owned().await;
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                f(&inner)
            })
            .await
        };
        match tokio::time::timeout(self.timeout, work).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(Error::Storage(format!(
                "{} task failed: {}",
                operation, join_err
            ))),
            Err(_) => {
                warn!(
                    "{} exceeded {:?}; it may still complete in the background",
                    operation, self.timeout
                );
                Err(Error::Timeout {
                    operation,
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }
}

impl Inner {
    fn load_all(&self) -> Result<Vec<CatalogEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT id, product_name, product_description, embedding, created_at
                 FROM product_catalog ORDER BY id ASC",
            )
            .map_err(|e| Error::Storage(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })
            .map_err(|e| Error::Storage(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, product_name, product_description, raw_embedding, created_at) =
                row.map_err(|e| Error::Storage(e.to_string()))?;
            let embedding = decode_embedding(&raw_embedding)
                .map_err(|e| Error::Storage(format!("catalog row {}: {}", id, e)))?;
            entries.push(CatalogEntry {
                id,
                product_name,
                product_description,
                embedding,
                created_at,
            });
        }
        debug!("Loaded {} catalog entries", entries.len());
        Ok(entries)
    }

    fn insert_row(&self, entry: NewCatalogEntry) -> Result<CatalogEntry> {
        let raw_embedding = encode_embedding(&entry.embedding)?;
        let created_at = crate::now_millis();

        let conn = self.conn.lock();
        let id = conn
            .prepare_cached(
                "INSERT INTO product_catalog (product_name, product_description, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(|e| Error::Storage(e.to_string()))?
            .insert(params![
                entry.product_name,
                entry.product_description,
                raw_embedding,
                created_at
            ])
            .map_err(|e| Error::Storage(e.to_string()))?;

        Ok(CatalogEntry {
            id,
            product_name: entry.product_name,
            product_description: entry.product_description,
            embedding: entry.embedding,
            created_at,
        })
    }

    fn count_rows(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM product_catalog", [], |row| row.get(0))
            .map_err(|e| Error::Storage(e.to_string()))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn fetch_all(&self) -> Result<Vec<CatalogEntry>> {
        self.run("catalog fetch", |inner| inner.load_all()).await
    }

    async fn insert(&self, entry: NewCatalogEntry) -> Result<CatalogEntry> {
        self.run("catalog insert", move |inner| inner.insert_row(entry))
            .await
    }

    async fn count(&self) -> Result<usize> {
        self.run("catalog count", |inner| inner.count_rows()).await
    }

    fn location(&self) -> String {
        self.inner.db_path.display().to_string()
    }
}
