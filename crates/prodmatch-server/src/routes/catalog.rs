//! Catalog upload and statistics routes.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::error::ApiError;
use crate::state::AppState;
use prodmatch_ingest::{parse_catalog_file, upload_catalog, validate_catalog_items, CatalogItem};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload-catalog-file", post(upload_catalog_file))
        .route("/upload-catalog-data", post(upload_catalog_data))
        .route("/catalog/stats", get(catalog_stats))
}

/// POST /upload-catalog-file — catalog as a multipart `.json` file.
async fn upload_catalog_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        let filename = match field.file_name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        if !filename.to_lowercase().ends_with(".json") {
            return Err(ApiError::validation("File must be a JSON file"));
        }

        let bytes = field.bytes().await?;
        let items = parse_catalog_file(&bytes)?;
        return ingest(&state, items).await;
    }

    Err(ApiError::validation("JSON file must be provided"))
}

/// POST /upload-catalog-data — catalog as a raw JSON array.
async fn upload_catalog_data(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(payload) = payload?;
    let items = validate_catalog_items(payload)?;
    ingest(&state, items).await
}

async fn ingest(
    state: &AppState,
    items: Vec<CatalogItem>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = upload_catalog(state.store(), state.embedder(), items).await?;
    Ok(Json(serde_json::json!({
        "message": "Catalog uploaded successfully",
        "inserted": report.inserted,
        "skipped": report.skipped,
    })))
}

/// GET /catalog/stats — catalog size and matching settings.
async fn catalog_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entries = state.store().count().await?;
    Ok(Json(serde_json::json!({
        "entries": entries,
        "threshold": state.matcher.threshold(),
        "embeddingModel": state.embedder().model(),
        "dbPath": state.store().location(),
    })))
}
