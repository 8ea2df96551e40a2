//! Invoice similarity checks.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;
use prodmatch_core::{LineItem, MatchResult};
use prodmatch_resolve::{check_batch, pair_with_clues};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/check-similarity", post(check_similarity))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityRequest {
    pub invoice_line_items: Vec<LineItem>,
    #[serde(default)]
    pub po_line_items: Option<Vec<LineItem>>,
}

/// Wire form of a `MatchResult`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchReport {
    MatchFound {
        invoice_description: String,
        matched_product_id: i64,
        matched_product_name: String,
        matched_product_description: String,
        distance: f64,
    },
    NoMatch {
        invoice_description: String,
        inserted_product_id: i64,
        distance: Option<f64>,
        message: String,
    },
}

impl MatchReport {
    pub fn new(invoice_description: &str, result: MatchResult) -> Self {
        match result {
            MatchResult::Matched { entry, distance } => Self::MatchFound {
                invoice_description: invoice_description.to_string(),
                matched_product_id: entry.id,
                matched_product_name: entry.product_name,
                matched_product_description: entry.product_description,
                distance,
            },
            MatchResult::NoMatch { entry, distance } => Self::NoMatch {
                invoice_description: invoice_description.to_string(),
                inserted_product_id: entry.id,
                distance,
                message: format!("Inserted '{}' into catalog", invoice_description),
            },
        }
    }
}

/// POST /check-similarity — classify each invoice line, using the PO line
/// at the same index as a clue.
async fn check_similarity(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SimilarityRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(request) = payload?;
    let items = pair_with_clues(
        &request.invoice_line_items,
        request.po_line_items.as_deref(),
    );

    let results = check_batch(&state.matcher, &items).await?;

    let matches: Vec<MatchReport> = request
        .invoice_line_items
        .iter()
        .zip(results)
        .map(|(line, result)| MatchReport::new(&line.description, result))
        .collect();

    Ok(Json(serde_json::json!({ "matches": matches })))
}
