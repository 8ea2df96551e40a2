//! Batch similarity check over invoice lines.
//!
//! Items run one after another against a freshly fetched catalog, so a
//! line sees entries inserted by earlier lines of the same batch. The first
//! failure stops the batch; entries inserted before it stay in the catalog.

use thiserror::Error;
use tracing::debug;

use crate::matcher::Matcher;
use prodmatch_core::{Error, LineItem, MatchResult, QueryItem};

/// A batch item failed; `index` is its position in the input.
#[derive(Error, Debug)]
#[error("line item {index} failed: {source}")]
pub struct BatchError {
    pub index: usize,
    #[source]
    pub source: Error,
}

/// Pair invoice lines with the purchase-order line at the same index, if any.
pub fn pair_with_clues(
    invoice: &[LineItem],
    purchase_order: Option<&[LineItem]>,
) -> Vec<QueryItem> {
    invoice
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let item = QueryItem::new(line.description.clone());
            match purchase_order.and_then(|po| po.get(i)) {
                Some(clue) => item.with_clue(clue.description.clone()),
                None => item,
            }
        })
        .collect()
}

/// Classify every item in order. Output index `i` belongs to input index `i`.
pub async fn check_batch(
    matcher: &Matcher,
    items: &[QueryItem],
) -> std::result::Result<Vec<MatchResult>, BatchError> {
    let mut results = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let result = matcher
            .check_item(item)
            .await
            .map_err(|source| BatchError { index, source })?;
        debug!("Batch item {} matched={}", index, result.is_match());
        results.push(result);
    }
    Ok(results)
}
