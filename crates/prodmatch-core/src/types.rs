//! Catalog entries, query items and match results.

use serde::{Deserialize, Serialize};

/// A product row in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub product_name: String,
    pub product_description: String,
    /// Embedding vector; every entry compared in one scan has the same length.
    #[serde(skip_serializing)]
    pub embedding: Vec<f32>,
    /// Insertion time, milliseconds since the Unix epoch.
    pub created_at: i64,
}

/// A catalog row that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCatalogEntry {
    pub product_name: String,
    pub product_description: String,
    pub embedding: Vec<f32>,
}

/// An invoice or purchase-order line item as it arrives over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub price: f64,
}

/// A description to classify, with optional clue text appended before embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryItem {
    pub description: String,
    pub clue: Option<String>,
}

impl QueryItem {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            clue: None,
        }
    }

    pub fn with_clue(mut self, clue: impl Into<String>) -> Self {
        self.clue = Some(clue.into());
        self
    }

    /// The text that gets embedded: description, then the clue if it is non-empty.
    pub fn combined_text(&self) -> String {
        match self.clue.as_deref() {
            Some(clue) if !clue.is_empty() => format!("{} {}", self.description, clue),
            _ => self.description.clone(),
        }
    }
}

/// Outcome of classifying one query against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// An existing entry lies within the threshold.
    Matched { entry: CatalogEntry, distance: f64 },
    /// Nothing lies within the threshold; `entry` was inserted into the catalog.
    /// `distance` is the best distance seen, `None` if the catalog was empty.
    NoMatch {
        entry: CatalogEntry,
        distance: Option<f64>,
    },
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub fn entry(&self) -> &CatalogEntry {
        match self {
            Self::Matched { entry, .. } | Self::NoMatch { entry, .. } => entry,
        }
    }

    pub fn distance(&self) -> Option<f64> {
        match self {
            Self::Matched { distance, .. } => Some(*distance),
            Self::NoMatch { distance, .. } => *distance,
        }
    }
}
