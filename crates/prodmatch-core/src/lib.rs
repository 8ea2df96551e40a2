//! ProdMatch Core — configuration, error taxonomy, catalog data types.

pub mod config;
pub mod error;
pub mod types;

pub use config::ProdMatchConfig;
pub use error::{Error, Result};
pub use types::{CatalogEntry, LineItem, MatchResult, NewCatalogEntry, QueryItem};
