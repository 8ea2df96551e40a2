//! ProdMatch Ingest — bulk catalog uploads.

pub mod catalog;
pub mod upload;

pub use catalog::{load_catalog_file, parse_catalog_file, validate_catalog_items, CatalogItem};
pub use upload::{upload_catalog, UploadError, UploadReport};
