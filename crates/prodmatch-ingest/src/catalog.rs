//! Parsing and validation of catalog payloads.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use prodmatch_core::{Error, Result};

/// One product in an uploaded catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub product_name: String,
    pub product_description: String,
}

impl CatalogItem {
    /// Items with a blank name or description are not embedded.
    pub fn is_blank(&self) -> bool {
        self.product_name.trim().is_empty() || self.product_description.trim().is_empty()
    }
}

/// Strictly validate a raw JSON payload: a non-empty array whose elements
/// all carry string `product_name` and `product_description` fields.
pub fn validate_catalog_items(payload: serde_json::Value) -> Result<Vec<CatalogItem>> {
    let values = match payload {
        serde_json::Value::Array(values) => values,
        _ => return Err(Error::Validation("Catalog data must be a JSON array".into())),
    };
    if values.is_empty() {
        return Err(Error::Validation("Catalog data must be provided".into()));
    }

    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            serde_json::from_value::<CatalogItem>(value).map_err(|_| {
                Error::Validation(format!(
                    "Invalid catalog data: item {} must be an object with 'product_name' and 'product_description'",
                    i
                ))
            })
        })
        .collect()
}

/// Parse an uploaded catalog file. The document must be a non-empty JSON
/// array; elements that are not well-formed products are skipped.
pub fn parse_catalog_file(bytes: &[u8]) -> Result<Vec<CatalogItem>> {
    let payload: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| Error::Validation(format!("Invalid JSON format: {}", e)))?;
    let values = match payload {
        serde_json::Value::Array(values) => values,
        _ => return Err(Error::Validation("Catalog file must contain a JSON array".into())),
    };
    if values.is_empty() {
        return Err(Error::Validation("Catalog file is empty".into()));
    }

    let items = values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value::<CatalogItem>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping invalid catalog item {}: {}", i, e);
                None
            }
        })
        .collect();
    Ok(items)
}

/// Read and parse a catalog file from disk.
pub fn load_catalog_file(path: &Path) -> Result<Vec<CatalogItem>> {
    let bytes = std::fs::read(path)?;
    parse_catalog_file(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_accepts_products() {
        let items = validate_catalog_items(json!([
            {"product_name": "Nike Air", "product_description": "Sneakers"},
            {"product_name": "Desk", "product_description": "Oak desk", "sku": "D-1"},
        ]))
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].product_name, "Desk");
    }

    #[test]
    fn test_validate_rejects_missing_field() {
        let err = validate_catalog_items(json!([
            {"product_name": "Nike Air", "product_description": "Sneakers"},
            {"product_name": "Desk"},
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("item 1"));
    }

    #[test]
    fn test_validate_rejects_empty_and_non_array() {
        assert!(matches!(validate_catalog_items(json!([])), Err(Error::Validation(_))));
        assert!(matches!(
            validate_catalog_items(json!({"product_name": "x"})),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_file_skips_malformed_items() {
        let bytes = br#"[
            {"product_name": "Nike Air", "product_description": "Sneakers"},
            {"name": "wrong shape"},
            42
        ]"#;
        let items = parse_catalog_file(bytes).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_file_rejects_invalid_json() {
        let err = parse_catalog_file(b"{not json").unwrap_err();
        assert!(err.to_string().contains("Invalid JSON format"));
    }

    #[test]
    fn test_blank_items() {
        let item = CatalogItem {
            product_name: "Nike Air".into(),
            product_description: "  ".into(),
        };
        assert!(item.is_blank());
    }

    #[test]
    fn test_load_catalog_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{"product_name": "Nike Air", "product_description": "Sneakers"}]"#,
        )
        .unwrap();
        assert_eq!(load_catalog_file(&path).unwrap().len(), 1);
        assert!(matches!(
            load_catalog_file(&dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));
    }
}
