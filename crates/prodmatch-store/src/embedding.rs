//! JSON codec for embeddings stored in a text column.

use prodmatch_core::{Error, Result};

/// Serialize an embedding as a JSON array of floats.
pub fn encode_embedding(embedding: &[f32]) -> Result<String> {
    if let Some(pos) = embedding.iter().position(|v| !v.is_finite()) {
        return Err(Error::Storage(format!(
            "embedding has a non-finite value at index {}",
            pos
        )));
    }
    Ok(serde_json::to_string(embedding)?)
}

/// Parse an embedding column. Accepts a JSON array, or a JSON string that
/// itself contains a JSON array (rows written by clients that double-encode).
pub fn decode_embedding(raw: &str) -> Result<Vec<f32>> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| Error::Storage(format!("embedding column is not JSON: {}", e)))?;
    let value = match value {
        serde_json::Value::String(inner) => serde_json::from_str(&inner)
            .map_err(|e| Error::Storage(format!("embedding column is not JSON: {}", e)))?,
        other => other,
    };
    serde_json::from_value(value)
        .map_err(|e| Error::Storage(format!("embedding column is not a float array: {}", e)))
}
