//! Database schema SQL.

/// The catalog table. `embedding` holds a JSON array of floats.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS product_catalog (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_name TEXT NOT NULL,
    product_description TEXT NOT NULL,
    embedding TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
"#;
