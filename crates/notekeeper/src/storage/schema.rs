//! `SQLite` schema definitions for the key-value store.
//!
//! The store mirrors browser storage: one table of string keys to string
//! values, plus a metadata table that tracks the schema version.

/// SQL statement to create the metadata table used for versioning.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// SQL statement to create the key-value table.
pub const CREATE_KV_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// Statements that must exist before migrations can run.
pub const BOOTSTRAP_STATEMENTS: &[&str] = &[CREATE_METADATA_TABLE];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_statements_not_empty() {
        assert!(!BOOTSTRAP_STATEMENTS.is_empty());
        for stmt in BOOTSTRAP_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_kv_table_structure() {
        assert!(CREATE_KV_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_KV_TABLE.contains("value TEXT NOT NULL"));
        assert!(CREATE_KV_TABLE.contains("updated_at TEXT NOT NULL"));
    }

    #[test]
    fn test_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}
