//! Database schema

pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

pub const UPSERT_PREFERENCE: &str = r"
INSERT INTO preferences (key, value, updated_at)
VALUES (?1, ?2, ?3)
ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
";

pub const SELECT_PREFERENCE: &str = "SELECT value FROM preferences WHERE key = ?1";
