pub const SCHEMA: &str = r#"
-- durable key/value records, each value a whole JSON document or timestamp
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

// Durable keys
pub const CREATORS_KEY: &str = "creators";
pub const DAILY_STATUS_KEY: &str = "daily_status";
pub const LAST_RESET_AT_KEY: &str = "last_reset_at";

// Session keys
pub const PENDING_CREATOR_KEY: &str = "pending_creator_id";
