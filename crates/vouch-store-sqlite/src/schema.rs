//! SQL schema for the vouch SQLite backend.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Columns shared by both contact tables, in the order rows are read.
pub const COLUMNS: &str = "id, created_at, user_id, name, email, phone, relationship, \
                           categories, photo_url, government_id_url, approval_type";

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS nominees (
    id                TEXT PRIMARY KEY,
    created_at        TEXT NOT NULL,   -- RFC 3339 UTC
    user_id           TEXT NOT NULL,
    name              TEXT NOT NULL,
    email             TEXT NOT NULL,
    phone             TEXT NOT NULL,
    relationship      TEXT NOT NULL,
    categories        TEXT NOT NULL DEFAULT '[]',   -- JSON array of names
    photo_url         TEXT NOT NULL DEFAULT '',
    government_id_url TEXT NOT NULL DEFAULT '',
    approval_type     TEXT                          -- always NULL here
);

CREATE TABLE IF NOT EXISTS trustees (
    id                TEXT PRIMARY KEY,
    created_at        TEXT NOT NULL,
    user_id           TEXT NOT NULL,
    name              TEXT NOT NULL,
    email             TEXT NOT NULL,
    phone             TEXT NOT NULL,
    relationship      TEXT NOT NULL,
    categories        TEXT NOT NULL DEFAULT '[]',
    photo_url         TEXT NOT NULL DEFAULT '',
    government_id_url TEXT NOT NULL DEFAULT '',
    approval_type     TEXT
);

CREATE INDEX IF NOT EXISTS nominees_user_idx ON nominees(user_id, created_at);
CREATE INDEX IF NOT EXISTS trustees_user_idx ON trustees(user_id, created_at);

PRAGMA user_version = 1;
";
