//! Local SQLite backend for vouch.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Uploaded objects are written to a
//! directory on disk and addressed by `file://` URLs.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteBackend;
