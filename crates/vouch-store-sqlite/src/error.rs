//! Error type for `vouch-store-sqlite`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown {column} value: {value:?}")]
  UnknownOption { column: &'static str, value: String },

  /// An update or delete matched no row owned by the current user.
  #[error("no {table} row with id {id}")]
  NotFound { table: &'static str, id: uuid::Uuid },

  #[error("User not authenticated")]
  Unauthenticated,

  #[error("The resource already exists: {}", .0.display())]
  ObjectExists(PathBuf),

  #[error("invalid object path: {0:?}")]
  InvalidObjectPath(String),

  #[error("storage error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
