//! Error types for `vouch-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::asset::AssetSlot;

#[derive(Debug, Error)]
pub enum Error {
  #[error("User not authenticated")]
  Unauthenticated,

  #[error("{0} is required")]
  MissingField(&'static str),

  #[error("{0} is not a valid email address")]
  InvalidEmail(String),

  #[error("{0} is not a valid phone number")]
  InvalidPhone(String),

  #[error("{value:?} is not a valid {field}")]
  InvalidOption { field: &'static str, value: String },

  #[error("this form is read-only")]
  NotEditable,

  #[error("an upload is still in progress")]
  UploadInFlight,

  #[error("{slot} must be one of: {accepted}")]
  UnsupportedFile { slot: AssetSlot, accepted: &'static str },

  #[error("file is too large: {size} bytes, the limit is {limit}")]
  FileTooLarge { size: u64, limit: usize },

  #[error("contact not found: {0}")]
  ContactNotFound(Uuid),

  /// The raw message of an error returned by a [`crate::backend::Backend`].
  #[error("{0}")]
  Backend(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  /// Wrap any backend error, keeping only its display text.
  pub fn backend(err: impl std::error::Error) -> Self {
    Self::Backend(err.to_string())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
