//! Error type for `vouch-supabase`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A non-2xx response. Displays the server's own message only, so it can
  /// be shown to users as-is.
  #[error("{message}")]
  Api { status: u16, message: String },

  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// An update or delete matched no row visible to the session.
  #[error("no {table} row with id {id}")]
  NotFound { table: &'static str, id: uuid::Uuid },

  #[error("the server returned no row for the new {0} record")]
  EmptyResponse(&'static str),
}

impl Error {
  /// Extract the most specific message from an error response body.
  ///
  /// GoTrue, PostgREST and Storage each name the field differently; when
  /// the body is not JSON the raw text is used.
  pub(crate) fn from_body(status: u16, body: &str) -> Self {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
      .ok()
      .and_then(|v| {
        ["message", "msg", "error_description", "error"]
          .iter()
          .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_owned))
      });
    let message = match from_json {
      Some(m) => m,
      None if body.trim().is_empty() => format!("request failed with status {status}"),
      None => body.trim().to_owned(),
    };
    Self::Api { status, message }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
