//! The `Backend` trait: vouch's view of its backend-as-a-service.
//!
//! The trait is implemented by `vouch-supabase` (hosted) and
//! `vouch-store-sqlite` (local). The controllers in this crate depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  asset::{ObjectKey, UploadFile},
  contact::{Contact, ContactKind, ContactRecord},
};

// ─── Identity ────────────────────────────────────────────────────────────────

/// The account behind the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub id:    Uuid,
  #[serde(default)]
  pub email: Option<String>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Authentication, table access and object storage behind one seam.
///
/// Every call is attempted once; retrying is the caller's decision. The
/// `Display` text of [`Backend::Error`] is shown to users verbatim, so it
/// should carry the backend's own message.
///
/// All methods return `Send` futures so operations can be spawned onto a
/// multi-threaded tokio runtime.
pub trait Backend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Auth ──────────────────────────────────────────────────────────────

  /// The signed-in account, or `None` when there is no session.
  fn current_user(
    &self,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  // ── Tables ────────────────────────────────────────────────────────────

  /// Every contact of `kind` visible to the current session, in the
  /// backend's default order.
  fn select_all(
    &self,
    kind: ContactKind,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  /// Insert a new contact. The backend assigns its `id`.
  fn insert(
    &self,
    kind: ContactKind,
    record: ContactRecord,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Replace every addressable field of contact `id`.
  fn update(
    &self,
    kind: ContactKind,
    id: Uuid,
    record: ContactRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove contact `id` permanently.
  fn delete(
    &self,
    kind: ContactKind,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Storage ───────────────────────────────────────────────────────────

  /// Store `file` under `key`.
  fn upload(
    &self,
    key: ObjectKey,
    file: UploadFile,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The public URL of an object. Assumed resolvable once `upload` succeeds.
  fn public_url(&self, key: &ObjectKey) -> String;
}
