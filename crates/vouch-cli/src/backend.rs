//! Runtime backend selection.

use uuid::Uuid;
use vouch_core::{
  asset::{ObjectKey, UploadFile},
  backend::{Backend, Identity},
  contact::{Contact, ContactKind, ContactRecord},
};
use vouch_store_sqlite::SqliteBackend;
use vouch_supabase::SupabaseBackend;

/// Either backend, chosen from settings at startup.
///
/// Cheap to clone, so uploads can be handed to spawned tasks.
#[derive(Clone)]
pub enum AnyBackend {
  Local(SqliteBackend),
  Supabase(SupabaseBackend),
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
  #[error(transparent)]
  Local(#[from] vouch_store_sqlite::Error),

  #[error(transparent)]
  Supabase(#[from] vouch_supabase::Error),
}

impl AnyBackend {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Local(_) => "local",
      Self::Supabase(_) => "supabase",
    }
  }
}

impl Backend for AnyBackend {
  type Error = BackendError;

  async fn current_user(&self) -> Result<Option<Identity>, BackendError> {
    Ok(match self {
      Self::Local(b) => b.current_user().await?,
      Self::Supabase(b) => b.current_user().await?,
    })
  }

  async fn select_all(&self, kind: ContactKind) -> Result<Vec<Contact>, BackendError> {
    Ok(match self {
      Self::Local(b) => b.select_all(kind).await?,
      Self::Supabase(b) => b.select_all(kind).await?,
    })
  }

  async fn insert(
    &self,
    kind: ContactKind,
    record: ContactRecord,
  ) -> Result<Contact, BackendError> {
    Ok(match self {
      Self::Local(b) => b.insert(kind, record).await?,
      Self::Supabase(b) => b.insert(kind, record).await?,
    })
  }

  async fn update(
    &self,
    kind: ContactKind,
    id: Uuid,
    record: ContactRecord,
  ) -> Result<(), BackendError> {
    match self {
      Self::Local(b) => b.update(kind, id, record).await?,
      Self::Supabase(b) => b.update(kind, id, record).await?,
    }
    Ok(())
  }

  async fn delete(&self, kind: ContactKind, id: Uuid) -> Result<(), BackendError> {
    match self {
      Self::Local(b) => b.delete(kind, id).await?,
      Self::Supabase(b) => b.delete(kind, id).await?,
    }
    Ok(())
  }

  async fn upload(&self, key: ObjectKey, file: UploadFile) -> Result<(), BackendError> {
    match self {
      Self::Local(b) => b.upload(key, file).await?,
      Self::Supabase(b) => b.upload(key, file).await?,
    }
    Ok(())
  }

  fn public_url(&self, key: &ObjectKey) -> String {
    match self {
      Self::Local(b) => b.public_url(key),
      Self::Supabase(b) => b.public_url(key),
    }
  }
}
