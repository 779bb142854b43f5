//! A recording in-memory [`Backend`] with switchable failures.

use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard},
};

use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::{
  asset::{ObjectKey, UploadFile},
  backend::{Backend, Identity},
  contact::{Contact, ContactKind, ContactRecord},
};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct FakeError(pub String);

/// Which operation a switched-on failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
  CurrentUser,
  SelectAll,
  Insert,
  Update,
  Delete,
  Upload,
}

/// One call observed by the fake, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  CurrentUser,
  SelectAll(ContactKind),
  Insert(ContactKind),
  Update(ContactKind, Uuid),
  Delete(ContactKind, Uuid),
  Upload(String),
}

#[derive(Default)]
struct State {
  user:     Option<Identity>,
  rows:     HashMap<ContactKind, Vec<Contact>>,
  objects:  HashMap<String, Bytes>,
  calls:    Vec<Call>,
  failures: HashMap<Op, String>,
}

#[derive(Default)]
pub struct FakeBackend {
  state: Mutex<State>,
}

impl FakeBackend {
  pub fn signed_in() -> Self {
    let backend = Self::default();
    backend.lock().user = Some(Identity { id: Uuid::new_v4(), email: None });
    backend
  }

  pub fn signed_out() -> Self { Self::default() }

  fn lock(&self) -> MutexGuard<'_, State> {
    self.state.lock().unwrap_or_else(|e| e.into_inner())
  }

  pub fn user_id(&self) -> Uuid {
    self.lock().user.as_ref().map(|u| u.id).unwrap_or_default()
  }

  pub fn rows(&self, kind: ContactKind) -> Vec<Contact> {
    self.lock().rows.get(&kind).cloned().unwrap_or_default()
  }

  pub fn calls(&self) -> Vec<Call> { self.lock().calls.clone() }

  pub fn clear_calls(&self) { self.lock().calls.clear(); }

  pub fn object_count(&self) -> usize { self.lock().objects.len() }

  /// Make every `op` fail with `message` until [`Self::recover`].
  pub fn fail(&self, op: Op, message: &str) {
    self.lock().failures.insert(op, message.to_owned());
  }

  pub fn recover(&self, op: Op) { self.lock().failures.remove(&op); }

  fn record(&self, call: Call, op: Op) -> Result<MutexGuard<'_, State>, FakeError> {
    let mut state = self.lock();
    state.calls.push(call);
    if let Some(message) = state.failures.get(&op).cloned() {
      return Err(FakeError(message));
    }
    Ok(state)
  }
}

impl Backend for FakeBackend {
  type Error = FakeError;

  async fn current_user(&self) -> Result<Option<Identity>, FakeError> {
    let state = self.record(Call::CurrentUser, Op::CurrentUser)?;
    Ok(state.user.clone())
  }

  async fn select_all(&self, kind: ContactKind) -> Result<Vec<Contact>, FakeError> {
    let state = self.record(Call::SelectAll(kind), Op::SelectAll)?;
    Ok(state.rows.get(&kind).cloned().unwrap_or_default())
  }

  async fn insert(
    &self,
    kind: ContactKind,
    record: ContactRecord,
  ) -> Result<Contact, FakeError> {
    let mut state = self.record(Call::Insert(kind), Op::Insert)?;
    let contact = Contact::from_record(Uuid::new_v4(), Some(Utc::now()), record);
    state.rows.entry(kind).or_default().push(contact.clone());
    Ok(contact)
  }

  async fn update(
    &self,
    kind: ContactKind,
    id: Uuid,
    record: ContactRecord,
  ) -> Result<(), FakeError> {
    let mut state = self.record(Call::Update(kind, id), Op::Update)?;
    let row = state
      .rows
      .entry(kind)
      .or_default()
      .iter_mut()
      .find(|c| c.id == id)
      .ok_or_else(|| FakeError(format!("no {} row with id {id}", kind.table())))?;
    *row = Contact::from_record(id, row.created_at, record);
    Ok(())
  }

  async fn delete(&self, kind: ContactKind, id: Uuid) -> Result<(), FakeError> {
    let mut state = self.record(Call::Delete(kind, id), Op::Delete)?;
    state.rows.entry(kind).or_default().retain(|c| c.id != id);
    Ok(())
  }

  async fn upload(&self, key: ObjectKey, file: UploadFile) -> Result<(), FakeError> {
    let path = format!("{}/{}", key.bucket, key.path);
    let mut state = self.record(Call::Upload(path.clone()), Op::Upload)?;
    state.objects.insert(path, file.bytes);
    Ok(())
  }

  fn public_url(&self, key: &ObjectKey) -> String {
    format!("https://storage.test/{}/{}", key.bucket, key.path)
  }
}
