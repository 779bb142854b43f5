//! The contact list: fetching, searching, deleting and hosting the form.

use uuid::Uuid;

use crate::{
  Error, Result,
  backend::Backend,
  contact::{Contact, ContactKind},
  dialog::{ConfirmDialog, Notice},
  filter::filter_contacts,
  form::FormController,
};

// ─── Empty states ────────────────────────────────────────────────────────────

/// Why the list has nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
  /// The first fetch has not completed yet.
  Loading,
  /// The table holds no contacts at all.
  NoRecords,
  /// There are contacts, but none match the search term.
  NoMatches,
}

impl EmptyState {
  /// Headline and hint text for `kind`.
  pub fn message(self, kind: ContactKind) -> (String, String) {
    let plural = kind.plural().to_lowercase();
    let singular = kind.label().to_lowercase();
    match self {
      Self::Loading => (format!("Loading {plural}..."), String::new()),
      Self::NoRecords => (
        format!("No {plural} yet"),
        format!("Get started by adding your first {singular}."),
      ),
      Self::NoMatches => (
        format!("No matching {plural}"),
        "Try adjusting your search criteria.".to_owned(),
      ),
    }
  }
}

// ─── Controller ──────────────────────────────────────────────────────────────

/// State of one contact list page.
#[derive(Debug)]
pub struct ListController {
  kind:           ContactKind,
  contacts:       Vec<Contact>,
  loading:        bool,
  search:         String,
  /// Position within [`Self::visible`].
  cursor:         usize,
  form:           Option<FormController>,
  pending_delete: Option<ConfirmDialog<Uuid>>,
  notice:         Option<Notice>,
  /// The most recent fetch or delete failure; non-blocking.
  last_error:     Option<String>,
}

impl ListController {
  /// A list that has not fetched yet.
  pub fn new(kind: ContactKind) -> Self {
    Self {
      kind,
      contacts: Vec::new(),
      loading: true,
      search: String::new(),
      cursor: 0,
      form: None,
      pending_delete: None,
      notice: None,
      last_error: None,
    }
  }

  // ── Accessors ─────────────────────────────────────────────────────────

  pub fn kind(&self) -> ContactKind { self.kind }

  /// Every fetched contact, unfiltered.
  pub fn contacts(&self) -> &[Contact] { &self.contacts }

  pub fn is_loading(&self) -> bool { self.loading }

  pub fn search(&self) -> &str { &self.search }

  pub fn form(&self) -> Option<&FormController> { self.form.as_ref() }

  pub fn form_mut(&mut self) -> Option<&mut FormController> { self.form.as_mut() }

  pub fn pending_delete(&self) -> Option<&ConfirmDialog<Uuid>> {
    self.pending_delete.as_ref()
  }

  pub fn notice(&self) -> Option<&Notice> { self.notice.as_ref() }

  pub fn last_error(&self) -> Option<&str> { self.last_error.as_deref() }

  /// Contacts matching the current search term, recomputed on every call.
  pub fn visible(&self) -> Vec<&Contact> { filter_contacts(&self.contacts, &self.search) }

  /// Why nothing is shown, or `None` when there is something to show.
  pub fn empty_state(&self) -> Option<EmptyState> {
    if self.loading {
      Some(EmptyState::Loading)
    } else if self.contacts.is_empty() {
      Some(EmptyState::NoRecords)
    } else if self.visible().is_empty() {
      Some(EmptyState::NoMatches)
    } else {
      None
    }
  }

  // ── Fetching ──────────────────────────────────────────────────────────

  /// Replace the list with a full fetch.
  ///
  /// On failure the previous contents are kept and the error is logged and
  /// remembered in [`Self::last_error`].
  pub async fn refresh<B: Backend>(&mut self, backend: &B) -> Result<()> {
    let result = backend.select_all(self.kind).await;
    self.loading = false;
    match result {
      Ok(contacts) => {
        tracing::debug!(table = self.kind.table(), count = contacts.len(), "fetched contacts");
        self.contacts = contacts;
        self.last_error = None;
        self.clamp_cursor();
        Ok(())
      }
      Err(e) => {
        tracing::error!(table = self.kind.table(), error = %e, "failed to fetch contacts");
        self.last_error = Some(e.to_string());
        Err(Error::backend(e))
      }
    }
  }

  // ── Search & cursor ───────────────────────────────────────────────────

  pub fn set_search(&mut self, term: impl Into<String>) {
    self.search = term.into();
    self.cursor = 0;
  }

  pub fn push_search(&mut self, c: char) {
    self.search.push(c);
    self.cursor = 0;
  }

  pub fn pop_search(&mut self) {
    self.search.pop();
    self.cursor = 0;
  }

  pub fn clear_search(&mut self) { self.set_search(String::new()); }

  pub fn cursor(&self) -> usize { self.cursor }

  /// Move the cursor by `delta`, staying within the visible list.
  pub fn move_cursor(&mut self, delta: isize) {
    let len = self.visible().len();
    if len == 0 {
      self.cursor = 0;
      return;
    }
    self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
  }

  /// The contact under the cursor.
  pub fn selected(&self) -> Option<&Contact> { self.visible().get(self.cursor).copied() }

  fn clamp_cursor(&mut self) {
    let len = self.visible().len();
    self.cursor = self.cursor.min(len.saturating_sub(1));
  }

  fn find(&self, id: Uuid) -> Result<Contact> {
    self
      .contacts
      .iter()
      .find(|c| c.id == id)
      .cloned()
      .ok_or(Error::ContactNotFound(id))
  }

  // ── Form ──────────────────────────────────────────────────────────────

  /// Open a blank form; any previous selection is discarded.
  pub fn open_create(&mut self) { self.form = Some(FormController::create(self.kind)); }

  /// Open an editable form for contact `id`.
  pub fn open_edit(&mut self, id: Uuid) -> Result<()> {
    let contact = self.find(id)?;
    self.form = Some(FormController::edit(self.kind, contact));
    Ok(())
  }

  /// Open a read-only form for contact `id`.
  pub fn open_view(&mut self, id: Uuid) -> Result<()> {
    let contact = self.find(id)?;
    self.form = Some(FormController::view(self.kind, contact));
    Ok(())
  }

  /// Submit the open form. On success the confirmation is raised and the
  /// form is closed; on failure the form stays open with its error.
  pub async fn submit_form<B: Backend>(&mut self, backend: &B) -> Result<()> {
    let Some(form) = self.form.as_mut() else {
      return Ok(());
    };
    let message = form.submit(backend).await?;
    self.notice = Some(Notice::new(message));
    self.close_form(backend).await;
    Ok(())
  }

  /// Close the form, saved or not, and refetch the whole list.
  ///
  /// A failed refetch is already logged and kept in [`Self::last_error`].
  pub async fn close_form<B: Backend>(&mut self, backend: &B) {
    self.form = None;
    let _ = self.refresh(backend).await;
  }

  // ── Delete ────────────────────────────────────────────────────────────

  /// Ask for confirmation before deleting contact `id`.
  ///
  /// Returns `false` if another confirmation is already pending or the
  /// contact is unknown.
  pub fn request_delete(&mut self, id: Uuid) -> bool {
    if self.pending_delete.is_some() || self.find(id).is_err() {
      return false;
    }
    self.pending_delete = Some(ConfirmDialog::new(self.kind.delete_prompt(), id));
    true
  }

  pub fn cancel_delete(&mut self) {
    if let Some(dialog) = self.pending_delete.take() {
      dialog.cancel();
    }
  }

  /// Delete the contact awaiting confirmation.
  ///
  /// On success exactly that contact is dropped from the in-memory list
  /// without a refetch.
  pub async fn confirm_delete<B: Backend>(&mut self, backend: &B) -> Result<()> {
    let Some(dialog) = self.pending_delete.take() else {
      return Ok(());
    };
    let id = dialog.confirm();

    match backend.delete(self.kind, id).await {
      Ok(()) => {
        self.contacts.retain(|c| c.id != id);
        self.notice = Some(Notice::new(self.kind.deleted_message()));
        self.last_error = None;
        self.clamp_cursor();
        Ok(())
      }
      Err(e) => {
        tracing::error!(table = self.kind.table(), %id, error = %e, "failed to delete contact");
        self.last_error = Some(e.to_string());
        Err(Error::backend(e))
      }
    }
  }

  // ── Notice ────────────────────────────────────────────────────────────

  pub fn dismiss_notice(&mut self) { self.notice = None; }
}
