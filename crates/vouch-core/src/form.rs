//! The contact form: create / edit / view state, uploads and submission.
//!
//! A [`FormController`] owns a [`ContactDraft`] and never touches the list
//! it was opened from; the list only sees the result of a successful
//! [`FormController::submit`].

use std::{
  collections::{HashMap, HashSet},
  str::FromStr,
  sync::atomic::{AtomicU64, Ordering},
};

use crate::{
  Error, Result,
  asset::{AssetSlot, ObjectKey, UploadFile},
  backend::Backend,
  contact::{CHANGES_SAVED_MESSAGE, Contact, ContactDraft, ContactKind, DraftEdit},
  schema::{EntitySchema, Field},
};

// ─── Identity & mode ─────────────────────────────────────────────────────────

static NEXT_FORM_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one opened form, so results of work started by a form that
/// has since been closed can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormId(u64);

impl FormId {
  fn next() -> Self { Self(NEXT_FORM_ID.fetch_add(1, Ordering::Relaxed)) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
  /// No existing contact; every field editable.
  Create,
  /// Existing contact; every field editable.
  Edit,
  /// Existing contact; everything disabled except close.
  View,
}

// ─── Uploads ─────────────────────────────────────────────────────────────────

/// An upload that has been accepted by a form but not yet sent.
///
/// Running it needs only the backend, so uploads for both slots can be in
/// flight at the same time while the form stays responsive.
#[derive(Debug)]
pub struct PendingUpload {
  form: FormId,
  slot: AssetSlot,
  key:  ObjectKey,
  file: UploadFile,
}

/// The result of a [`PendingUpload`], to be handed back to its form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
  pub form:   FormId,
  pub slot:   AssetSlot,
  /// The public URL on success, the backend's message on failure.
  pub result: std::result::Result<String, String>,
}

impl PendingUpload {
  pub fn form(&self) -> FormId { self.form }

  pub fn slot(&self) -> AssetSlot { self.slot }

  /// Upload the file and resolve its public URL.
  pub async fn run<B: Backend>(self, backend: &B) -> UploadOutcome {
    let Self { form, slot, key, file } = self;
    let result = match backend.upload(key.clone(), file).await {
      Ok(()) => Ok(backend.public_url(&key)),
      Err(e) => {
        tracing::warn!(bucket = key.bucket, path = %key.path, error = %e, "upload failed");
        Err(e.to_string())
      }
    };
    UploadOutcome { form, slot, result }
  }
}

// ─── Controller ──────────────────────────────────────────────────────────────

/// State of one open contact form.
#[derive(Debug)]
pub struct FormController {
  id:            FormId,
  kind:          ContactKind,
  mode:          FormMode,
  existing:      Option<Contact>,
  draft:         ContactDraft,
  /// What the photo slot currently shows; may point at a local file while
  /// its upload is in flight.
  photo_preview: Option<String>,
  uploading:     HashSet<AssetSlot>,
  slot_errors:   HashMap<AssetSlot, String>,
  /// The single inline message slot for submission failures.
  error:         Option<String>,
}

impl FormController {
  fn new(kind: ContactKind, mode: FormMode, existing: Option<Contact>) -> Self {
    let draft = match &existing {
      Some(contact) => ContactDraft::from_contact(kind, contact),
      None => ContactDraft::empty(kind),
    };
    let photo_preview = (!draft.photo_url.is_empty()).then(|| draft.photo_url.clone());
    Self {
      id: FormId::next(),
      kind,
      mode,
      existing,
      draft,
      photo_preview,
      uploading: HashSet::new(),
      slot_errors: HashMap::new(),
      error: None,
    }
  }

  /// A blank form for a new contact.
  pub fn create(kind: ContactKind) -> Self { Self::new(kind, FormMode::Create, None) }

  /// An editable form pre-populated from `contact`.
  pub fn edit(kind: ContactKind, contact: Contact) -> Self {
    Self::new(kind, FormMode::Edit, Some(contact))
  }

  /// A read-only form showing `contact`.
  pub fn view(kind: ContactKind, contact: Contact) -> Self {
    Self::new(kind, FormMode::View, Some(contact))
  }

  // ── Accessors ─────────────────────────────────────────────────────────

  pub fn id(&self) -> FormId { self.id }

  pub fn kind(&self) -> ContactKind { self.kind }

  pub fn mode(&self) -> FormMode { self.mode }

  pub fn schema(&self) -> &'static EntitySchema { self.kind.schema() }

  pub fn existing(&self) -> Option<&Contact> { self.existing.as_ref() }

  pub fn draft(&self) -> &ContactDraft { &self.draft }

  pub fn error(&self) -> Option<&str> { self.error.as_deref() }

  pub fn slot_error(&self, slot: AssetSlot) -> Option<&str> {
    self.slot_errors.get(&slot).map(String::as_str)
  }

  pub fn photo_preview(&self) -> Option<&str> { self.photo_preview.as_deref() }

  pub fn is_editable(&self) -> bool { self.mode != FormMode::View }

  pub fn is_uploading(&self) -> bool { !self.uploading.is_empty() }

  pub fn is_slot_uploading(&self, slot: AssetSlot) -> bool {
    self.uploading.contains(&slot)
  }

  /// Submit is offered only on editable forms with no upload in flight.
  pub fn can_submit(&self) -> bool { self.is_editable() && !self.is_uploading() }

  pub fn title(&self) -> String {
    let verb = match self.mode {
      FormMode::Create => "Add",
      FormMode::Edit => "Edit",
      FormMode::View => "View",
    };
    format!("{verb} {}", self.kind.label())
  }

  pub fn submit_label(&self) -> &'static str {
    if self.is_uploading() {
      "Uploading..."
    } else if self.mode == FormMode::Create {
      "Submit"
    } else {
      "Save Changes"
    }
  }

  // ── Draft edits ───────────────────────────────────────────────────────

  /// Replace the draft with the result of applying `edit`.
  pub fn apply(&mut self, edit: DraftEdit) -> Result<()> {
    if !self.is_editable() {
      return Err(Error::NotEditable);
    }
    self.draft = std::mem::take(&mut self.draft).apply(edit);
    Ok(())
  }

  /// Set `field` from its textual form. Enumerated fields are parsed
  /// against their option set; for categories the value is toggled.
  pub fn set_field(&mut self, field: Field, value: &str) -> Result<()> {
    let edit = match field {
      Field::Name => DraftEdit::Name(value.to_owned()),
      Field::Email => DraftEdit::Email(value.to_owned()),
      Field::Phone => DraftEdit::Phone(value.to_owned()),
      Field::Relationship if value.is_empty() => DraftEdit::Relationship(None),
      Field::Relationship => DraftEdit::Relationship(Some(self.parse(field, value)?)),
      Field::Categories => DraftEdit::ToggleCategory(self.parse(field, value)?),
      Field::ApprovalType => DraftEdit::ApprovalType(self.parse(field, value)?),
    };
    self.apply(edit)
  }

  fn parse<T: FromStr>(&self, field: Field, value: &str) -> Result<T> {
    value.parse().map_err(|_| Error::InvalidOption {
      field: self.schema().spec(field).map_or("option", |s| s.label),
      value: value.to_owned(),
    })
  }

  // ── Uploads ───────────────────────────────────────────────────────────

  /// Accept `file` for `slot` and mark the slot busy.
  ///
  /// The photo preview switches to the local file immediately. Rejected
  /// files are reported in the slot's inline error.
  pub fn begin_upload(&mut self, slot: AssetSlot, file: UploadFile) -> Result<PendingUpload> {
    if !self.is_editable() {
      return Err(Error::NotEditable);
    }
    if self.is_slot_uploading(slot) {
      return Err(Error::UploadInFlight);
    }
    if let Err(e) = slot.check(&file) {
      self.slot_errors.insert(slot, e.to_string());
      return Err(e);
    }

    self.slot_errors.remove(&slot);
    if slot == AssetSlot::Photo {
      self.photo_preview = Some(match &file.local_path {
        Some(path) => path.display().to_string(),
        None => file.file_name.clone(),
      });
    }
    self.uploading.insert(slot);

    Ok(PendingUpload {
      form: self.id,
      slot,
      key: ObjectKey::generate(self.kind, slot, &file.file_name),
      file,
    })
  }

  /// Show why a picked file could not be read (missing, too large) in the
  /// slot's inline error. Nothing is uploaded.
  pub fn reject_file(&mut self, slot: AssetSlot, err: &Error) {
    self.slot_errors.insert(slot, err.to_string());
  }

  /// Record the outcome of an upload. Returns `false` (and changes nothing)
  /// when the outcome belongs to a different form.
  pub fn finish_upload(&mut self, outcome: UploadOutcome) -> bool {
    if outcome.form != self.id {
      tracing::debug!(slot = ?outcome.slot, "dropping upload result for a closed form");
      return false;
    }
    self.uploading.remove(&outcome.slot);

    match outcome.result {
      Ok(url) => {
        let edit = match outcome.slot {
          AssetSlot::Photo => DraftEdit::PhotoUrl(url),
          AssetSlot::GovernmentId => DraftEdit::GovernmentIdUrl(url),
        };
        self.draft = std::mem::take(&mut self.draft).apply(edit);
      }
      Err(message) => {
        if outcome.slot == AssetSlot::Photo {
          self.photo_preview = (!self.draft.photo_url.is_empty())
            .then(|| self.draft.photo_url.clone());
        }
        self.slot_errors.insert(outcome.slot, message);
      }
    }
    true
  }

  /// Accept, run and record an upload in one step.
  pub async fn upload<B: Backend>(
    &mut self,
    backend: &B,
    slot: AssetSlot,
    file: UploadFile,
  ) -> Result<()> {
    let outcome = self.begin_upload(slot, file)?.run(backend).await;
    let failure = outcome.result.clone().err();
    self.finish_upload(outcome);
    match failure {
      Some(message) => Err(Error::Backend(message)),
      None => Ok(()),
    }
  }

  // ── Submission ────────────────────────────────────────────────────────

  /// Validate the draft and write it through `backend`.
  ///
  /// Returns the confirmation message to show. On any failure the message
  /// is kept in [`Self::error`] and the draft is left as it was.
  pub async fn submit<B: Backend>(&mut self, backend: &B) -> Result<String> {
    if !self.is_editable() {
      return Err(Error::NotEditable);
    }
    if self.is_uploading() {
      return Err(Error::UploadInFlight);
    }

    self.error = None;
    let result = self.write(backend).await;
    if let Err(e) = &result {
      tracing::warn!(table = self.kind.table(), error = %e, "contact submit failed");
      self.error = Some(e.to_string());
    }
    result
  }

  async fn write<B: Backend>(&self, backend: &B) -> Result<String> {
    let schema = self.schema();
    schema.validate(&self.draft)?;

    let user = backend
      .current_user()
      .await
      .map_err(Error::backend)?
      .ok_or(Error::Unauthenticated)?;
    let record = schema.record(&self.draft, user.id)?;

    match (&self.mode, &self.existing) {
      (FormMode::Edit, Some(existing)) => {
        backend
          .update(self.kind, existing.id, record)
          .await
          .map_err(Error::backend)?;
        Ok(CHANGES_SAVED_MESSAGE.to_owned())
      }
      _ => {
        let created = backend
          .insert(self.kind, record)
          .await
          .map_err(Error::backend)?;
        tracing::info!(table = self.kind.table(), id = %created.id, "contact created");
        Ok(self.kind.added_message())
      }
    }
  }
}
