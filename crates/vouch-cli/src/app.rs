//! Application state machine and event dispatcher.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use vouch_core::{
  asset::{AssetSlot, UploadFile},
  contact::ContactKind,
  form::{FormController, UploadOutcome},
  list::ListController,
  schema::{EntitySchema, Field},
};

use crate::backend::AnyBackend;

// ─── Tabs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  Dashboard,
  Contacts(ContactKind),
}

impl Tab {
  pub const ALL: [Tab; 3] = [
    Tab::Dashboard,
    Tab::Contacts(ContactKind::Nominee),
    Tab::Contacts(ContactKind::Trustee),
  ];

  pub fn title(self) -> &'static str {
    match self {
      Tab::Dashboard => "Dashboard",
      Tab::Contacts(kind) => kind.plural(),
    }
  }

  fn index(self) -> usize { Self::ALL.iter().position(|t| *t == self).unwrap_or(0) }
}

// ─── Form navigation ──────────────────────────────────────────────────────────

/// One focusable row of the form overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRow {
  Field(Field),
  Slot(AssetSlot),
}

/// Every row of `schema`, fields first, then upload slots.
pub fn form_rows(schema: &EntitySchema) -> Vec<FormRow> {
  schema
    .fields
    .iter()
    .map(|s| FormRow::Field(s.field))
    .chain(schema.slots.iter().map(|s| FormRow::Slot(*s)))
    .collect()
}

/// Terminal-only state of the open form; reset whenever a form opens.
#[derive(Debug, Default)]
pub struct FormUi {
  /// Index into [`form_rows`].
  pub row:           usize,
  /// Highlighted option on the categories row.
  pub option_cursor: usize,
  /// File paths being typed into each upload slot.
  pub paths:         HashMap<AssetSlot, String>,
}

impl FormUi {
  pub fn path(&self, slot: AssetSlot) -> &str {
    self.paths.get(&slot).map(String::as_str).unwrap_or_default()
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub tab: Tab,

  /// One list per contact kind, in [`ContactKind::ALL`] order.
  pub lists: [ListController; 2],

  /// Whether the user is typing a search query.
  pub search_active: bool,

  pub form_ui: FormUi,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  pub export_dir: PathBuf,

  backend:    AnyBackend,
  uploads_tx: mpsc::UnboundedSender<UploadOutcome>,
  uploads_rx: mpsc::UnboundedReceiver<UploadOutcome>,
}

fn list_index(kind: ContactKind) -> usize {
  match kind {
    ContactKind::Nominee => 0,
    ContactKind::Trustee => 1,
  }
}

impl App {
  pub fn new(backend: AnyBackend, export_dir: PathBuf) -> Self {
    let (uploads_tx, uploads_rx) = mpsc::unbounded_channel();
    Self {
      tab: Tab::Dashboard,
      lists: ContactKind::ALL.map(ListController::new),
      search_active: false,
      form_ui: FormUi::default(),
      status_msg: String::new(),
      export_dir,
      backend,
      uploads_tx,
      uploads_rx,
    }
  }

  pub fn backend_name(&self) -> &'static str { self.backend.name() }

  pub fn list(&self, kind: ContactKind) -> &ListController { &self.lists[list_index(kind)] }

  fn list_mut(&mut self, kind: ContactKind) -> &mut ListController {
    &mut self.lists[list_index(kind)]
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch every list. Failures stay on each list's `last_error`.
  pub async fn load_all(&mut self) {
    for list in &mut self.lists {
      let _ = list.refresh(&self.backend).await;
    }
  }

  /// Hand finished uploads back to the form that started them.
  pub fn poll_uploads(&mut self) {
    while let Ok(outcome) = self.uploads_rx.try_recv() {
      let slot = outcome.slot;
      let succeeded = outcome.result.is_ok();
      let form = self
        .lists
        .iter_mut()
        .filter_map(ListController::form_mut)
        .find(|f| f.id() == outcome.form);
      match form {
        Some(form) => {
          form.finish_upload(outcome);
          if succeeded {
            self.form_ui.paths.remove(&slot);
          }
        }
        None => tracing::debug!(?slot, "upload finished after its form closed"),
      }
    }
  }

  /// Write the currently visible list of `kind` as pretty JSON.
  pub async fn export_visible(&self, kind: ContactKind) -> anyhow::Result<(PathBuf, usize)> {
    let visible = self.list(kind).visible();
    let json = serde_json::to_string_pretty(&visible).context("serialising contacts")?;

    tokio::fs::create_dir_all(&self.export_dir)
      .await
      .with_context(|| format!("creating {}", self.export_dir.display()))?;
    let path = self.export_dir.join(format!("{}.json", kind.table()));
    tokio::fs::write(&path, json)
      .await
      .with_context(|| format!("writing {}", path.display()))?;

    tracing::info!(path = %path.display(), count = visible.len(), "exported contacts");
    Ok((path, visible.len()))
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    match self.tab {
      Tab::Dashboard => Ok(self.handle_dashboard_key(key).await),
      Tab::Contacts(kind) => Ok(self.handle_contacts_key(kind, key).await),
    }
  }

  fn switch_tab(&mut self, key: KeyEvent) -> bool {
    let next = match key.code {
      KeyCode::Char('1') => Tab::ALL[0],
      KeyCode::Char('2') => Tab::ALL[1],
      KeyCode::Char('3') => Tab::ALL[2],
      KeyCode::Tab => Tab::ALL[(self.tab.index() + 1) % Tab::ALL.len()],
      KeyCode::BackTab => Tab::ALL[(self.tab.index() + Tab::ALL.len() - 1) % Tab::ALL.len()],
      _ => return false,
    };
    self.tab = next;
    self.status_msg.clear();
    true
  }

  async fn handle_dashboard_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Char('r') => {
        self.load_all().await;
        self.status_msg = "Refreshed".into();
      }
      _ => {
        self.switch_tab(key);
      }
    }
    true
  }

  async fn handle_contacts_key(&mut self, kind: ContactKind, key: KeyEvent) -> bool {
    // Modal layers first: notice, then confirmation, then the form.
    if self.list(kind).notice().is_some() {
      if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
        self.list_mut(kind).dismiss_notice();
      }
      return true;
    }
    if self.list(kind).pending_delete().is_some() {
      self.handle_confirm_key(kind, key).await;
      return true;
    }
    if self.list(kind).form().is_some() {
      self.handle_form_key(kind, key).await;
      return true;
    }
    if self.search_active {
      self.handle_search_key(kind, key);
      return true;
    }
    self.handle_list_key(kind, key).await
  }

  fn handle_search_key(&mut self, kind: ContactKind, key: KeyEvent) {
    let list = self.list_mut(kind);
    match key.code {
      KeyCode::Esc => {
        list.clear_search();
        self.search_active = false;
      }
      KeyCode::Enter => self.search_active = false,
      KeyCode::Backspace => list.pop_search(),
      KeyCode::Char(c) => list.push_search(c),
      _ => {}
    }
  }

  async fn handle_list_key(&mut self, kind: ContactKind, key: KeyEvent) -> bool {
    let selected = self.list(kind).selected().map(|c| c.id);
    match key.code {
      KeyCode::Char('q') => return false,

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => self.list_mut(kind).move_cursor(1),
      KeyCode::Up | KeyCode::Char('k') => self.list_mut(kind).move_cursor(-1),

      // Search
      KeyCode::Char('/') => self.search_active = true,

      // Form
      KeyCode::Char('a') => {
        self.list_mut(kind).open_create();
        self.form_ui = FormUi::default();
      }
      KeyCode::Char('e') | KeyCode::Enter | KeyCode::Char('v') => {
        if let Some(id) = selected {
          let list = self.list_mut(kind);
          let opened = if key.code == KeyCode::Char('e') {
            list.open_edit(id)
          } else {
            list.open_view(id)
          };
          if let Err(e) = opened {
            self.status_msg = e.to_string();
          }
          self.form_ui = FormUi::default();
        }
      }

      // Delete
      KeyCode::Char('d') => {
        if let Some(id) = selected {
          self.list_mut(kind).request_delete(id);
        }
      }

      KeyCode::Char('r') => {
        let backend = self.backend.clone();
        let _ = self.list_mut(kind).refresh(&backend).await;
      }

      KeyCode::Char('x') => {
        self.status_msg = match self.export_visible(kind).await {
          Ok((path, count)) => format!("Exported {count} to {}", path.display()),
          Err(e) => format!("Export failed: {e:#}"),
        };
      }

      _ => {
        self.switch_tab(key);
      }
    }
    true
  }

  async fn handle_confirm_key(&mut self, kind: ContactKind, key: KeyEvent) {
    match key.code {
      KeyCode::Char('y') | KeyCode::Enter => {
        let backend = self.backend.clone();
        // Failures are kept on the list's `last_error`.
        let _ = self.list_mut(kind).confirm_delete(&backend).await;
      }
      KeyCode::Char('n') | KeyCode::Esc => self.list_mut(kind).cancel_delete(),
      _ => {}
    }
  }

  // ── Form ──────────────────────────────────────────────────────────────────

  async fn handle_form_key(&mut self, kind: ContactKind, key: KeyEvent) {
    let backend = self.backend.clone();
    let rows = form_rows(kind.schema());
    let row = rows[self.form_ui.row.min(rows.len() - 1)];

    match key.code {
      KeyCode::Esc => {
        self.list_mut(kind).close_form(&backend).await;
        return;
      }
      KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        let list = self.list_mut(kind);
        if list.form().is_some_and(FormController::can_submit) {
          // On failure the form keeps its inline error.
          let _ = list.submit_form(&backend).await;
        }
        return;
      }
      KeyCode::Tab | KeyCode::Down => {
        self.form_ui.row = (self.form_ui.row + 1) % rows.len();
        self.form_ui.option_cursor = 0;
        return;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.form_ui.row = (self.form_ui.row + rows.len() - 1) % rows.len();
        self.form_ui.option_cursor = 0;
        return;
      }
      _ => {}
    }

    let Some(form) = self.lists[list_index(kind)].form_mut() else {
      return;
    };
    if !form.is_editable() {
      return;
    }

    let result = match row {
      FormRow::Field(field) => Self::edit_field(form, &mut self.form_ui, field, key),
      FormRow::Slot(slot) => match key.code {
        KeyCode::Char(c) => {
          self.form_ui.paths.entry(slot).or_default().push(c);
          Ok(())
        }
        KeyCode::Backspace => {
          self.form_ui.paths.entry(slot).or_default().pop();
          Ok(())
        }
        KeyCode::Enter => {
          let path = self.form_ui.path(slot).trim().to_owned();
          self.start_upload(kind, slot, Path::new(&path)).await
        }
        _ => Ok(()),
      },
    };
    if let Err(e) = result {
      self.status_msg = format!("{e:#}");
    }
  }

  fn edit_field(
    form: &mut FormController,
    ui: &mut FormUi,
    field: Field,
    key: KeyEvent,
  ) -> anyhow::Result<()> {
    let Some(spec) = form.schema().spec(field).copied() else {
      return Ok(());
    };

    if !spec.is_enumerated() {
      let mut value = form.draft().value(field);
      match key.code {
        KeyCode::Char(c) => value.push(c),
        KeyCode::Backspace => {
          value.pop();
        }
        _ => return Ok(()),
      }
      form.set_field(field, &value)?;
      return Ok(());
    }

    let count = spec.options.len();
    if field == Field::Categories {
      match key.code {
        KeyCode::Left => ui.option_cursor = (ui.option_cursor + count - 1) % count,
        KeyCode::Right => ui.option_cursor = (ui.option_cursor + 1) % count,
        KeyCode::Char(' ') | KeyCode::Enter => {
          form.set_field(field, spec.options[ui.option_cursor])?;
        }
        _ => {}
      }
      return Ok(());
    }

    // Single-choice fields cycle through their options.
    let current = form.draft().value(field);
    let position = spec.options.iter().position(|o| *o == current);
    let next = match (key.code, position) {
      (KeyCode::Right | KeyCode::Char(' '), None) => 0,
      (KeyCode::Left, None) => count - 1,
      (KeyCode::Right | KeyCode::Char(' '), Some(i)) => (i + 1) % count,
      (KeyCode::Left, Some(i)) => (i + count - 1) % count,
      (KeyCode::Backspace, _) if field == Field::Relationship => {
        form.set_field(field, "")?;
        return Ok(());
      }
      _ => return Ok(()),
    };
    form.set_field(field, spec.options[next])?;
    Ok(())
  }

  /// Read `path` and upload it on a spawned task; the outcome comes back
  /// through [`Self::poll_uploads`].
  async fn start_upload(
    &mut self,
    kind: ContactKind,
    slot: AssetSlot,
    path: &Path,
  ) -> anyhow::Result<()> {
    if path.as_os_str().is_empty() {
      return Ok(());
    }
    let file = match UploadFile::read(path).await {
      Ok(file) => file,
      Err(e) => {
        tracing::warn!(path = %path.display(), error = %e, "could not read upload");
        if let Some(form) = self.list_mut(kind).form_mut() {
          form.reject_file(slot, &e);
        }
        return Ok(());
      }
    };

    let Some(form) = self.list_mut(kind).form_mut() else {
      return Ok(());
    };
    let pending = form.begin_upload(slot, file)?;

    let backend = self.backend.clone();
    let tx = self.uploads_tx.clone();
    tokio::spawn(async move {
      let outcome = pending.run(&backend).await;
      // The receiver only goes away when the app is shutting down.
      let _ = tx.send(outcome);
    });
    Ok(())
  }
}
