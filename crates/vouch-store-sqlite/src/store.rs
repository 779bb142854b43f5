//! [`SqliteBackend`], the local implementation of [`Backend`].

use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use tokio::io::AsyncWriteExt as _;
use uuid::Uuid;

use vouch_core::{
  asset::{ObjectKey, UploadFile},
  backend::{Backend, Identity},
  contact::{Contact, ContactKind, ContactRecord},
};

use crate::{
  encode::{EncodedRecord, RawContact, encode_dt, encode_uuid},
  schema::{COLUMNS, SCHEMA},
  Error, Result,
};

// ─── Backend ─────────────────────────────────────────────────────────────────

/// A vouch backend backed by a single SQLite file and a storage directory.
///
/// There is no sign-in flow; the session is a fixed local [`Identity`] set
/// with [`SqliteBackend::with_user`]. Cloning is cheap, the inner connection
/// is reference-counted.
#[derive(Clone)]
pub struct SqliteBackend {
  conn:         tokio_rusqlite::Connection,
  storage_root: PathBuf,
  user:         Option<Identity>,
}

impl SqliteBackend {
  /// Open (or create) a database at `path`, storing uploads under
  /// `storage_root`.
  pub async fn open(path: impl AsRef<Path>, storage_root: impl Into<PathBuf>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn, storage_root.into()).await
  }

  /// Open an in-memory database, useful for testing.
  pub async fn open_in_memory(storage_root: impl Into<PathBuf>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn, storage_root.into()).await
  }

  async fn init(conn: tokio_rusqlite::Connection, storage_root: PathBuf) -> Result<Self> {
    // Public URLs are built from this, so it must not depend on the cwd.
    let storage_root = std::path::absolute(&storage_root)?;
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, storage_root, user: None })
  }

  /// Act as `user` for every subsequent call.
  pub fn with_user(mut self, user: Identity) -> Self {
    self.user = Some(user);
    self
  }

  /// Drop the local identity; reads see nothing and writes are refused.
  pub fn signed_out(mut self) -> Self {
    self.user = None;
    self
  }

  /// Absolute directory that uploaded objects are written under.
  pub fn storage_root(&self) -> &Path { &self.storage_root }

  fn owner(&self) -> Result<String> {
    self
      .user
      .as_ref()
      .map(|u| encode_uuid(u.id))
      .ok_or(Error::Unauthenticated)
  }

  /// Resolve `key` inside the storage root, refusing anything that would
  /// escape it.
  fn object_path(&self, key: &ObjectKey) -> Result<PathBuf> {
    let relative = Path::new(&key.path);
    let escapes = relative
      .components()
      .any(|c| !matches!(c, Component::Normal(_)));
    if key.path.is_empty() || escapes {
      return Err(Error::InvalidObjectPath(key.path.clone()));
    }
    Ok(self.storage_root.join(key.bucket).join(relative))
  }
}

// ─── Backend impl ────────────────────────────────────────────────────────────

impl Backend for SqliteBackend {
  type Error = Error;

  // ── Auth ──────────────────────────────────────────────────────────────

  async fn current_user(&self) -> Result<Option<Identity>> { Ok(self.user.clone()) }

  // ── Tables ────────────────────────────────────────────────────────────

  async fn select_all(&self, kind: ContactKind) -> Result<Vec<Contact>> {
    // Rows are scoped to their owner, the way row-level security scopes
    // them on the hosted backend.
    let Ok(owner) = self.owner() else {
      return Ok(Vec::new());
    };
    let sql = format!(
      "SELECT {COLUMNS} FROM {} WHERE user_id = ?1 ORDER BY created_at, rowid",
      kind.table()
    );

    let raws: Vec<RawContact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![owner], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    tracing::debug!(table = kind.table(), count = raws.len(), "selected contacts");
    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn insert(&self, kind: ContactKind, record: ContactRecord) -> Result<Contact> {
    self.owner()?;
    let row = EncodedRecord::new(&record)?;
    let contact = Contact::from_record(Uuid::new_v4(), Some(Utc::now()), record);

    let id_str = encode_uuid(contact.id);
    let at_str = contact.created_at.map(encode_dt).unwrap_or_default();
    let sql = format!(
      "INSERT INTO {} ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
      kind.table()
    );

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &sql,
          rusqlite::params![
            id_str,
            at_str,
            row.user_id,
            row.name,
            row.email,
            row.phone,
            row.relationship,
            row.categories,
            row.photo_url,
            row.government_id_url,
            row.approval_type,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(table = kind.table(), id = %contact.id, "inserted contact");
    Ok(contact)
  }

  async fn update(&self, kind: ContactKind, id: Uuid, record: ContactRecord) -> Result<()> {
    let owner = self.owner()?;
    let id_str = encode_uuid(id);
    let row = EncodedRecord::new(&record)?;
    let sql = format!(
      "UPDATE {} SET
         user_id = ?3, name = ?4, email = ?5, phone = ?6, relationship = ?7,
         categories = ?8, photo_url = ?9, government_id_url = ?10, approval_type = ?11
       WHERE id = ?1 AND user_id = ?2",
      kind.table()
    );

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &sql,
          rusqlite::params![
            id_str,
            owner,
            row.user_id,
            row.name,
            row.email,
            row.phone,
            row.relationship,
            row.categories,
            row.photo_url,
            row.government_id_url,
            row.approval_type,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::NotFound { table: kind.table(), id });
    }
    Ok(())
  }

  async fn delete(&self, kind: ContactKind, id: Uuid) -> Result<()> {
    let owner = self.owner()?;
    let id_str = encode_uuid(id);
    let sql = format!("DELETE FROM {} WHERE id = ?1 AND user_id = ?2", kind.table());

    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params![id_str, owner])?))
      .await?;

    if changed == 0 {
      return Err(Error::NotFound { table: kind.table(), id });
    }
    tracing::debug!(table = kind.table(), %id, "deleted contact");
    Ok(())
  }

  // ── Storage ───────────────────────────────────────────────────────────

  async fn upload(&self, key: ObjectKey, file: UploadFile) -> Result<()> {
    self.owner()?;
    let path = self.object_path(&key)?;
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }

    let mut out = match tokio::fs::OpenOptions::new()
      .write(true)
      .create_new(true)
      .open(&path)
      .await
    {
      Ok(out) => out,
      Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
        return Err(Error::ObjectExists(path));
      }
      Err(e) => return Err(e.into()),
    };
    out.write_all(&file.bytes).await?;
    out.flush().await?;

    tracing::debug!(path = %path.display(), bytes = file.bytes.len(), "stored object");
    Ok(())
  }

  fn public_url(&self, key: &ObjectKey) -> String {
    let path = self.storage_root.join(key.bucket).join(&key.path);
    // `storage_root` is absolute, so the conversion only fails on exotic
    // platform paths.
    url::Url::from_file_path(&path)
      .map(String::from)
      .unwrap_or_else(|()| format!("file://{}", path.display()))
  }
}
