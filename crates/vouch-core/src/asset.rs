//! Upload slots and object-storage keys for contact assets.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt as _;
use uuid::Uuid;

use crate::{Error, Result, contact::ContactKind};

/// Largest file accepted by either slot (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// ─── Slots ───────────────────────────────────────────────────────────────────

/// One of the two independent file-upload targets on a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSlot {
  Photo,
  GovernmentId,
}

impl AssetSlot {
  /// The storage bucket holding this slot's objects.
  pub fn bucket(self) -> &'static str {
    match self {
      Self::Photo => "profile-photos",
      Self::GovernmentId => "government-ids",
    }
  }

  /// Key prefix inside the bucket; photos are grouped by contact kind.
  pub fn key_prefix(self, kind: ContactKind) -> &'static str {
    match self {
      Self::Photo => kind.table(),
      Self::GovernmentId => "government-ids",
    }
  }

  /// Human-readable description of the accepted file types.
  pub fn accepted(self) -> &'static str {
    match self {
      Self::Photo => "PNG, JPG up to 10MB",
      Self::GovernmentId => "PNG, JPG, PDF up to 10MB",
    }
  }

  fn accepts(self, content_type: &str) -> bool {
    match self {
      Self::Photo => content_type.starts_with("image/"),
      Self::GovernmentId => {
        content_type.starts_with("image/") || content_type == "application/pdf"
      }
    }
  }

  /// Reject files this slot does not take, before anything is uploaded.
  pub fn check(self, file: &UploadFile) -> Result<()> {
    if !self.accepts(&file.content_type) {
      return Err(Error::UnsupportedFile { slot: self, accepted: self.accepted() });
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
      return Err(too_large(file.bytes.len() as u64));
    }
    Ok(())
  }
}

impl std::fmt::Display for AssetSlot {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      Self::Photo => "Profile Photo",
      Self::GovernmentId => "Government ID",
    })
  }
}

// ─── Object keys ─────────────────────────────────────────────────────────────

/// Where an object lives in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey {
  pub bucket: &'static str,
  /// Path within the bucket, e.g. `trustees/3f2a….png`.
  pub path:   String,
}

impl ObjectKey {
  /// A fresh, collision-resistant key for a file uploaded into `slot`.
  pub fn generate(kind: ContactKind, slot: AssetSlot, file_name: &str) -> Self {
    let ext = Path::new(file_name)
      .extension()
      .and_then(|e| e.to_str())
      .filter(|e| !e.is_empty())
      .map(str::to_ascii_lowercase)
      .unwrap_or_else(|| "bin".to_owned());
    Self {
      bucket: slot.bucket(),
      path:   format!("{}/{}.{ext}", slot.key_prefix(kind), Uuid::new_v4().simple()),
    }
  }
}

// ─── Files ───────────────────────────────────────────────────────────────────

/// A file picked by the user, held in memory for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
  pub file_name:    String,
  pub content_type: String,
  pub bytes:        Bytes,
  /// Where the file was read from; used for the local photo preview.
  pub local_path:   Option<PathBuf>,
}

impl UploadFile {
  /// Read `path` from disk, inferring the content type from its extension.
  ///
  /// Files over [`MAX_UPLOAD_BYTES`] are refused without being loaded.
  pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let size = tokio::fs::metadata(path).await?.len();
    if size > MAX_UPLOAD_BYTES as u64 {
      return Err(too_large(size));
    }

    // The file can still grow after the metadata call; never buffer more
    // than one byte past the cap.
    let mut bytes = Vec::new();
    tokio::fs::File::open(path)
      .await?
      .take(MAX_UPLOAD_BYTES as u64 + 1)
      .read_to_end(&mut bytes)
      .await?;
    if bytes.len() > MAX_UPLOAD_BYTES {
      return Err(too_large(bytes.len() as u64));
    }

    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    Ok(Self {
      content_type: content_type_for(&file_name).to_owned(),
      file_name,
      bytes: Bytes::from(bytes),
      local_path: Some(path.to_path_buf()),
    })
  }
}

fn too_large(size: u64) -> Error {
  Error::FileTooLarge { size, limit: MAX_UPLOAD_BYTES }
}

/// Guess a MIME type from a file name's extension.
pub fn content_type_for(file_name: &str) -> &'static str {
  let ext = Path::new(file_name)
    .extension()
    .and_then(|e| e.to_str())
    .map(str::to_ascii_lowercase);
  match ext.as_deref() {
    Some("png") => "image/png",
    Some("jpg" | "jpeg") => "image/jpeg",
    Some("gif") => "image/gif",
    Some("webp") => "image/webp",
    Some("pdf") => "application/pdf",
    _ => "application/octet-stream",
  }
}
