//! Encoding and decoding helpers between vouch contact types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings and
//! categories a compact JSON array of their display names.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;
use vouch_core::contact::{
  ApprovalType, Category, Contact, ContactRecord, Relationship,
};

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_option<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| Error::UnknownOption { column, value: s.to_owned() })
}

pub fn encode_categories(categories: &[Category]) -> Result<String> {
  Ok(serde_json::to_string(categories)?)
}

pub fn decode_categories(s: &str) -> Result<Vec<Category>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// A [`ContactRecord`] flattened into column values, ready to bind.
pub struct EncodedRecord {
  pub user_id:           String,
  pub name:              String,
  pub email:             String,
  pub phone:             String,
  pub relationship:      String,
  pub categories:        String,
  pub photo_url:         String,
  pub government_id_url: String,
  pub approval_type:     Option<String>,
}

impl EncodedRecord {
  pub fn new(record: &ContactRecord) -> Result<Self> {
    Ok(Self {
      user_id:           encode_uuid(record.user_id),
      name:              record.name.clone(),
      email:             record.email.clone(),
      phone:             record.phone.clone(),
      relationship:      record.relationship.as_ref().to_owned(),
      categories:        encode_categories(&record.categories)?,
      photo_url:         record.photo_url.clone(),
      government_id_url: record.government_id_url.clone(),
      approval_type:     record.approval_type.map(|a| a.as_ref().to_owned()),
    })
  }
}

/// Raw strings read directly from a `nominees` or `trustees` row.
pub struct RawContact {
  pub id:                String,
  pub created_at:        String,
  pub user_id:           String,
  pub name:              String,
  pub email:             String,
  pub phone:             String,
  pub relationship:      String,
  pub categories:        String,
  pub photo_url:         String,
  pub government_id_url: String,
  pub approval_type:     Option<String>,
}

impl RawContact {
  /// Read a row selected with [`crate::schema::COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      created_at:        row.get(1)?,
      user_id:           row.get(2)?,
      name:              row.get(3)?,
      email:             row.get(4)?,
      phone:             row.get(5)?,
      relationship:      row.get(6)?,
      categories:        row.get(7)?,
      photo_url:         row.get(8)?,
      government_id_url: row.get(9)?,
      approval_type:     row.get(10)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      id:                decode_uuid(&self.id)?,
      created_at:        Some(decode_dt(&self.created_at)?),
      user_id:           decode_uuid(&self.user_id)?,
      name:              self.name,
      email:             self.email,
      phone:             self.phone,
      relationship:      decode_option::<Relationship>("relationship", &self.relationship)?,
      categories:        decode_categories(&self.categories)?,
      photo_url:         self.photo_url,
      government_id_url: self.government_id_url,
      approval_type:     self
        .approval_type
        .as_deref()
        .map(|s| decode_option::<ApprovalType>("approval_type", s))
        .transpose()?,
    })
  }
}
