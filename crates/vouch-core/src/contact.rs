//! Contact types: the records managed by vouch.
//!
//! Nominees and trustees share one shape. The only difference between the
//! two kinds is declared by their [`EntitySchema`](crate::schema::EntitySchema)
//! (trustees carry an [`ApprovalType`]), so a single [`Contact`] type serves
//! both tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray, VariantNames};
use uuid::Uuid;

use crate::schema::Field;

// ─── Kind ────────────────────────────────────────────────────────────────────

/// Which table a contact lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
  Nominee,
  Trustee,
}

/// Shown after a successful update, for every kind.
pub const CHANGES_SAVED_MESSAGE: &str = "Changes saved successfully";

impl ContactKind {
  pub const ALL: [ContactKind; 2] = [ContactKind::Nominee, ContactKind::Trustee];

  /// The backend table holding contacts of this kind.
  pub fn table(self) -> &'static str {
    match self {
      Self::Nominee => "nominees",
      Self::Trustee => "trustees",
    }
  }

  /// Singular, capitalised display name.
  pub fn label(self) -> &'static str {
    match self {
      Self::Nominee => "Nominee",
      Self::Trustee => "Trustee",
    }
  }

  /// Plural, capitalised display name.
  pub fn plural(self) -> &'static str {
    match self {
      Self::Nominee => "Nominees",
      Self::Trustee => "Trustees",
    }
  }

  pub fn added_message(self) -> String {
    format!("{} added successfully", self.label())
  }

  pub fn deleted_message(self) -> String {
    format!("{} deleted successfully", self.label())
  }

  pub fn delete_prompt(self) -> String {
    format!(
      "Are you sure you want to delete this {}? This action cannot be undone.",
      self.label().to_lowercase()
    )
  }
}

// ─── Enumerated options ──────────────────────────────────────────────────────

/// How a contact is related to the account holder.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  VariantArray,
  VariantNames,
)]
pub enum Relationship {
  Sister,
  Brother,
  Parent,
  Child,
  Spouse,
}

/// An area of the account a contact is granted access to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  VariantArray,
  VariantNames,
)]
pub enum Category {
  Finance,
  Family,
  #[serde(rename = "Financial Planning")]
  #[strum(serialize = "Financial Planning")]
  FinancialPlanning,
  Health,
  Insurance,
}

/// How a trustee's access requests are approved.
///
/// Stored and displayed only; nothing in vouch acts on it yet.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  VariantArray,
  VariantNames,
)]
pub enum ApprovalType {
  #[default]
  #[serde(rename = "Group Request")]
  #[strum(serialize = "Group Request")]
  GroupRequest,
  #[serde(rename = "Individual Request")]
  #[strum(serialize = "Individual Request")]
  IndividualRequest,
  #[serde(rename = "Without Request")]
  #[strum(serialize = "Without Request")]
  WithoutRequest,
}

// ─── Stored record ───────────────────────────────────────────────────────────

/// A contact row as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  /// Backend-assigned; never changes after creation.
  pub id:                Uuid,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at:        Option<DateTime<Utc>>,
  /// The owning account, stamped from the session at write time.
  pub user_id:           Uuid,
  pub name:              String,
  pub email:             String,
  pub phone:             String,
  pub relationship:      Relationship,
  #[serde(default, deserialize_with = "null_as_default")]
  pub categories:        Vec<Category>,
  /// Public URL of the uploaded profile photo; empty when none.
  #[serde(default, deserialize_with = "null_as_default")]
  pub photo_url:         String,
  /// Public URL of the uploaded government ID; empty when none.
  #[serde(default, deserialize_with = "null_as_default")]
  pub government_id_url: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub approval_type:     Option<ApprovalType>,
}

impl Contact {
  /// Assemble a stored contact from a write payload and backend metadata.
  pub fn from_record(
    id: Uuid,
    created_at: Option<DateTime<Utc>>,
    record: ContactRecord,
  ) -> Self {
    Self {
      id,
      created_at,
      user_id: record.user_id,
      name: record.name,
      email: record.email,
      phone: record.phone,
      relationship: record.relationship,
      categories: record.categories,
      photo_url: record.photo_url,
      government_id_url: record.government_id_url,
      approval_type: record.approval_type,
    }
  }

  pub fn has_photo(&self) -> bool { !self.photo_url.is_empty() }

  pub fn has_government_id(&self) -> bool { !self.government_id_url.is_empty() }
}

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ─── Write payload ───────────────────────────────────────────────────────────

/// Every addressable field of a contact: the body of an insert, and the full
/// replacement body of an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
  pub user_id:           Uuid,
  pub name:              String,
  pub email:             String,
  pub phone:             String,
  pub relationship:      Relationship,
  pub categories:        Vec<Category>,
  pub photo_url:         String,
  pub government_id_url: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub approval_type:     Option<ApprovalType>,
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// A form's local, uncommitted copy of a contact's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
  pub name:              String,
  pub email:             String,
  pub phone:             String,
  /// `None` only while the form is being filled in; rejected at submit.
  pub relationship:      Option<Relationship>,
  /// Insertion order is kept for display; membership is what matters.
  pub categories:        Vec<Category>,
  pub photo_url:         String,
  pub government_id_url: String,
  pub approval_type:     Option<ApprovalType>,
}

/// One step of editing a [`ContactDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEdit {
  Name(String),
  Email(String),
  Phone(String),
  Relationship(Option<Relationship>),
  ToggleCategory(Category),
  ApprovalType(ApprovalType),
  PhotoUrl(String),
  GovernmentIdUrl(String),
}

impl ContactDraft {
  /// An empty draft for a new contact of `kind`.
  pub fn empty(kind: ContactKind) -> Self {
    let approval_type = kind
      .schema()
      .declares(Field::ApprovalType)
      .then(ApprovalType::default);
    Self { approval_type, ..Self::default() }
  }

  /// A draft seeded from an existing contact.
  pub fn from_contact(kind: ContactKind, contact: &Contact) -> Self {
    let approval_type = kind
      .schema()
      .declares(Field::ApprovalType)
      .then(|| contact.approval_type.unwrap_or_default());
    Self {
      name: contact.name.clone(),
      email: contact.email.clone(),
      phone: contact.phone.clone(),
      relationship: Some(contact.relationship),
      categories: contact.categories.clone(),
      photo_url: contact.photo_url.clone(),
      government_id_url: contact.government_id_url.clone(),
      approval_type,
    }
  }

  /// Apply one edit, producing the next draft.
  pub fn apply(self, edit: DraftEdit) -> Self {
    match edit {
      DraftEdit::Name(name) => Self { name, ..self },
      DraftEdit::Email(email) => Self { email, ..self },
      DraftEdit::Phone(phone) => Self { phone, ..self },
      DraftEdit::Relationship(relationship) => Self { relationship, ..self },
      DraftEdit::ToggleCategory(category) => {
        let mut categories = self.categories;
        if let Some(pos) = categories.iter().position(|c| *c == category) {
          categories.remove(pos);
        } else {
          categories.push(category);
        }
        Self { categories, ..self }
      }
      DraftEdit::ApprovalType(approval) => {
        Self { approval_type: Some(approval), ..self }
      }
      DraftEdit::PhotoUrl(photo_url) => Self { photo_url, ..self },
      DraftEdit::GovernmentIdUrl(government_id_url) => {
        Self { government_id_url, ..self }
      }
    }
  }

  pub fn has_category(&self, category: Category) -> bool {
    self.categories.contains(&category)
  }

  /// The current value of `field` rendered as text; empty when unset.
  pub fn value(&self, field: Field) -> String {
    match field {
      Field::Name => self.name.clone(),
      Field::Email => self.email.clone(),
      Field::Phone => self.phone.clone(),
      Field::Relationship => self
        .relationship
        .map(|r| r.to_string())
        .unwrap_or_default(),
      Field::Categories => self
        .categories
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(", "),
      Field::ApprovalType => self
        .approval_type
        .map(|a| a.to_string())
        .unwrap_or_default(),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn category_wire_names_match_display() {
    assert_eq!(Category::FinancialPlanning.to_string(), "Financial Planning");
    assert_eq!(
      Category::from_str("Financial Planning").unwrap(),
      Category::FinancialPlanning
    );
    let json = serde_json::to_string(&Category::FinancialPlanning).unwrap();
    assert_eq!(json, "\"Financial Planning\"");
  }

  #[test]
  fn approval_type_defaults_to_group_request() {
    assert_eq!(ApprovalType::default(), ApprovalType::GroupRequest);
    assert_eq!(ApprovalType::default().to_string(), "Group Request");
  }

  #[test]
  fn null_asset_urls_deserialize_as_empty() {
    let json = serde_json::json!({
      "id": "6f1c1d2e-8a39-4a7e-9d7f-0a4c3c1f2b10",
      "user_id": "0b7f3a52-39b4-4c2b-8a8e-5c7b1b6d2e91",
      "name": "Asha",
      "email": "asha@x.com",
      "phone": "9999",
      "relationship": "Sister",
      "categories": null,
      "photo_url": null,
      "government_id_url": null,
    });
    let contact: Contact = serde_json::from_value(json).unwrap();
    assert!(!contact.has_photo());
    assert!(!contact.has_government_id());
    assert!(contact.categories.is_empty());
    assert_eq!(contact.approval_type, None);
  }

  #[test]
  fn toggling_twice_restores_membership() {
    let draft = ContactDraft::empty(ContactKind::Nominee)
      .apply(DraftEdit::ToggleCategory(Category::Health))
      .apply(DraftEdit::ToggleCategory(Category::Finance));
    assert_eq!(draft.categories, vec![Category::Health, Category::Finance]);

    let draft = draft.apply(DraftEdit::ToggleCategory(Category::Health));
    assert_eq!(draft.categories, vec![Category::Finance]);
    assert!(!draft.has_category(Category::Health));
  }

  #[test]
  fn toggle_sequence_keeps_odd_counts() {
    let sequence = [
      Category::Family,
      Category::Insurance,
      Category::Family,
      Category::Health,
      Category::Family,
      Category::Insurance,
      Category::Insurance,
    ];
    let draft = sequence.iter().fold(
      ContactDraft::empty(ContactKind::Trustee),
      |d, c| d.apply(DraftEdit::ToggleCategory(*c)),
    );

    for category in <Category as VariantArray>::VARIANTS {
      let toggles = sequence.iter().filter(|c| *c == category).count();
      assert_eq!(draft.has_category(*category), toggles % 2 == 1, "{category}");
    }
  }

  #[test]
  fn empty_trustee_draft_has_default_approval() {
    let trustee = ContactDraft::empty(ContactKind::Trustee);
    assert_eq!(trustee.approval_type, Some(ApprovalType::GroupRequest));

    let nominee = ContactDraft::empty(ContactKind::Nominee);
    assert_eq!(nominee.approval_type, None);
  }
}
