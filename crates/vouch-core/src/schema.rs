//! Declarative field schemas for the two contact kinds.
//!
//! Whether a field is required, which fixed options it accepts and how its
//! text is checked are all data on a [`FieldSpec`]. Validation walks the
//! schema instead of hard-coding per-kind rules.

use strum::VariantNames;
use uuid::Uuid;

use crate::{
  Error, Result,
  asset::AssetSlot,
  contact::{
    ApprovalType, Category, ContactDraft, ContactKind, ContactRecord,
    Relationship,
  },
};

// ─── Field specs ─────────────────────────────────────────────────────────────

/// A user-editable contact field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
  Name,
  Email,
  Phone,
  Relationship,
  Categories,
  ApprovalType,
}

/// How free text in a field is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
  Text,
  Email,
  Phone,
}

/// The declared constraints of one field within a schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
  pub field:    Field,
  pub label:    &'static str,
  pub required: bool,
  /// The fixed option set for enumerated fields; empty for free text.
  pub options:  &'static [&'static str],
  pub format:   FieldFormat,
}

impl FieldSpec {
  const fn text(field: Field, label: &'static str, format: FieldFormat) -> Self {
    Self { field, label, required: true, options: &[], format }
  }

  const fn choice(
    field: Field,
    label: &'static str,
    required: bool,
    options: &'static [&'static str],
  ) -> Self {
    Self { field, label, required, options, format: FieldFormat::Text }
  }

  pub fn is_enumerated(&self) -> bool { !self.options.is_empty() }
}

// ─── Entity schema ───────────────────────────────────────────────────────────

/// Everything the form needs to know about one contact kind.
#[derive(Debug)]
pub struct EntitySchema {
  pub kind:   ContactKind,
  /// Fields in display order.
  pub fields: &'static [FieldSpec],
  pub slots:  &'static [AssetSlot],
}

const BOTH_SLOTS: &[AssetSlot] = &[AssetSlot::Photo, AssetSlot::GovernmentId];

static NOMINEE: EntitySchema = EntitySchema {
  kind:   ContactKind::Nominee,
  fields: &[
    FieldSpec::text(Field::Name, "Nominee Name", FieldFormat::Text),
    FieldSpec::text(Field::Email, "Email Address", FieldFormat::Email),
    FieldSpec::choice(
      Field::Relationship,
      "Relationship",
      true,
      Relationship::VARIANTS,
    ),
    FieldSpec::text(Field::Phone, "Phone Number", FieldFormat::Phone),
    FieldSpec::choice(
      Field::Categories,
      "Access to Categories",
      false,
      Category::VARIANTS,
    ),
  ],
  slots:  BOTH_SLOTS,
};

static TRUSTEE: EntitySchema = EntitySchema {
  kind:   ContactKind::Trustee,
  fields: &[
    FieldSpec::text(Field::Name, "Trustee Name", FieldFormat::Text),
    FieldSpec::text(Field::Email, "Email Id", FieldFormat::Email),
    FieldSpec::choice(
      Field::Relationship,
      "Relationship",
      true,
      Relationship::VARIANTS,
    ),
    FieldSpec::text(Field::Phone, "Phone No", FieldFormat::Phone),
    FieldSpec::choice(
      Field::Categories,
      "Access to Category",
      false,
      Category::VARIANTS,
    ),
    FieldSpec::choice(
      Field::ApprovalType,
      "Approval Type",
      true,
      ApprovalType::VARIANTS,
    ),
  ],
  slots:  BOTH_SLOTS,
};

impl ContactKind {
  /// The field schema for this kind.
  pub fn schema(self) -> &'static EntitySchema {
    match self {
      Self::Nominee => &NOMINEE,
      Self::Trustee => &TRUSTEE,
    }
  }
}

impl EntitySchema {
  pub fn spec(&self, field: Field) -> Option<&FieldSpec> {
    self.fields.iter().find(|s| s.field == field)
  }

  pub fn declares(&self, field: Field) -> bool { self.spec(field).is_some() }

  /// Check every declared field of `draft`.
  pub fn validate(&self, draft: &ContactDraft) -> Result<()> {
    for spec in self.fields {
      let value = draft.value(spec.field);
      let value = value.trim();

      if value.is_empty() {
        if spec.required {
          return Err(Error::MissingField(spec.label));
        }
        continue;
      }

      match spec.format {
        FieldFormat::Email if !is_plausible_email(value) => {
          return Err(Error::InvalidEmail(value.to_owned()));
        }
        FieldFormat::Phone if !is_plausible_phone(value) => {
          return Err(Error::InvalidPhone(value.to_owned()));
        }
        _ => {}
      }
    }
    Ok(())
  }

  /// Validate `draft` and build the payload written to the backend.
  ///
  /// `user_id` always comes from the authenticated session.
  pub fn record(&self, draft: &ContactDraft, user_id: Uuid) -> Result<ContactRecord> {
    self.validate(draft)?;

    let relationship = draft
      .relationship
      .ok_or(Error::MissingField("Relationship"))?;
    let approval_type = if self.declares(Field::ApprovalType) {
      Some(draft.approval_type.unwrap_or_default())
    } else {
      None
    };

    Ok(ContactRecord {
      user_id,
      name: draft.name.trim().to_owned(),
      email: draft.email.trim().to_owned(),
      phone: draft.phone.trim().to_owned(),
      relationship,
      categories: draft.categories.clone(),
      photo_url: draft.photo_url.clone(),
      government_id_url: draft.government_id_url.clone(),
      approval_type,
    })
  }
}

/// Exactly one `@` with something on both sides.
fn is_plausible_email(value: &str) -> bool {
  match value.split_once('@') {
    Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
    None => false,
  }
}

/// At least one digit; otherwise only `+ - ( )`, dots and spaces.
fn is_plausible_phone(value: &str) -> bool {
  value.chars().any(|c| c.is_ascii_digit())
    && value
      .chars()
      .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | '.' | ' '))
}
