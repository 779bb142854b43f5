//! Client-side search over a fetched contact list.

use crate::contact::Contact;

/// Whether `contact` matches `term`: a case-insensitive substring of its
/// name, email or relationship. The empty term matches everything.
pub fn matches(contact: &Contact, term: &str) -> bool {
  if term.is_empty() {
    return true;
  }
  let term = term.to_lowercase();
  [
    contact.name.as_str(),
    contact.email.as_str(),
    contact.relationship.as_ref(),
  ]
  .iter()
  .any(|field| field.to_lowercase().contains(&term))
}

/// The contacts matching `term`, in their original order.
pub fn filter_contacts<'a>(contacts: &'a [Contact], term: &str) -> Vec<&'a Contact> {
  contacts.iter().filter(|c| matches(c, term)).collect()
}
