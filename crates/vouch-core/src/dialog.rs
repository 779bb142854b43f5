//! Blocking modal primitives shared by every contact list.

/// An acknowledge-only message. Stays up until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub message: String,
}

impl Notice {
  pub fn new(message: impl Into<String>) -> Self {
    Self { message: message.into() }
  }
}

/// A two-action prompt guarding a destructive operation on `target`.
///
/// Both actions consume the dialog, so a confirmation can fire at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog<T> {
  pub message: String,
  target:      T,
}

impl<T> ConfirmDialog<T> {
  pub fn new(message: impl Into<String>, target: T) -> Self {
    Self { message: message.into(), target }
  }

  pub fn target(&self) -> &T { &self.target }

  /// Accept the prompt, yielding the target to act on.
  pub fn confirm(self) -> T { self.target }

  /// Dismiss the prompt without side effects.
  pub fn cancel(self) {}
}
