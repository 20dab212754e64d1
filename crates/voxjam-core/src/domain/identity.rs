use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used when an identity has nothing usable to show.
pub const UNKNOWN_IDENTITY: &str = "Unknown";

/// The authenticated user, as far as the catalog cares: a label stamped into
/// `added_by`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
  pub fn new(label: impl Into<String>) -> Self {
    let label = label.into();
    let trimmed = label.trim();

    if trimmed.is_empty() {
      return Identity(UNKNOWN_IDENTITY.to_string());
    }

    Identity(trimmed.to_string())
  }

  /// Derives the label from the local part of an e-mail address
  /// (`"anna@band.it"` → `"anna"`).
  pub fn from_email(email: &str) -> Self {
    let local = email.split('@').next().unwrap_or_default();
    Identity::new(local)
  }

  pub fn label(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Identity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
