// crates/voxjam-core/src/errors.rs
use std::fmt;

use thiserror::Error;

use crate::domain::{SetlistId, SongId};

/// Errors surfaced by the catalog engine.
///
/// Upper layers (UI, CLI, etc.) map these to user facing messages. None of
/// them is retried by the engine, and none leaves a half-applied change in
/// local state.
#[derive(Debug, Error)]
pub enum CatalogError {
  /// Bad input, rejected before any remote call.
  #[error("validation error: {0}")]
  Validation(String),

  #[error("not found: {0}")]
  NotFound(String),

  /// A remote call failed. Nothing was committed locally.
  #[error("sync error: {0}")]
  Sync(String),

  /// The song was deleted remotely but rewriting one or more setlists
  /// failed. Local state still holds the song and the original setlists.
  #[error("cascade delete of song {song} failed for {failures}")]
  Cascade { song: SongId, failures: SetlistFailures },

  /// Another mutation on the same record is still in flight.
  #[error("busy: {0}")]
  Busy(String),

  #[error("no authenticated identity")]
  Unauthenticated,

  /// The session ended while remote calls were outstanding.
  #[error("session ended before the change could be committed")]
  SessionEnded,
}

impl CatalogError {
  /// Setlists whose cascade rewrite failed, empty for other variants.
  pub fn failed_setlists(&self) -> Vec<SetlistId> {
    match self {
      CatalogError::Cascade { failures, .. } => failures.0.iter().map(|f| f.setlist).collect(),
      _ => Vec::new(),
    }
  }
}

/// One setlist that could not be rewritten during a cascade delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetlistFailure {
  pub setlist: SetlistId,
  pub name: String,
  pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetlistFailures(pub Vec<SetlistFailure>);

impl fmt::Display for SetlistFailures {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} setlist(s): ", self.0.len())?;

    for (i, failure) in self.0.iter().enumerate() {
      if i > 0 {
        write!(f, ", ")?;
      }
      write!(f, "\"{}\" ({}): {}", failure.name, failure.setlist, failure.reason)?;
    }

    Ok(())
  }
}
