use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Rehearsal state of a song.
///
/// Three values are known to the engine. Anything else read from storage is
/// kept verbatim in [`SongStatus::Other`] so that it round-trips untouched;
/// legacy aliases are recognised through [`SongStatus::canonical`], the rest
/// are shown with their raw text as label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SongStatus {
  /// Not rehearsed yet.
  ToRehearse,
  /// Part of a setlist, still being polished.
  InSet,
  /// Ready to be played live.
  Ready,
  /// Unknown value observed in storage.
  Other(String),
}

impl SongStatus {
  /// Value written to storage. Legacy values are written back as they were read.
  pub fn as_wire(&self) -> &str {
    match self {
      SongStatus::ToRehearse => "to_rehearse",
      SongStatus::InSet => "in_set",
      SongStatus::Ready => "ready",
      SongStatus::Other(raw) => raw,
    }
  }

  /// Known status this value stands for. The Italian values written by the
  /// first version of the app are aliases of the current ones; they stay
  /// [`SongStatus::Other`] so storage keeps its exact text.
  pub fn canonical(&self) -> Option<SongStatus> {
    let status = match self {
      SongStatus::Other(raw) => match raw.as_str() {
        "da_provare" => SongStatus::ToRehearse,
        "in_scaletta" => SongStatus::InSet,
        "pronto" => SongStatus::Ready,
        _ => return None,
      },
      known => known.clone(),
    };

    Some(status)
  }

  /// Wire value of the canonical status, or the raw text when unknown.
  pub fn canonical_wire(&self) -> &str {
    match self.canonical() {
      Some(SongStatus::ToRehearse) => "to_rehearse",
      Some(SongStatus::InSet) => "in_set",
      Some(SongStatus::Ready) => "ready",
      _ => self.as_wire(),
    }
  }

  /// Human readable label. Unknown values fall back to their raw text.
  pub fn label(&self) -> &str {
    match self.canonical() {
      Some(SongStatus::ToRehearse) => "To rehearse",
      Some(SongStatus::InSet) => "In set",
      Some(SongStatus::Ready) => "Ready",
      _ => self.as_wire(),
    }
  }

  pub fn is_known(&self) -> bool {
    self.canonical().is_some()
  }
}

impl Default for SongStatus {
  fn default() -> Self {
    SongStatus::ToRehearse
  }
}

impl FromStr for SongStatus {
  type Err = std::convert::Infallible;

  /// Parsing never fails.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let status = match s {
      "to_rehearse" => SongStatus::ToRehearse,
      "in_set" => SongStatus::InSet,
      "ready" => SongStatus::Ready,
      other => SongStatus::Other(other.to_string()),
    };

    Ok(status)
  }
}

impl From<String> for SongStatus {
  fn from(raw: String) -> Self {
    match raw.parse() {
      Ok(status) => status,
      Err(never) => match never {},
    }
  }
}

impl From<SongStatus> for String {
  fn from(status: SongStatus) -> Self {
    match status {
      SongStatus::Other(raw) => raw,
      known => known.as_wire().to_string(),
    }
  }
}

impl fmt::Display for SongStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}
