use crate::domain::identity::Identity;
use crate::domain::ids::SongId;
use crate::domain::status::SongStatus;
use serde::{Deserialize, Serialize};

/// A song in the band's repertoire, as persisted.
///
/// Field names match the stored record:
/// `{ id, title, artist, duration, status, added_by, created_at }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
  /// Assigned by persistence on creation.
  pub id: SongId,
  pub title: String,
  pub artist: String,
  /// Free text in `minutes:seconds` form. `None` means unknown.
  pub duration: Option<String>,
  pub status: SongStatus,
  /// Label of the last identity that created or edited the song.
  pub added_by: String,
  /// Creation timestamp assigned by persistence. Drives load order.
  pub created_at: String,
}

impl Song {
  /// Overwrites every editable attribute. `id` and `created_at` stay.
  pub fn apply(&mut self, fields: SongFields) {
    self.title = fields.title;
    self.artist = fields.artist;
    self.duration = fields.duration;
    self.status = fields.status;
    self.added_by = fields.added_by;
  }

  pub fn fields(&self) -> SongFields {
    SongFields {
      title: self.title.clone(),
      artist: self.artist.clone(),
      duration: self.duration.clone(),
      status: self.status.clone(),
      added_by: self.added_by.clone(),
    }
  }
}

/// Editable attributes of a song, used both as form input and as the payload
/// sent to the remote catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongFields {
  pub title: String,
  pub artist: String,
  pub duration: Option<String>,
  pub status: SongStatus,
  /// Ignored on input: the store always stamps the current identity.
  pub added_by: String,
}

impl SongFields {
  pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
    SongFields { title: title.into(), artist: artist.into(), ..Default::default() }
  }

  pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
    self.duration = Some(duration.into());
    self
  }

  pub fn with_status(mut self, status: SongStatus) -> Self {
    self.status = status;
    self
  }

  /// Trims text fields and turns a blank duration into `None`.
  pub fn normalized(self) -> Self {
    let duration = self.duration.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());

    SongFields {
      title: self.title.trim().to_string(),
      artist: self.artist.trim().to_string(),
      duration,
      status: self.status,
      added_by: self.added_by,
    }
  }

  pub fn stamped(mut self, identity: &Identity) -> Self {
    self.added_by = identity.label().to_string();
    self
  }
}
