use crate::domain::ids::{SetlistId, SongId};
use serde::{Deserialize, Serialize};

/// An ordered selection of songs for a gig.
///
/// Stored as `{ id, name, songs, created_at }`. The order of `songs` is the
/// performance order. Duplicates are allowed by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setlist {
  pub id: SetlistId,
  pub name: String,
  pub songs: Vec<SongId>,
  pub created_at: String,
}

impl Setlist {
  pub fn contains(&self, song: SongId) -> bool {
    self.songs.contains(&song)
  }

  /// Sequence with every occurrence of `song` removed, or `None` when the
  /// setlist does not reference it.
  pub fn without_song(&self, song: SongId) -> Option<Vec<SongId>> {
    if !self.contains(song) {
      return None;
    }

    Some(self.songs.iter().copied().filter(|id| *id != song).collect())
  }

  pub fn apply(&mut self, fields: SetlistFields) {
    self.name = fields.name;
    self.songs = fields.songs;
  }

  pub fn fields(&self) -> SetlistFields {
    SetlistFields { name: self.name.clone(), songs: self.songs.clone() }
  }
}

/// Editable attributes of a setlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetlistFields {
  pub name: String,
  pub songs: Vec<SongId>,
}

impl SetlistFields {
  pub fn new(name: impl Into<String>, songs: Vec<SongId>) -> Self {
    SetlistFields { name: name.into(), songs }
  }
}
