//! Derived, read-only views of the catalog.
//!
//! Everything here is a pure function of a snapshot plus view parameters.
//! Nothing is cached or persisted: callers recompute whenever the store's
//! revision changes.

pub mod duration;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Setlist, Song, SongId, SongStatus};

/// Field the song list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
  Title,
  Artist,
  #[default]
  Status,
}

impl SortKey {
  fn key(&self, song: &Song) -> String {
    match self {
      SortKey::Title => song.title.to_lowercase(),
      SortKey::Artist => song.artist.to_lowercase(),
      SortKey::Status => song.status.canonical_wire().to_lowercase(),
    }
  }
}

/// Which songs the list keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
  #[default]
  All,
  ToRehearse,
  InSet,
  Ready,
}

impl StatusFilter {
  /// Legacy values match their canonical status. Songs with an unknown
  /// status only show up under [`StatusFilter::All`].
  pub fn matches(&self, status: &SongStatus) -> bool {
    let wanted = match self {
      StatusFilter::All => return true,
      StatusFilter::ToRehearse => SongStatus::ToRehearse,
      StatusFilter::InSet => SongStatus::InSet,
      StatusFilter::Ready => SongStatus::Ready,
    };

    status.canonical() == Some(wanted)
  }
}

/// Filtered and sorted song list.
///
/// Comparison is lexicographic on the lowercased field. The sort is stable:
/// songs with equal keys keep their catalog (insertion) order.
pub fn project_songs(songs: &[Song], sort: SortKey, filter: StatusFilter) -> Vec<&Song> {
  let mut keyed: Vec<(String, &Song)> =
    songs.iter().filter(|song| filter.matches(&song.status)).map(|song| (sort.key(song), song)).collect();

  keyed.sort_by(|a, b| a.0.cmp(&b.0));
  keyed.into_iter().map(|(_, song)| song).collect()
}

/// Total duration of a sequence of song ids, as `minutes:seconds`.
///
/// Ids without a matching song and songs with an absent or malformed
/// duration add nothing. An empty sequence gives `"0:00"`.
pub fn setlist_duration(song_ids: &[SongId], songs: &[Song]) -> String {
  let by_id: HashMap<SongId, &Song> = songs.iter().map(|song| (song.id, song)).collect();

  duration::sum(
    song_ids.iter().filter_map(|id| by_id.get(id)).map(|song| song.duration.as_deref()),
  )
}

/// A setlist resolved against the song collection.
#[derive(Debug, Clone, PartialEq)]
pub struct SetlistView<'a> {
  pub setlist: &'a Setlist,
  /// Songs in performance order. Unknown ids are skipped.
  pub songs: Vec<&'a Song>,
  pub duration: String,
}

pub fn setlist_views<'a>(setlists: &'a [Setlist], songs: &'a [Song]) -> Vec<SetlistView<'a>> {
  let by_id: HashMap<SongId, &Song> = songs.iter().map(|song| (song.id, song)).collect();

  setlists
    .iter()
    .map(|setlist| {
      let resolved: Vec<&Song> = setlist.songs.iter().filter_map(|id| by_id.get(id).copied()).collect();
      let duration = duration::sum(resolved.iter().map(|song| song.duration.as_deref()));
      SetlistView { setlist, songs: resolved, duration }
    })
    .collect()
}

/// Point-in-time copy of the catalog, taken with
/// [`CatalogStore::snapshot`](crate::services::CatalogStore::snapshot).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
  pub songs: Vec<Song>,
  pub setlists: Vec<Setlist>,
  /// Store revision the snapshot was taken at.
  pub revision: u64,
}

impl CatalogSnapshot {
  pub fn songs_view(&self, sort: SortKey, filter: StatusFilter) -> Vec<&Song> {
    project_songs(&self.songs, sort, filter)
  }

  pub fn setlist_views(&self) -> Vec<SetlistView<'_>> {
    setlist_views(&self.setlists, &self.songs)
  }

  pub fn duration_of(&self, setlist: &Setlist) -> String {
    setlist_duration(&setlist.songs, &self.songs)
  }

  /// Setlist references that do not resolve to a song.
  pub fn dangling_references(&self) -> Vec<SongId> {
    self
      .setlists
      .iter()
      .flat_map(|setlist| setlist.songs.iter().copied())
      .filter(|id| !self.songs.iter().any(|song| song.id == *id))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::SetlistId;

  fn song(title: &str, artist: &str, status: SongStatus, duration: Option<&str>) -> Song {
    Song {
      id: SongId::new(),
      title: title.into(),
      artist: artist.into(),
      duration: duration.map(Into::into),
      status,
      added_by: "anna".into(),
      created_at: String::new(),
    }
  }

  fn titles(view: &[&Song]) -> Vec<String> {
    view.iter().map(|s| s.title.clone()).collect()
  }

  #[test]
  fn status_sort_is_stable() {
    let songs = vec![
      song("B", "x", SongStatus::Ready, None),
      song("A", "x", SongStatus::ToRehearse, None),
      song("C", "x", SongStatus::Ready, None),
      song("D", "x", SongStatus::InSet, None),
      song("E", "x", SongStatus::Ready, None),
    ];

    let view = project_songs(&songs, SortKey::Status, StatusFilter::All);

    // in_set < ready < to_rehearse, ready songs keep B, C, E order.
    assert_eq!(titles(&view), ["D", "B", "C", "E", "A"]);
  }

  #[test]
  fn title_sort_ignores_case() {
    let songs = vec![
      song("zombie", "x", SongStatus::Ready, None),
      song("Alive", "x", SongStatus::Ready, None),
      song("bohemian", "x", SongStatus::Ready, None),
    ];

    let view = project_songs(&songs, SortKey::Title, StatusFilter::All);

    assert_eq!(titles(&view), ["Alive", "bohemian", "zombie"]);
  }

  #[test]
  fn filter_keeps_matching_status_only() {
    let songs = vec![
      song("A", "x", SongStatus::Ready, None),
      song("B", "x", SongStatus::InSet, None),
      song("C", "x", SongStatus::Other("on_hold".into()), None),
    ];

    assert_eq!(titles(&project_songs(&songs, SortKey::Artist, StatusFilter::InSet)), ["B"]);
    assert_eq!(project_songs(&songs, SortKey::Artist, StatusFilter::All).len(), 3);
  }

  #[test]
  fn legacy_statuses_filter_and_sort_with_their_canonical_status() {
    let songs = vec![
      song("A", "x", SongStatus::Other("pronto".into()), None),
      song("B", "x", SongStatus::ToRehearse, None),
      song("C", "x", SongStatus::Ready, None),
      song("D", "x", SongStatus::Other("in_scaletta".into()), None),
    ];

    assert_eq!(titles(&project_songs(&songs, SortKey::Title, StatusFilter::Ready)), ["A", "C"]);
    assert_eq!(titles(&project_songs(&songs, SortKey::Status, StatusFilter::All)), ["D", "A", "C", "B"]);
    assert_eq!(songs[0].status.as_wire(), "pronto");
  }

  #[test]
  fn duration_skips_unknown_ids_and_bad_values() {
    let songs = vec![
      song("A", "x", SongStatus::Ready, Some("3:45")),
      song("B", "x", SongStatus::Ready, Some("abc")),
      song("C", "x", SongStatus::Ready, None),
      song("D", "x", SongStatus::Ready, Some("2:30")),
    ];
    let ids: Vec<SongId> = songs.iter().map(|s| s.id).chain([SongId::new()]).collect();

    assert_eq!(setlist_duration(&ids, &songs), "6:15");
    assert_eq!(setlist_duration(&[], &songs), "0:00");
    assert_eq!(setlist_duration(&[songs[1].id], &songs), "0:00");
  }

  #[test]
  fn repeated_ids_count_each_time() {
    let songs = vec![song("A", "x", SongStatus::Ready, Some("2:00"))];

    assert_eq!(setlist_duration(&[songs[0].id, songs[0].id], &songs), "4:00");
  }

  #[test]
  fn setlist_views_resolve_songs_in_order() {
    let songs = vec![song("A", "x", SongStatus::Ready, Some("1:00")), song("B", "x", SongStatus::Ready, Some("0:30"))];
    let setlists = vec![Setlist {
      id: SetlistId::new(),
      name: "Friday".into(),
      songs: vec![songs[1].id, SongId::new(), songs[0].id],
      created_at: String::new(),
    }];

    let views = setlist_views(&setlists, &songs);

    assert_eq!(views.len(), 1);
    assert_eq!(titles(&views[0].songs), ["B", "A"]);
    assert_eq!(views[0].duration, "1:30");
  }
}
