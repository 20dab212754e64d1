use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use crate::domain::{SetlistId, SongId};
use crate::errors::CatalogError;

/// Records a mutation intends to touch while its remote calls are in flight.
#[derive(Debug, Default, Clone)]
pub(crate) struct Claims {
  /// Songs being updated or deleted.
  songs: Vec<SongId>,
  /// Songs being deleted. Also present in `songs`.
  deletes: Vec<SongId>,
  /// Songs referenced by a setlist write. Shared between writers.
  refs: Vec<SongId>,
  setlists: Vec<SetlistId>,
  /// Whole-catalog reload. Excludes every mutation.
  load: bool,
}

impl Claims {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  pub(crate) fn load() -> Self {
    Self { load: true, ..Self::default() }
  }

  pub(crate) fn song(mut self, id: SongId) -> Self {
    self.songs.push(id);
    self
  }

  pub(crate) fn song_delete(mut self, id: SongId) -> Self {
    self.songs.push(id);
    self.deletes.push(id);
    self
  }

  pub(crate) fn referencing(mut self, ids: &[SongId]) -> Self {
    for id in ids {
      if !self.refs.contains(id) {
        self.refs.push(*id);
      }
    }
    self
  }

  pub(crate) fn setlist(mut self, id: SetlistId) -> Self {
    self.setlists.push(id);
    self
  }

  pub(crate) fn setlists(mut self, ids: impl IntoIterator<Item = SetlistId>) -> Self {
    self.setlists.extend(ids);
    self
  }
}

/// Bookkeeping of in-flight mutations.
#[derive(Debug, Default)]
pub(crate) struct ClaimTable {
  songs: HashSet<SongId>,
  deletes: HashSet<SongId>,
  refs: HashMap<SongId, usize>,
  setlists: HashSet<SetlistId>,
  /// Mutations in flight, including those that claim no record.
  pending: usize,
  loading: bool,
}

impl ClaimTable {
  fn conflict(&self, claims: &Claims) -> Option<String> {
    if self.loading {
      return Some("catalog load in progress".to_string());
    }
    if claims.load && self.pending > 0 {
      return Some(format!("{} change(s) still in flight", self.pending));
    }
    if let Some(id) = claims.songs.iter().find(|id| self.songs.contains(id)) {
      return Some(format!("song {id} has a pending change"));
    }
    if let Some(id) = claims.deletes.iter().find(|id| self.refs.contains_key(id)) {
      return Some(format!("song {id} is referenced by a pending setlist change"));
    }
    if let Some(id) = claims.refs.iter().find(|id| self.deletes.contains(id)) {
      return Some(format!("song {id} is being deleted"));
    }
    if let Some(id) = claims.setlists.iter().find(|id| self.setlists.contains(id)) {
      return Some(format!("setlist {id} has a pending change"));
    }

    None
  }

  fn insert(&mut self, claims: &Claims) {
    if claims.load {
      self.loading = true;
    } else {
      self.pending += 1;
    }
    self.songs.extend(claims.songs.iter().copied());
    self.deletes.extend(claims.deletes.iter().copied());
    for id in &claims.refs {
      *self.refs.entry(*id).or_default() += 1;
    }
    self.setlists.extend(claims.setlists.iter().copied());
  }

  fn remove(&mut self, claims: &Claims) {
    if claims.load {
      self.loading = false;
    } else {
      self.pending -= 1;
    }
    for id in &claims.songs {
      self.songs.remove(id);
    }
    for id in &claims.deletes {
      self.deletes.remove(id);
    }
    for id in &claims.refs {
      if let Some(count) = self.refs.get_mut(id) {
        *count -= 1;
        if *count == 0 {
          self.refs.remove(id);
        }
      }
    }
    for id in &claims.setlists {
      self.setlists.remove(id);
    }
  }

  #[cfg(test)]
  fn is_empty(&self) -> bool {
    self.songs.is_empty()
      && self.deletes.is_empty()
      && self.refs.is_empty()
      && self.setlists.is_empty()
      && self.pending == 0
      && !self.loading
  }
}

/// Registers `claims` or fails with [`CatalogError::Busy`] if any of them
/// overlaps with a mutation still in flight. Nothing is registered on failure.
pub(crate) fn acquire<'a>(
  table: &'a Mutex<ClaimTable>,
  claims: Claims,
) -> Result<ClaimGuard<'a>, CatalogError> {
  let mut guard = table.lock().unwrap_or_else(PoisonError::into_inner);

  if let Some(reason) = guard.conflict(&claims) {
    return Err(CatalogError::Busy(reason));
  }

  guard.insert(&claims);
  Ok(ClaimGuard { table, claims })
}

/// Releases its claims when dropped, on every exit path of a mutation.
#[derive(Debug)]
pub(crate) struct ClaimGuard<'a> {
  table: &'a Mutex<ClaimTable>,
  claims: Claims,
}

impl Drop for ClaimGuard<'_> {
  fn drop(&mut self) {
    let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
    table.remove(&self.claims);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn busy(result: Result<ClaimGuard<'_>, CatalogError>) -> bool {
    matches!(result, Err(CatalogError::Busy(_)))
  }

  #[test]
  fn same_song_cannot_be_claimed_twice() {
    let table = Mutex::new(ClaimTable::default());
    let id = SongId::new();

    let _first = acquire(&table, Claims::new().song(id)).unwrap();

    assert!(busy(acquire(&table, Claims::new().song_delete(id))));
    assert!(acquire(&table, Claims::new().song(SongId::new())).is_ok());
  }

  #[test]
  fn references_are_shared_but_block_deletion() {
    let table = Mutex::new(ClaimTable::default());
    let id = SongId::new();

    let first = acquire(&table, Claims::new().referencing(&[id])).unwrap();
    let second = acquire(&table, Claims::new().referencing(&[id, id])).unwrap();
    assert!(busy(acquire(&table, Claims::new().song_delete(id))));

    drop(first);
    assert!(busy(acquire(&table, Claims::new().song_delete(id))));

    drop(second);
    assert!(acquire(&table, Claims::new().song_delete(id)).is_ok());
  }

  #[test]
  fn pending_delete_blocks_new_references() {
    let table = Mutex::new(ClaimTable::default());
    let id = SongId::new();

    let _delete = acquire(&table, Claims::new().song_delete(id)).unwrap();

    assert!(busy(acquire(&table, Claims::new().setlist(SetlistId::new()).referencing(&[id]))));
  }

  #[test]
  fn failed_acquire_registers_nothing_and_drop_releases() {
    let table = Mutex::new(ClaimTable::default());
    let (song, setlist) = (SongId::new(), SetlistId::new());

    let held = acquire(&table, Claims::new().setlist(setlist)).unwrap();
    assert!(busy(acquire(&table, Claims::new().song(song).setlist(setlist))));
    assert!(acquire(&table, Claims::new().song(song)).is_ok());

    drop(held);
    assert!(table.lock().unwrap().is_empty());
  }

  #[test]
  fn load_excludes_every_mutation() {
    let table = Mutex::new(ClaimTable::default());

    let create = acquire(&table, Claims::new()).unwrap();
    assert!(busy(acquire(&table, Claims::load())));
    drop(create);

    let load = acquire(&table, Claims::load()).unwrap();
    assert!(busy(acquire(&table, Claims::new())));
    assert!(busy(acquire(&table, Claims::new().song_delete(SongId::new()))));
    assert!(busy(acquire(&table, Claims::load())));

    drop(load);
    assert!(table.lock().unwrap().is_empty());
  }
}
