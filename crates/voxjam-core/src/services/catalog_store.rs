use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::future::join_all;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::domain::{Identity, Setlist, SetlistFields, SetlistId, Song, SongFields, SongId};
use crate::errors::{CatalogError, SetlistFailure, SetlistFailures};
use crate::ports::{RemoteCatalog, RemoteError};
use crate::projection::CatalogSnapshot;
use crate::services::claims::{self, ClaimTable, Claims};

#[derive(Debug, Default)]
struct CatalogState {
  songs: Vec<Song>,
  setlists: Vec<Setlist>,
  identity: Option<Identity>,
  /// Bumped whenever the session changes. Commits from an older epoch are dropped.
  epoch: u64,
}

impl CatalogState {
  fn song_index(&self, id: SongId) -> Option<usize> {
    self.songs.iter().position(|s| s.id == id)
  }

  fn setlist_index(&self, id: SetlistId) -> Option<usize> {
    self.setlists.iter().position(|s| s.id == id)
  }

  fn clear(&mut self) {
    self.songs.clear();
    self.setlists.clear();
  }
}

/// Identity and epoch captured when an operation starts.
#[derive(Debug, Clone)]
struct Session {
  identity: Identity,
  epoch: u64,
}

/// Authoritative in-memory catalog, synchronized with a [`RemoteCatalog`].
///
/// Every mutation writes through to the remote first and commits locally
/// only once all of its remote calls succeeded. A failed action leaves local
/// state exactly as it was.
pub struct CatalogStore<R>
where
  R: RemoteCatalog,
{
  remote: R,
  state: RwLock<CatalogState>,
  claims: Mutex<ClaimTable>,
  revision: watch::Sender<u64>,
}

impl<R> CatalogStore<R>
where
  R: RemoteCatalog,
{
  /// Empty, signed-out store.
  pub fn new(remote: R) -> Self {
    let (revision, _) = watch::channel(0);
    Self { remote, state: RwLock::new(CatalogState::default()), claims: Mutex::default(), revision }
  }

  pub fn remote(&self) -> &R {
    &self.remote
  }

  // -------- SESSION --------

  /// Sets the identity used to stamp songs. Switching to a different
  /// identity starts a new session: collections are cleared until the next
  /// [`load_all`](Self::load_all).
  pub fn sign_in(&self, identity: Identity) {
    let mut state = self.write();

    if state.identity.as_ref() == Some(&identity) {
      return;
    }
    if state.identity.is_some() {
      state.clear();
      state.epoch += 1;
    }

    info!(identity = %identity, "signed in");
    state.identity = Some(identity);
    drop(state);

    self.bump_revision();
  }

  /// Forgets the identity and both collections. Mutations still in flight
  /// will not commit.
  pub fn sign_out(&self) {
    let mut state = self.write();
    state.identity = None;
    state.clear();
    state.epoch += 1;
    drop(state);

    info!("signed out, catalog cleared");
    self.bump_revision();
  }

  /// Signs out and hands back the remote adapter.
  pub fn dispose(self) -> R {
    self.sign_out();
    self.remote
  }

  pub fn identity(&self) -> Option<Identity> {
    self.read().identity.clone()
  }

  pub fn is_signed_in(&self) -> bool {
    self.read().identity.is_some()
  }

  // -------- QUERY (read) --------

  pub fn songs(&self) -> Vec<Song> {
    self.read().songs.clone()
  }

  pub fn setlists(&self) -> Vec<Setlist> {
    self.read().setlists.clone()
  }

  pub fn song(&self, id: SongId) -> Option<Song> {
    self.read().songs.iter().find(|s| s.id == id).cloned()
  }

  pub fn setlist(&self, id: SetlistId) -> Option<Setlist> {
    self.read().setlists.iter().find(|s| s.id == id).cloned()
  }

  /// Consistent copy of both collections, for projections.
  pub fn snapshot(&self) -> CatalogSnapshot {
    let state = self.read();
    CatalogSnapshot {
      songs: state.songs.clone(),
      setlists: state.setlists.clone(),
      revision: *self.revision.borrow(),
    }
  }

  /// Counter bumped on every committed change.
  pub fn revision(&self) -> u64 {
    *self.revision.borrow()
  }

  /// Receiver notified on every committed change.
  pub fn subscribe(&self) -> watch::Receiver<u64> {
    self.revision.subscribe()
  }

  // -------- LOAD --------

  /// Replaces both collections with the remote ones. Either both are
  /// replaced or neither is.
  ///
  /// Refused with [`CatalogError::Busy`] while a mutation is in flight, and
  /// mutations are refused while a load is, so a load never commits a view
  /// that a concurrent change already invalidated.
  #[instrument(skip(self))]
  pub async fn load_all(&self) -> Result<(), CatalogError> {
    let session = self.session()?;
    let _claim = claims::acquire(&self.claims, Claims::load())?;

    let (songs, setlists) = futures::try_join!(self.remote.list_songs(), self.remote.list_setlists())
      .map_err(|e| {
        warn!(error = %e, "catalog load failed, keeping previous state");
        CatalogError::Sync(format!("load catalog: {e}"))
      })?;

    let dangling = count_dangling(&songs, &setlists);
    if dangling > 0 {
      warn!(dangling, "loaded setlists reference songs that do not exist");
    }

    let (song_count, setlist_count) = (songs.len(), setlists.len());
    self.commit(session.epoch, move |state| {
      state.songs = songs;
      state.setlists = setlists;
    })?;

    info!(songs = song_count, setlists = setlist_count, "catalog loaded");
    Ok(())
  }

  // -------- SONGS --------

  #[instrument(skip(self, fields), fields(title = %fields.title))]
  pub async fn create_song(&self, fields: SongFields) -> Result<Song, CatalogError> {
    let session = self.session()?;
    let _claim = claims::acquire(&self.claims, Claims::new())?;
    let fields = validate_song(fields)?.stamped(&session.identity);

    let song = self.remote.create_song(&fields).await.map_err(|e| remote_failure("create song", e))?;
    debug!(song = %song.id, "song persisted");

    let committed = song.clone();
    self.commit(session.epoch, move |state| state.songs.push(committed))?;

    Ok(song)
  }

  /// Replaces every editable attribute. `added_by` is re-stamped with the
  /// current identity: it tracks the last editor.
  #[instrument(skip(self, fields))]
  pub async fn update_song(&self, id: SongId, fields: SongFields) -> Result<Song, CatalogError> {
    let session = self.session()?;
    let _claim = claims::acquire(&self.claims, Claims::new().song(id))?;

    if self.read().song_index(id).is_none() {
      return Err(song_not_found(id));
    }
    let fields = validate_song(fields)?.stamped(&session.identity);

    self.remote.update_song(id, &fields).await.map_err(|e| remote_failure("update song", e))?;
    debug!(song = %id, "song update persisted");

    self.commit(session.epoch, move |state| -> Result<Song, CatalogError> {
      let index = state.song_index(id).ok_or_else(|| song_not_found(id))?;
      let song = &mut state.songs[index];
      song.apply(fields);
      Ok(song.clone())
    })?
  }

  /// Deletes a song and removes it from every setlist referencing it.
  ///
  /// Remote order: the song first, then every setlist whose sequence
  /// changes. Local state is committed only after all of them succeeded, so
  /// a failure anywhere leaves the catalog untouched.
  #[instrument(skip(self))]
  pub async fn delete_song(&self, id: SongId) -> Result<(), CatalogError> {
    let session = self.session()?;
    let _song_claim = claims::acquire(&self.claims, Claims::new().song_delete(id))?;

    let rewrites: Vec<(SetlistId, String, SetlistFields)> = {
      let state = self.read();
      if state.song_index(id).is_none() {
        return Err(song_not_found(id));
      }

      state
        .setlists
        .iter()
        .filter_map(|setlist| {
          let songs = setlist.without_song(id)?;
          Some((setlist.id, setlist.name.clone(), SetlistFields { name: setlist.name.clone(), songs }))
        })
        .collect()
    };
    let _setlist_claims =
      claims::acquire(&self.claims, Claims::new().setlists(rewrites.iter().map(|(sid, _, _)| *sid)))?;

    self.remote.delete_song(id).await.map_err(|e| remote_failure("delete song", e))?;
    debug!(song = %id, setlists = rewrites.len(), "song deleted remotely, rewriting setlists");

    let results = join_all(
      rewrites.iter().map(|(setlist_id, _, fields)| self.remote.update_setlist(*setlist_id, fields)),
    )
    .await;

    let failures: Vec<SetlistFailure> = rewrites
      .iter()
      .zip(results)
      .filter_map(|((setlist, name, _), result)| {
        result.err().map(|e| SetlistFailure { setlist: *setlist, name: name.clone(), reason: e.to_string() })
      })
      .collect();

    if !failures.is_empty() {
      warn!(song = %id, failed = failures.len(), "cascade delete failed, nothing committed");
      return Err(CatalogError::Cascade { song: id, failures: SetlistFailures(failures) });
    }

    self.commit(session.epoch, move |state| {
      state.songs.retain(|s| s.id != id);
      for (setlist_id, _, fields) in rewrites {
        if let Some(index) = state.setlist_index(setlist_id) {
          state.setlists[index].songs = fields.songs;
        }
      }
    })?;

    Ok(())
  }

  // -------- SETLISTS --------

  #[instrument(skip(self, songs), fields(songs = songs.len()))]
  pub async fn create_setlist(&self, name: &str, songs: Vec<SongId>) -> Result<Setlist, CatalogError> {
    let session = self.session()?;
    let _claim = claims::acquire(&self.claims, Claims::new().referencing(&songs))?;
    let fields = self.validate_setlist(name, songs)?;

    let setlist =
      self.remote.create_setlist(&fields).await.map_err(|e| remote_failure("create setlist", e))?;
    debug!(setlist = %setlist.id, "setlist persisted");

    let committed = setlist.clone();
    self.commit(session.epoch, move |state| state.setlists.push(committed))?;

    Ok(setlist)
  }

  #[instrument(skip(self, songs), fields(songs = songs.len()))]
  pub async fn update_setlist(
    &self,
    id: SetlistId,
    name: &str,
    songs: Vec<SongId>,
  ) -> Result<Setlist, CatalogError> {
    let session = self.session()?;
    let _claim = claims::acquire(&self.claims, Claims::new().setlist(id).referencing(&songs))?;

    if self.read().setlist_index(id).is_none() {
      return Err(setlist_not_found(id));
    }
    let fields = self.validate_setlist(name, songs)?;

    self.remote.update_setlist(id, &fields).await.map_err(|e| remote_failure("update setlist", e))?;
    debug!(setlist = %id, "setlist update persisted");

    self.commit(session.epoch, move |state| -> Result<Setlist, CatalogError> {
      let index = state.setlist_index(id).ok_or_else(|| setlist_not_found(id))?;
      let setlist = &mut state.setlists[index];
      setlist.apply(fields);
      Ok(setlist.clone())
    })?
  }

  /// Setlists are leaves: nothing else references them.
  #[instrument(skip(self))]
  pub async fn delete_setlist(&self, id: SetlistId) -> Result<(), CatalogError> {
    let session = self.session()?;
    let _claim = claims::acquire(&self.claims, Claims::new().setlist(id))?;

    if self.read().setlist_index(id).is_none() {
      return Err(setlist_not_found(id));
    }

    self.remote.delete_setlist(id).await.map_err(|e| remote_failure("delete setlist", e))?;

    self.commit(session.epoch, move |state| state.setlists.retain(|s| s.id != id))
  }

  // -------- internals --------

  fn read(&self) -> RwLockReadGuard<'_, CatalogState> {
    self.state.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn write(&self) -> RwLockWriteGuard<'_, CatalogState> {
    self.state.write().unwrap_or_else(PoisonError::into_inner)
  }

  fn session(&self) -> Result<Session, CatalogError> {
    let state = self.read();
    let identity = state.identity.clone().ok_or(CatalogError::Unauthenticated)?;
    Ok(Session { identity, epoch: state.epoch })
  }

  /// Applies `change` if the session that started the operation is still the
  /// current one. The write lock is never held across an `.await`.
  fn commit<T>(&self, epoch: u64, change: impl FnOnce(&mut CatalogState) -> T) -> Result<T, CatalogError> {
    let mut state = self.write();

    if state.epoch != epoch {
      warn!("session changed while remote calls were in flight, dropping commit");
      return Err(CatalogError::SessionEnded);
    }

    let out = change(&mut state);
    drop(state);

    self.bump_revision();
    Ok(out)
  }

  fn bump_revision(&self) {
    self.revision.send_modify(|rev| *rev += 1);
  }

  fn validate_setlist(&self, name: &str, songs: Vec<SongId>) -> Result<SetlistFields, CatalogError> {
    let name = name.trim();
    if name.is_empty() {
      return Err(CatalogError::Validation("setlist name is required".into()));
    }
    if songs.is_empty() {
      return Err(CatalogError::Validation("a setlist needs at least one song".into()));
    }

    let state = self.read();
    if let Some(missing) = songs.iter().find(|id| state.song_index(**id).is_none()) {
      return Err(CatalogError::Validation(format!("unknown song {missing}")));
    }

    Ok(SetlistFields { name: name.to_string(), songs })
  }
}

fn validate_song(fields: SongFields) -> Result<SongFields, CatalogError> {
  let fields = fields.normalized();

  if fields.title.is_empty() {
    return Err(CatalogError::Validation("song title is required".into()));
  }
  if fields.artist.is_empty() {
    return Err(CatalogError::Validation("song artist is required".into()));
  }

  Ok(fields)
}

fn remote_failure(action: &str, err: RemoteError) -> CatalogError {
  warn!(action, error = %err, "remote call failed");
  match err {
    RemoteError::NotFound => CatalogError::NotFound(format!("{action}: record no longer exists remotely")),
    RemoteError::Sync(msg) => CatalogError::Sync(format!("{action}: {msg}")),
  }
}

fn song_not_found(id: SongId) -> CatalogError {
  CatalogError::NotFound(format!("song {id}"))
}

fn setlist_not_found(id: SetlistId) -> CatalogError {
  CatalogError::NotFound(format!("setlist {id}"))
}

fn count_dangling(songs: &[Song], setlists: &[Setlist]) -> usize {
  setlists
    .iter()
    .flat_map(|setlist| setlist.songs.iter())
    .filter(|id| !songs.iter().any(|song| song.id == **id))
    .count()
}
