#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use voxjam_core::CatalogStore;
use voxjam_core::domain::{Identity, Setlist, SetlistFields, SetlistId, Song, SongFields, SongId, SongStatus};
use voxjam_core::ports::{RemoteCatalog, RemoteError};

/// Remote calls as seen by the fake.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Call {
  ListSongs,
  CreateSong,
  UpdateSong(SongId),
  DeleteSong(SongId),
  ListSetlists,
  CreateSetlist,
  UpdateSetlist(SetlistId),
  DeleteSetlist(SetlistId),
}

/// Holds a call in flight until the test releases it.
#[derive(Debug, Default)]
pub struct Gate {
  pub entered: Notify,
  pub release: Notify,
}

#[derive(Default)]
struct FakeState {
  songs: Vec<Song>,
  setlists: Vec<Setlist>,
  clock: u64,
  calls: Vec<Call>,
  failing: HashSet<Call>,
  gates: HashMap<Call, Arc<Gate>>,
}

impl FakeState {
  fn tick(&mut self) -> String {
    self.clock += 1;
    format!("2024-05-01T20:00:00.{:06}Z", self.clock)
  }
}

/// In-memory [`RemoteCatalog`] with call recording and failure injection.
#[derive(Default)]
pub struct FakeRemote {
  state: Mutex<FakeState>,
}

impl FakeRemote {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn seed_song(&self, title: &str, duration: Option<&str>, added_by: &str) -> SongId {
    let mut st = self.state.lock().unwrap();
    let created_at = st.tick();
    let song = Song {
      id: SongId::new(),
      title: title.to_string(),
      artist: "The Band".to_string(),
      duration: duration.map(str::to_string),
      status: SongStatus::ToRehearse,
      added_by: added_by.to_string(),
      created_at,
    };
    let id = song.id;
    st.songs.push(song);
    id
  }

  pub fn seed_setlist(&self, name: &str, songs: Vec<SongId>) -> SetlistId {
    let mut st = self.state.lock().unwrap();
    let created_at = st.tick();
    let setlist = Setlist { id: SetlistId::new(), name: name.to_string(), songs, created_at };
    let id = setlist.id;
    st.setlists.push(setlist);
    id
  }

  pub fn fail(&self, call: Call) {
    self.state.lock().unwrap().failing.insert(call);
  }

  pub fn heal(&self, call: &Call) {
    self.state.lock().unwrap().failing.remove(call);
  }

  pub fn hold(&self, call: Call) -> Arc<Gate> {
    let gate = Arc::new(Gate::default());
    self.state.lock().unwrap().gates.insert(call, gate.clone());
    gate
  }

  pub fn calls(&self) -> Vec<Call> {
    self.state.lock().unwrap().calls.clone()
  }

  pub fn clear_calls(&self) {
    self.state.lock().unwrap().calls.clear();
  }

  pub fn stored_songs(&self) -> Vec<Song> {
    self.state.lock().unwrap().songs.clone()
  }

  pub fn stored_setlists(&self) -> Vec<Setlist> {
    self.state.lock().unwrap().setlists.clone()
  }

  async fn enter(&self, call: Call) -> Result<(), RemoteError> {
    let (fails, gate) = {
      let mut st = self.state.lock().unwrap();
      st.calls.push(call.clone());
      (st.failing.contains(&call), st.gates.get(&call).cloned())
    };

    if let Some(gate) = gate {
      gate.entered.notify_one();
      gate.release.notified().await;
    }

    if fails {
      return Err(RemoteError::Sync(format!("injected failure on {call:?}")));
    }
    Ok(())
  }
}

fn sorted<T: Clone>(items: &[T], created_at: impl Fn(&T) -> &str) -> Vec<T> {
  let mut items = items.to_vec();
  items.sort_by(|a, b| created_at(a).cmp(created_at(b)));
  items
}

#[async_trait]
impl RemoteCatalog for FakeRemote {
  async fn list_songs(&self) -> Result<Vec<Song>, RemoteError> {
    self.enter(Call::ListSongs).await?;
    let st = self.state.lock().unwrap();
    Ok(sorted(&st.songs, |s| s.created_at.as_str()))
  }

  async fn create_song(&self, fields: &SongFields) -> Result<Song, RemoteError> {
    self.enter(Call::CreateSong).await?;
    let mut st = self.state.lock().unwrap();
    let created_at = st.tick();
    let song = Song {
      id: SongId::new(),
      title: fields.title.clone(),
      artist: fields.artist.clone(),
      duration: fields.duration.clone(),
      status: fields.status.clone(),
      added_by: fields.added_by.clone(),
      created_at,
    };
    st.songs.push(song.clone());
    Ok(song)
  }

  async fn update_song(&self, id: SongId, fields: &SongFields) -> Result<(), RemoteError> {
    self.enter(Call::UpdateSong(id)).await?;
    let mut st = self.state.lock().unwrap();
    let song = st.songs.iter_mut().find(|s| s.id == id).ok_or(RemoteError::NotFound)?;
    song.apply(fields.clone());
    Ok(())
  }

  async fn delete_song(&self, id: SongId) -> Result<(), RemoteError> {
    self.enter(Call::DeleteSong(id)).await?;
    let mut st = self.state.lock().unwrap();
    let before = st.songs.len();
    st.songs.retain(|s| s.id != id);
    if st.songs.len() == before {
      return Err(RemoteError::NotFound);
    }
    Ok(())
  }

  async fn list_setlists(&self) -> Result<Vec<Setlist>, RemoteError> {
    self.enter(Call::ListSetlists).await?;
    let st = self.state.lock().unwrap();
    Ok(sorted(&st.setlists, |s| s.created_at.as_str()))
  }

  async fn create_setlist(&self, fields: &SetlistFields) -> Result<Setlist, RemoteError> {
    self.enter(Call::CreateSetlist).await?;
    let mut st = self.state.lock().unwrap();
    let created_at = st.tick();
    let setlist =
      Setlist { id: SetlistId::new(), name: fields.name.clone(), songs: fields.songs.clone(), created_at };
    st.setlists.push(setlist.clone());
    Ok(setlist)
  }

  async fn update_setlist(&self, id: SetlistId, fields: &SetlistFields) -> Result<(), RemoteError> {
    self.enter(Call::UpdateSetlist(id)).await?;
    let mut st = self.state.lock().unwrap();
    let setlist = st.setlists.iter_mut().find(|s| s.id == id).ok_or(RemoteError::NotFound)?;
    setlist.apply(fields.clone());
    Ok(())
  }

  async fn delete_setlist(&self, id: SetlistId) -> Result<(), RemoteError> {
    self.enter(Call::DeleteSetlist(id)).await?;
    let mut st = self.state.lock().unwrap();
    let before = st.setlists.len();
    st.setlists.retain(|s| s.id != id);
    if st.setlists.len() == before {
      return Err(RemoteError::NotFound);
    }
    Ok(())
  }
}

pub type TestStore = CatalogStore<Arc<FakeRemote>>;

/// Store signed in as `label`, without loading.
pub fn store_as(remote: &Arc<FakeRemote>, label: &str) -> TestStore {
  let store = CatalogStore::new(remote.clone());
  store.sign_in(Identity::new(label));
  store
}

/// Store signed in as `label` with the remote catalog loaded and the call log cleared.
pub async fn loaded_store_as(remote: &Arc<FakeRemote>, label: &str) -> TestStore {
  let store = store_as(remote, label);
  store.load_all().await.expect("initial load");
  remote.clear_calls();
  store
}

pub fn assert_referential_integrity(store: &TestStore) {
  let dangling = store.snapshot().dangling_references();
  assert!(dangling.is_empty(), "dangling setlist references: {dangling:?}");
}
