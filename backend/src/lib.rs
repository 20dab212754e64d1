mod config;
mod logging;

use anyhow::Context;
use tracing::info;

use voxjam_core::CatalogStore;
use voxjam_core::domain::Song;
use voxjam_storage::{SqliteCatalogRepository, StorageConfig};

pub use crate::config::{LoggingConfig, ViewConfig};
pub use crate::logging::init_tracing;

/// Store wired to the SQLite adapter.
pub type ConcreteCatalogStore = CatalogStore<SqliteCatalogRepository>;

/// Composition root handed to the UI layer.
pub struct Engine {
  store: ConcreteCatalogStore,
  view: ViewConfig,
}

impl Engine {
  /// Reads voxjam.toml, installs tracing and opens the configured database.
  ///
  /// The store starts signed out; the UI calls `sign_in` then `load_all`.
  pub fn bootstrap() -> anyhow::Result<Self> {
    // Logging first so the rest of the wiring is traced.
    let logging = LoggingConfig::load().context("loading [logging] config")?;
    init_tracing(&logging.filter);

    let storage = StorageConfig::load().context("loading [storage] config")?;
    let view = ViewConfig::load().context("loading [view] config")?;

    Self::from_config(&storage, view)
  }

  pub fn from_config(storage: &StorageConfig, view: ViewConfig) -> anyhow::Result<Self> {
    let repo = SqliteCatalogRepository::from_config(storage)
      .with_context(|| format!("opening catalog database {}", storage.db_path.display()))?;

    info!(db_path = %storage.db_path.display(), "catalog engine ready");
    Ok(Self::with_repository(repo, view))
  }

  pub fn with_repository(repo: SqliteCatalogRepository, view: ViewConfig) -> Self {
    Self { store: CatalogStore::new(repo), view }
  }

  pub fn store(&self) -> &ConcreteCatalogStore {
    &self.store
  }

  pub fn view(&self) -> ViewConfig {
    self.view
  }

  /// Changes the song list parameters for this session. Persisting them is
  /// up to the caller (`ViewConfig::save`).
  pub fn set_view(&mut self, view: ViewConfig) {
    self.view = view;
  }

  /// Song list under the current view parameters.
  pub fn songs_view(&self) -> Vec<Song> {
    let snapshot = self.store.snapshot();
    snapshot.songs_view(self.view.sort, self.view.filter).into_iter().cloned().collect()
  }

  /// Signs out and releases the database connection.
  pub fn shutdown(self) {
    drop(self.store.dispose());
    info!("catalog engine shut down");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;
  use voxjam_core::domain::{Identity, SongFields, SongStatus};
  use voxjam_core::{SortKey, StatusFilter};

  #[tokio::test]
  async fn songs_view_follows_view_config() {
    let dir = tempdir().unwrap();
    let storage = StorageConfig { db_path: dir.path().join("voxjam.db"), journal_mode: None };
    let mut engine = Engine::from_config(&storage, ViewConfig::default()).unwrap();

    let store = engine.store();
    store.sign_in(Identity::from_email("anna@band.it"));
    store.load_all().await.unwrap();
    store.create_song(SongFields::new("Zombie", "The Cranberries").with_status(SongStatus::Ready)).await.unwrap();
    store.create_song(SongFields::new("Alive", "Pearl Jam").with_status(SongStatus::InSet)).await.unwrap();
    store.create_song(SongFields::new("Black", "Pearl Jam").with_status(SongStatus::Ready)).await.unwrap();

    let titles = |engine: &Engine| engine.songs_view().into_iter().map(|s| s.title).collect::<Vec<_>>();

    // Default view: every song, ordered by status wire value.
    assert_eq!(titles(&engine), ["Alive", "Zombie", "Black"]);

    engine.set_view(ViewConfig { sort: SortKey::Title, filter: StatusFilter::Ready });
    assert_eq!(titles(&engine), ["Black", "Zombie"]);

    engine.shutdown();
  }

  #[tokio::test]
  async fn reopened_engine_sees_persisted_catalog() {
    let dir = tempdir().unwrap();
    let storage = StorageConfig { db_path: dir.path().join("data").join("voxjam.db"), journal_mode: Some("WAL".into()) };

    let engine = Engine::from_config(&storage, ViewConfig::default()).unwrap();
    engine.store().sign_in(Identity::new("marco"));
    engine.store().create_song(SongFields::new("Alive", "Pearl Jam")).await.unwrap();
    engine.shutdown();

    let engine = Engine::from_config(&storage, ViewConfig::default()).unwrap();
    engine.store().sign_in(Identity::new("marco"));
    engine.store().load_all().await.unwrap();

    let songs = engine.songs_view();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].added_by, "marco");
  }
}
