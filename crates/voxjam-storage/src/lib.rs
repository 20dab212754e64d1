pub mod config;
pub mod models;
pub mod schema;

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use voxjam_config::ConfigError;
use voxjam_core::domain::{Setlist, SetlistFields, SetlistId, Song, SongFields, SongId};
use voxjam_core::ports::{RemoteCatalog, RemoteError};

pub use crate::config::StorageConfig;
use crate::models::{NewSetlistRow, NewSongRow, SetlistRow, SongRow};
use crate::schema::{setlists, songs};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
  #[error("connection error: {0}")]
  Connection(#[from] diesel::ConnectionError),
  #[error("query error: {0}")]
  Query(#[from] diesel::result::Error),
  #[error("migration error: {0}")]
  Migration(String),
  #[error("config error: {0}")]
  Config(#[from] ConfigError),
  #[error("unsupported journal_mode {0:?}")]
  JournalMode(String),
}

/// Journal modes SQLite accepts in `PRAGMA journal_mode`.
const JOURNAL_MODES: [&str; 6] = ["DELETE", "TRUNCATE", "PERSIST", "MEMORY", "WAL", "OFF"];

/// Pragma for a configured journal mode. Config text never reaches SQL
/// unless it names one of [`JOURNAL_MODES`].
fn journal_mode_pragma(mode: &str) -> Result<String, StorageError> {
  let mode = mode.trim().to_ascii_uppercase();
  if !JOURNAL_MODES.contains(&mode.as_str()) {
    return Err(StorageError::JournalMode(mode));
  }

  Ok(format!("PRAGMA journal_mode = {mode};"))
}

/// SQLite implementation of [`RemoteCatalog`].
///
/// Ids are UUID v4 strings generated here; `created_at` comes from the
/// column default, so the database is the only clock.
pub struct SqliteCatalogRepository {
  conn: Mutex<SqliteConnection>,
}

impl SqliteCatalogRepository {
  /// Opens (or creates) the database and applies pending migrations.
  pub fn open(database_url: &str) -> Result<Self, StorageError> {
    let mut conn = SqliteConnection::establish(database_url)?;
    conn.batch_execute("PRAGMA foreign_keys = ON;")?;

    let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| StorageError::Migration(e.to_string()))?;
    if !applied.is_empty() {
      info!(database_url, migrations = applied.len(), "catalog schema migrated");
    }

    Ok(Self { conn: Mutex::new(conn) })
  }

  /// Throwaway database, mostly for tests.
  pub fn in_memory() -> Result<Self, StorageError> {
    Self::open(":memory:")
  }

  pub fn from_config(cfg: &StorageConfig) -> Result<Self, StorageError> {
    let journal_pragma = cfg.journal_mode.as_deref().map(journal_mode_pragma).transpose()?;

    if let Some(parent) = cfg.db_path.parent() {
      std::fs::create_dir_all(parent).map_err(ConfigError::from)?;
    }

    let repo = Self::open(&cfg.db_path.to_string_lossy())?;

    if let Some(pragma) = journal_pragma {
      repo.lock().batch_execute(&pragma)?;
    }

    Ok(repo)
  }

  /// Reads `[storage]` from the global config and opens that database.
  pub fn new_from_config() -> Result<Self, StorageError> {
    let cfg = StorageConfig::load()?;
    Self::from_config(&cfg)
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, SqliteConnection> {
    self.conn.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

fn query_error(e: diesel::result::Error) -> RemoteError {
  RemoteError::Sync(format!("sqlite: {e}"))
}

fn row_to_song(row: SongRow) -> Result<Song, RemoteError> {
  let id = row.id.parse::<SongId>().map_err(|e| RemoteError::Sync(format!("invalid song id {:?}: {e}", row.id)))?;

  Ok(Song {
    id,
    title: row.title,
    artist: row.artist,
    duration: row.duration,
    status: row.status.into(),
    added_by: row.added_by,
    created_at: row.created_at,
  })
}

fn row_to_setlist(row: SetlistRow) -> Result<Setlist, RemoteError> {
  let id =
    row.id.parse::<SetlistId>().map_err(|e| RemoteError::Sync(format!("invalid setlist id {:?}: {e}", row.id)))?;
  let songs: Vec<SongId> = serde_json::from_str(&row.songs)
    .map_err(|e| RemoteError::Sync(format!("invalid song list in setlist {id}: {e}")))?;

  Ok(Setlist { id, name: row.name, songs, created_at: row.created_at })
}

fn encode_songs(ids: &[SongId]) -> Result<String, RemoteError> {
  serde_json::to_string(ids).map_err(|e| RemoteError::Sync(format!("encode song list: {e}")))
}

fn expect_one(affected: usize) -> Result<(), RemoteError> {
  if affected == 0 { Err(RemoteError::NotFound) } else { Ok(()) }
}

#[async_trait]
impl RemoteCatalog for SqliteCatalogRepository {
  async fn list_songs(&self) -> Result<Vec<Song>, RemoteError> {
    let rows = songs::table
      .order((songs::created_at.asc(), songs::seq.asc()))
      .load::<SongRow>(&mut *self.lock())
      .map_err(query_error)?;

    rows.into_iter().map(row_to_song).collect()
  }

  async fn create_song(&self, fields: &SongFields) -> Result<Song, RemoteError> {
    let new_row = NewSongRow {
      id: SongId::new().to_string(),
      title: &fields.title,
      artist: &fields.artist,
      duration: fields.duration.as_deref(),
      status: fields.status.as_wire(),
      added_by: &fields.added_by,
    };

    let row = diesel::insert_into(songs::table)
      .values(&new_row)
      .get_result::<SongRow>(&mut *self.lock())
      .map_err(query_error)?;

    debug!(id = %row.id, "song row inserted");
    row_to_song(row)
  }

  async fn update_song(&self, id: SongId, fields: &SongFields) -> Result<(), RemoteError> {
    let affected = diesel::update(songs::table.filter(songs::id.eq(id.to_string())))
      .set((
        songs::title.eq(&fields.title),
        songs::artist.eq(&fields.artist),
        songs::duration.eq(fields.duration.as_deref()),
        songs::status.eq(fields.status.as_wire()),
        songs::added_by.eq(&fields.added_by),
      ))
      .execute(&mut *self.lock())
      .map_err(query_error)?;

    expect_one(affected)
  }

  async fn delete_song(&self, id: SongId) -> Result<(), RemoteError> {
    let affected = diesel::delete(songs::table.filter(songs::id.eq(id.to_string())))
      .execute(&mut *self.lock())
      .map_err(query_error)?;

    expect_one(affected)
  }

  async fn list_setlists(&self) -> Result<Vec<Setlist>, RemoteError> {
    let rows = setlists::table
      .order((setlists::created_at.asc(), setlists::seq.asc()))
      .load::<SetlistRow>(&mut *self.lock())
      .map_err(query_error)?;

    rows.into_iter().map(row_to_setlist).collect()
  }

  async fn create_setlist(&self, fields: &SetlistFields) -> Result<Setlist, RemoteError> {
    let new_row =
      NewSetlistRow { id: SetlistId::new().to_string(), name: &fields.name, songs: encode_songs(&fields.songs)? };

    let row = diesel::insert_into(setlists::table)
      .values(&new_row)
      .get_result::<SetlistRow>(&mut *self.lock())
      .map_err(query_error)?;

    debug!(id = %row.id, "setlist row inserted");
    row_to_setlist(row)
  }

  async fn update_setlist(&self, id: SetlistId, fields: &SetlistFields) -> Result<(), RemoteError> {
    let encoded = encode_songs(&fields.songs)?;

    let affected = diesel::update(setlists::table.filter(setlists::id.eq(id.to_string())))
      .set((setlists::name.eq(&fields.name), setlists::songs.eq(encoded)))
      .execute(&mut *self.lock())
      .map_err(query_error)?;

    expect_one(affected)
  }

  async fn delete_setlist(&self, id: SetlistId) -> Result<(), RemoteError> {
    let affected = diesel::delete(setlists::table.filter(setlists::id.eq(id.to_string())))
      .execute(&mut *self.lock())
      .map_err(query_error)?;

    expect_one(affected)
  }
}
