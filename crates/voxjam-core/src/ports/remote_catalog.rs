use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Setlist, SetlistFields, SetlistId, Song, SongFields, SongId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
  #[error("record not found")]
  NotFound,
  /// Any other failure: transport, timeout, storage, decoding.
  #[error("remote failure: {0}")]
  Sync(String),
}

/// Port towards the persisted catalog.
///
/// Implementations only need plain CRUD per record type. The engine never
/// assumes transactions across calls: sequencing and all-or-nothing commits
/// are handled by [`CatalogStore`](crate::services::CatalogStore).
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
  /// All songs, ordered by creation time ascending.
  async fn list_songs(&self) -> Result<Vec<Song>, RemoteError>;
  /// Persists a new song and returns it with its assigned `id` and `created_at`.
  async fn create_song(&self, fields: &SongFields) -> Result<Song, RemoteError>;
  async fn update_song(&self, id: SongId, fields: &SongFields) -> Result<(), RemoteError>;
  async fn delete_song(&self, id: SongId) -> Result<(), RemoteError>;

  /// All setlists, ordered by creation time ascending.
  async fn list_setlists(&self) -> Result<Vec<Setlist>, RemoteError>;
  async fn create_setlist(&self, fields: &SetlistFields) -> Result<Setlist, RemoteError>;
  async fn update_setlist(&self, id: SetlistId, fields: &SetlistFields) -> Result<(), RemoteError>;
  async fn delete_setlist(&self, id: SetlistId) -> Result<(), RemoteError>;
}

#[async_trait]
impl<T: RemoteCatalog + ?Sized> RemoteCatalog for Arc<T> {
  async fn list_songs(&self) -> Result<Vec<Song>, RemoteError> {
    (**self).list_songs().await
  }

  async fn create_song(&self, fields: &SongFields) -> Result<Song, RemoteError> {
    (**self).create_song(fields).await
  }

  async fn update_song(&self, id: SongId, fields: &SongFields) -> Result<(), RemoteError> {
    (**self).update_song(id, fields).await
  }

  async fn delete_song(&self, id: SongId) -> Result<(), RemoteError> {
    (**self).delete_song(id).await
  }

  async fn list_setlists(&self) -> Result<Vec<Setlist>, RemoteError> {
    (**self).list_setlists().await
  }

  async fn create_setlist(&self, fields: &SetlistFields) -> Result<Setlist, RemoteError> {
    (**self).create_setlist(fields).await
  }

  async fn update_setlist(&self, id: SetlistId, fields: &SetlistFields) -> Result<(), RemoteError> {
    (**self).update_setlist(id, fields).await
  }

  async fn delete_setlist(&self, id: SetlistId) -> Result<(), RemoteError> {
    (**self).delete_setlist(id).await
  }
}
