pub mod identity;
pub mod ids;
pub mod setlist;
pub mod song;
pub mod status;

pub use identity::Identity;
pub use ids::{SetlistId, SongId};
pub use setlist::{Setlist, SetlistFields};
pub use song::{Song, SongFields};
pub use status::SongStatus;
