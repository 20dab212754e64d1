pub mod remote_catalog;

pub use remote_catalog::{RemoteCatalog, RemoteError};
