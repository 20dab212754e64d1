pub mod domain;
pub mod errors;
pub mod ports;
pub mod projection;
pub mod services;

pub use errors::CatalogError;
pub use projection::{CatalogSnapshot, SortKey, StatusFilter};
pub use services::CatalogStore;
