mod backend;
pub mod io;
mod paths;

pub use backend::{ConfigBackend, TomlConfigBackend};
pub use paths::{BASE_DIR_ENV, ConfigError, VoxjamPaths};

use once_cell::sync::Lazy;

// Process-wide paths (portable or system)
pub static PATHS: Lazy<VoxjamPaths> = Lazy::new(|| VoxjamPaths::detect().expect("failed to init VoxjamPaths"));

// Process-wide config backend
pub static CONFIG_BACKEND: Lazy<TomlConfigBackend> = Lazy::new(|| TomlConfigBackend::new(PATHS.clone()));
