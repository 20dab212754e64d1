use serde::{Deserialize, Serialize};
use voxjam_config::{CONFIG_BACKEND, ConfigBackend, ConfigError, TomlConfigBackend};
use voxjam_core::{SortKey, StatusFilter};

/// `[logging]` section: an `EnvFilter` directive, overridden by `RUST_LOG`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
  pub filter: String,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    LoggingConfig { filter: "info".to_string() }
  }
}

impl LoggingConfig {
  pub fn load() -> Result<Self, ConfigError> {
    Self::load_from(&CONFIG_BACKEND)
  }

  pub fn load_from(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    let cfg = backend.load_section_with_default("logging")?;
    backend.save_section("logging", &cfg)?;
    Ok(cfg)
  }

  pub fn save(&self) -> Result<(), ConfigError> {
    CONFIG_BACKEND.save_section("logging", self)
  }
}

/// `[view]` section: the song list ordering and filter the UI starts with.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ViewConfig {
  pub sort: SortKey,
  pub filter: StatusFilter,
}

impl ViewConfig {
  pub fn load() -> Result<Self, ConfigError> {
    Self::load_from(&CONFIG_BACKEND)
  }

  pub fn load_from(backend: &TomlConfigBackend) -> Result<Self, ConfigError> {
    let cfg = backend.load_section_with_default("view")?;
    backend.save_section("view", &cfg)?;
    Ok(cfg)
  }

  pub fn save(&self) -> Result<(), ConfigError> {
    CONFIG_BACKEND.save_section("view", self)
  }
}
