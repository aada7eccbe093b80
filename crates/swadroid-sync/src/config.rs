//! Sync settings and the aggregated application settings.

use std::path::Path;

use serde::{Deserialize, Serialize};
use swadroid_store_sqlite::StoreConfig;

/// Notifications kept after each sync when nothing else is configured.
pub const DEFAULT_RETENTION_LIMIT: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
  /// Maximum rows kept in the notifications table.
  pub retention_limit: usize,
}

impl Default for SyncConfig {
  fn default() -> Self { Self { retention_limit: DEFAULT_RETENTION_LIMIT } }
}

impl SyncConfig {
  /// Load the `[sync]` section, e.g. `SWAD_SYNC__RETENTION_LIMIT=50`.
  pub fn load(path: Option<&Path>) -> swadroid_core::Result<Self> {
    swadroid_core::config::load_section(path, "sync")
  }
}

/// Everything the embedding application configures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub store: StoreConfig,
  pub sync:  SyncConfig,
}

impl Settings {
  pub fn load(path: Option<&Path>) -> swadroid_core::Result<Self> {
    Ok(Self {
      store: swadroid_core::config::load_section(path, "store")?,
      sync:  SyncConfig::load(path)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn retention_defaults_to_25() {
    assert_eq!(SyncConfig::default().retention_limit, 25);
  }

  #[test]
  fn settings_read_both_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swadroid.toml");
    std::fs::write(
      &path,
      "[store]\nseed_path = \"/opt/swadroid/seed.db\"\n\n[sync]\nretention_limit = 40\n",
    )
    .unwrap();

    let settings = Settings::load(Some(&path)).unwrap();
    assert_eq!(settings.sync.retention_limit, 40);
    assert_eq!(
      settings.store.seed_path.as_deref(),
      Some(Path::new("/opt/swadroid/seed.db"))
    );
  }

  #[test]
  fn bad_retention_value_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swadroid.toml");
    std::fs::write(&path, "[sync]\nretention_limit = \"lots\"\n").unwrap();

    assert!(matches!(
      SyncConfig::load(Some(&path)),
      Err(swadroid_core::Error::Config(_))
    ));
  }
}
