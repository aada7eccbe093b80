//! Store configuration, deserialised from the `[store]` settings section.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// What to do when the on-disk schema is older than [`SCHEMA_VERSION`].
///
/// [`SCHEMA_VERSION`]: crate::SCHEMA_VERSION
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradePolicy {
  /// Replace the database with the seed (or a fresh schema). Local data,
  /// including device-only flags, is lost.
  #[default]
  Reseed,
  /// Fail with [`Error::SchemaVersion`](crate::Error::SchemaVersion) and leave
  /// the file untouched.
  Refuse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
  pub database_path:  PathBuf,
  /// Seed database copied into place on first run.
  pub seed_path:      Option<PathBuf>,
  pub upgrade_policy: UpgradePolicy,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      database_path:  PathBuf::from("swadroid.db"),
      seed_path:      None,
      upgrade_policy: UpgradePolicy::default(),
    }
  }
}

impl StoreConfig {
  pub fn new(database_path: impl Into<PathBuf>) -> Self {
    Self { database_path: database_path.into(), ..Self::default() }
  }

  pub fn with_seed(mut self, seed_path: impl Into<PathBuf>) -> Self {
    self.seed_path = Some(seed_path.into());
    self
  }

  pub fn with_upgrade_policy(mut self, policy: UpgradePolicy) -> Self {
    self.upgrade_policy = policy;
    self
  }

  /// Load the `[store]` section from `path` and `SWAD_STORE__*` variables.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    Ok(swadroid_core::config::load_section(path, "store")?)
  }
}
