//! Error type for `swadroid-store-sqlite`.

use std::path::PathBuf;

use swadroid_core::Table;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] swadroid_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  /// The bundled seed database could not be copied into place. The store is
  /// unusable without it; this is not retryable.
  #[error("failed to copy seed database from {seed:?}: {source}")]
  SeedCopy {
    seed:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("database schema version {found} is not supported (expected {expected})")]
  SchemaVersion { found: i64, expected: i64 },

  #[error("{table}: a row with key {key} already exists")]
  Conflict { table: Table, key: String },

  #[error("{0} has no ordering column")]
  NoOrderingColumn(Table),
}

impl Error {
  /// Whether this error is the cancellation marker returned from a
  /// transaction body.
  pub fn is_cancelled(&self) -> bool {
    matches!(self, Self::Core(swadroid_core::Error::Cancelled))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
