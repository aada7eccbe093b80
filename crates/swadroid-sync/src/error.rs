//! Error type for `swadroid-sync`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
  /// The remote call failed; nothing was written.
  #[error("remote fetch failed: {0}")]
  Remote(String),

  /// A fetched record could not be converted; nothing was written.
  #[error("malformed notification #{index}: field {field}: {reason}")]
  Malformed {
    index:  usize,
    field:  &'static str,
    reason: String,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("a sync of this table is already running")]
  AlreadyRunning,

  /// Cancelled before commit; nothing was written.
  #[error("sync cancelled")]
  Cancelled,
}

impl SyncError {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
