//! Error types for `swadroid-downloads`.

use thiserror::Error;

/// The tree document could not be turned into a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
  #[error("XML error: {0}")]
  Xml(String),

  #[error("malformed tree: {0}")]
  Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavError {
  /// Out of range, or the entry is a file.
  #[error("no folder at index {index} ({len} entries)")]
  InvalidIndex { index: usize, len: usize },

  #[error("already at the root folder")]
  AtRoot,
}
