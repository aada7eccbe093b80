//! Error types for `swadroid-core`.

use thiserror::Error;

use crate::table::Table;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown table: {0:?}")]
  UnknownTable(String),

  #[error("table {0} is a relation table, not a record table")]
  NotARecordTable(Table),

  #[error("table {0} is not a relation table")]
  NotARelationTable(Table),

  #[error("invalid encoding in {table}.{column}: {value}")]
  InvalidEncoding {
    table:  Table,
    column: &'static str,
    value:  String,
  },

  #[error("missing column {table}.{column}")]
  MissingColumn { table: Table, column: &'static str },

  #[error("type mismatch in {table}.{column}: expected {expected}, found {found}")]
  TypeMismatch {
    table:    Table,
    column:   &'static str,
    expected: &'static str,
    found:    &'static str,
  },

  #[error("row access failed: {0}")]
  Row(String),

  /// A transaction was abandoned before commit at the caller's request.
  #[error("cancelled before commit")]
  Cancelled,

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
