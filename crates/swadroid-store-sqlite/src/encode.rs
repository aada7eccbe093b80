//! Conversions between `swadroid_core::Value` and SQLite values.

use rusqlite::types::{Value as SqlValue, ValueRef};
use swadroid_core::{mapper::ColumnSource, Table, Value};

/// A result row addressed by column name, for the core row mapper.
pub struct SqlRow<'a, 'stmt>(pub &'a rusqlite::Row<'stmt>);

impl ColumnSource for SqlRow<'_, '_> {
  fn value(&self, table: Table, column: &'static str) -> swadroid_core::Result<Value> {
    match self.0.get_ref(column) {
      Ok(v) => decode_value(table, column, v),
      Err(rusqlite::Error::InvalidColumnName(_)) => {
        Err(swadroid_core::Error::MissingColumn { table, column })
      }
      Err(e) => Err(swadroid_core::Error::Row(e.to_string())),
    }
  }
}

pub fn decode_value(
  table: Table,
  column: &'static str,
  v: ValueRef<'_>,
) -> swadroid_core::Result<Value> {
  match v {
    ValueRef::Null => Ok(Value::Null),
    ValueRef::Integer(i) => Ok(Value::Integer(i)),
    ValueRef::Real(f) => Ok(Value::Real(f)),
    ValueRef::Text(bytes) => std::str::from_utf8(bytes)
      .map(|s| Value::Text(s.to_owned()))
      .map_err(|e| swadroid_core::Error::InvalidEncoding {
        table,
        column,
        value: e.to_string(),
      }),
    ValueRef::Blob(_) => Err(swadroid_core::Error::TypeMismatch {
      table,
      column,
      expected: "scalar",
      found: "blob",
    }),
  }
}

pub fn encode_value(v: &Value) -> SqlValue {
  match v {
    Value::Null => SqlValue::Null,
    Value::Integer(i) => SqlValue::Integer(*i),
    Value::Real(f) => SqlValue::Real(*f),
    Value::Text(s) => SqlValue::Text(s.clone()),
  }
}
