//! Synchronous statements run on the connection thread.
//!
//! Shared by the single-call methods of [`SqliteStore`](crate::SqliteStore)
//! and by the transaction writer. Identifiers are interpolated only from
//! static layouts; every value is a bound parameter.

use rusqlite::{Connection, OptionalExtension as _, params_from_iter};
use swadroid_core::{
  codec::YesNo,
  layout::TableLayout,
  mapper::map_row,
  record::{Record, Relation},
  store::Upserted,
  Table,
};
use tracing::debug;

use crate::{
  encode::{encode_value, SqlRow},
  Error, Result,
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn select_list(layout: &TableLayout) -> String {
  layout.column_names().collect::<Vec<_>>().join(", ")
}

fn placeholders(n: usize) -> String {
  (1..=n).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ")
}

fn ordering_column(table: Table) -> Result<&'static str> {
  table.layout().ordering.ok_or(Error::NoOrderingColumn(table))
}

fn require_record_table(table: Table) -> Result<()> {
  if table.is_relation() {
    return Err(swadroid_core::Error::NotARecordTable(table).into());
  }
  Ok(())
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _) if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

fn describe_key(record: &Record) -> String {
  match record {
    Record::Relation(r) => format!("({}, {})", r.first, r.second),
    other => other.id().map(|id| format!("id={id}")).unwrap_or_default(),
  }
}

fn query_records<P: rusqlite::Params>(
  conn: &Connection,
  table: Table,
  sql: &str,
  params: P,
) -> Result<Vec<Record>> {
  let mut stmt = conn.prepare(sql)?;
  let mut rows = stmt.query(params)?;
  let mut out = Vec::new();
  while let Some(row) = rows.next()? {
    out.push(map_row(table, &SqlRow(row))?);
  }
  Ok(out)
}

// ─── Reads ───────────────────────────────────────────────────────────────────

pub fn read_all(conn: &Connection, table: Table) -> Result<Vec<Record>> {
  let sql = format!(
    "SELECT {} FROM {} ORDER BY rowid",
    select_list(table.layout()),
    table.name()
  );
  query_records(conn, table, &sql, [])
}

pub fn read_ordered(conn: &Connection, table: Table, newest_first: bool) -> Result<Vec<Record>> {
  let ordering = ordering_column(table)?;
  let direction = if newest_first { "DESC" } else { "ASC" };
  let sql = format!(
    "SELECT {} FROM {} ORDER BY {ordering} {direction}, rowid {direction}",
    select_list(table.layout()),
    table.name()
  );
  query_records(conn, table, &sql, [])
}

pub fn get(conn: &Connection, table: Table, id: i64) -> Result<Option<Record>> {
  require_record_table(table)?;
  let sql = format!(
    "SELECT {} FROM {} WHERE id = ?1",
    select_list(table.layout()),
    table.name()
  );
  Ok(query_records(conn, table, &sql, [id])?.into_iter().next())
}

pub fn count(conn: &Connection, table: Table) -> Result<usize> {
  let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table.name()), [], |r| {
    r.get(0)
  })?;
  Ok(usize::try_from(n).unwrap_or_default())
}

pub fn last_ordering_value(conn: &Connection, table: Table) -> Result<Option<i64>> {
  let ordering = ordering_column(table)?;
  let max: Option<i64> = conn.query_row(
    &format!("SELECT MAX({ordering}) FROM {}", table.name()),
    [],
    |r| r.get(0),
  )?;
  Ok(max)
}

// ─── Writes ──────────────────────────────────────────────────────────────────

fn insert_sql(layout: &TableLayout) -> String {
  format!(
    "INSERT INTO {} ({}) VALUES ({})",
    layout.table.name(),
    select_list(layout),
    placeholders(layout.columns.len())
  )
}

pub fn insert(conn: &Connection, record: &Record) -> Result<()> {
  let table = record.table();
  let sql = insert_sql(table.layout());
  let values = record.to_values();

  match conn.execute(&sql, params_from_iter(values.iter().map(encode_value))) {
    Ok(_) => Ok(()),
    Err(e) if is_constraint_violation(&e) => Err(Error::Conflict {
      table,
      key: describe_key(record),
    }),
    Err(e) => Err(e.into()),
  }
}

pub fn upsert(conn: &Connection, record: &Record) -> Result<Upserted> {
  if let Record::Relation(relation) = record {
    return Ok(if insert_relation(conn, relation)? {
      Upserted::Inserted
    } else {
      Upserted::Updated
    });
  }

  let table = record.table();
  let layout = table.layout();
  let id = record.id().ok_or(swadroid_core::Error::NotARecordTable(table))?;

  let exists = conn
    .query_row(
      &format!("SELECT 1 FROM {} WHERE id = ?1", table.name()),
      [id],
      |_| Ok(()),
    )
    .optional()?
    .is_some();

  let updates: Vec<String> = layout
    .column_names()
    .filter(|c| !layout.key.contains(c) && !layout.local.contains(c))
    .map(|c| format!("{c} = excluded.{c}"))
    .collect();

  let conflict = if updates.is_empty() {
    "DO NOTHING".to_owned()
  } else {
    format!("DO UPDATE SET {}", updates.join(", "))
  };

  let sql = format!("{} ON CONFLICT(id) {conflict}", insert_sql(layout));
  let values = record.to_values();
  conn.execute(&sql, params_from_iter(values.iter().map(encode_value)))?;

  Ok(if exists { Upserted::Updated } else { Upserted::Inserted })
}

pub fn insert_relation(conn: &Connection, relation: &Relation) -> Result<bool> {
  let table = relation.kind.table();
  let (first, second) = relation.kind.columns();
  let changed = conn.execute(
    &format!("INSERT OR IGNORE INTO {} ({first}, {second}) VALUES (?1, ?2)", table.name()),
    [relation.first, relation.second],
  )?;
  Ok(changed == 1)
}

pub fn trim_to_retention_limit(conn: &Connection, table: Table, limit: usize) -> Result<usize> {
  let ordering = ordering_column(table)?;
  let name = table.name();
  let limit = i64::try_from(limit).unwrap_or(i64::MAX);
  let evicted = conn.execute(
    &format!(
      "DELETE FROM {name} WHERE rowid NOT IN (
         SELECT rowid FROM {name} ORDER BY {ordering} DESC, rowid DESC LIMIT ?1
       )"
    ),
    [limit],
  )?;
  if evicted > 0 {
    debug!(%table, evicted, "trimmed to retention limit");
  }
  Ok(evicted)
}

pub fn empty_table(conn: &Connection, table: Table) -> Result<usize> {
  let deleted = conn.execute(&format!("DELETE FROM {}", table.name()), [])?;
  debug!(%table, deleted, "emptied table");
  Ok(deleted)
}

pub fn mark_notification_seen(conn: &Connection, id: i64) -> Result<bool> {
  let changed = conn.execute(
    "UPDATE notifications SET seen_local = ?1 WHERE id = ?2",
    rusqlite::params![YesNo::encode(true), id],
  )?;
  Ok(changed == 1)
}

// ─── Schema version ──────────────────────────────────────────────────────────

pub fn user_version(conn: &Connection) -> Result<i64> {
  Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?)
}

/// Drop every mirrored table so the schema can be rebuilt from scratch.
pub fn drop_all_tables(conn: &Connection) -> Result<()> {
  let names: Vec<String> = {
    let mut stmt = conn.prepare(
      "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let rows = stmt.query_map([], |r| r.get(0))?;
    rows.collect::<rusqlite::Result<_>>()?
  };
  for name in names {
    // Names come from sqlite_master, not from callers.
    conn.execute_batch(&format!("DROP TABLE IF EXISTS \"{}\"", name.replace('"', "\"\"")))?;
  }
  Ok(())
}
