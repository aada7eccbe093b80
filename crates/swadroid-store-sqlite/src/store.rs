//! [`SqliteStore`], the SQLite implementation of [`LocalStore`].

use std::{
  panic::{self, AssertUnwindSafe},
  path::Path,
};

use swadroid_core::{
  record::{Record, Relation},
  store::{InFlight, LocalStore, RecordWriter, Upserted},
  Table,
};
use tracing::{debug, warn};

use crate::{
  config::{StoreConfig, UpgradePolicy},
  ops, provision,
  schema::{SCHEMA, SCHEMA_VERSION},
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The local mirror, backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All clones
/// share one connection thread, so every call (and every transaction) is
/// serialised: a reader queued behind a transaction only sees committed rows.
/// Clones also share one [`InFlight`] registry.
#[derive(Clone)]
pub struct SqliteStore {
  conn:      tokio_rusqlite::Connection,
  in_flight: InFlight,
}

impl SqliteStore {
  /// Open the store described by `config`, provisioning it on first run.
  ///
  /// A missing database file is created by copying the configured seed; a
  /// failed copy is [`Error::SeedCopy`] and fatal. With no seed configured
  /// the schema is created in place.
  pub async fn open(config: &StoreConfig) -> Result<Self> {
    let path = &config.database_path;

    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
      match &config.seed_path {
        Some(seed) => {
          provision::copy_seed(seed, path).await?;
        }
        None => debug!(?path, "no seed configured; creating database from schema"),
      }
    }

    let store = Self::connect(path).await?;
    store.check_version(config).await
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, in_flight: InFlight::default() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Write a fresh seed database to `path`.
  pub async fn create_seed(path: impl AsRef<Path>) -> Result<()> {
    let store = Self::connect(path.as_ref()).await?;
    store.init_schema().await?;
    store.conn.close().await?;
    Ok(())
  }

  async fn connect(path: &Path) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Ok(Self { conn, in_flight: InFlight::default() })
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// The `PRAGMA user_version` of the open database.
  pub async fn schema_version(&self) -> Result<i64> {
    self.with_conn(|conn| ops::user_version(conn)).await
  }

  async fn check_version(self, config: &StoreConfig) -> Result<Self> {
    let found = self.schema_version().await?;

    match plan_open(found, SCHEMA_VERSION, config.upgrade_policy) {
      OpenPlan::Ready => Ok(self),
      OpenPlan::Initialise => {
        self.init_schema().await?;
        Ok(self)
      }
      OpenPlan::Reject => Err(Error::SchemaVersion { found, expected: SCHEMA_VERSION }),
      OpenPlan::Reset => {
        warn!(
          found,
          expected = SCHEMA_VERSION,
          path = ?config.database_path,
          "schema is out of date; discarding local data"
        );
        self.reset(config).await
      }
    }
  }

  pub(crate) async fn reset(self, config: &StoreConfig) -> Result<Self> {
    match &config.seed_path {
      Some(seed) => {
        self.conn.close().await?;
        provision::copy_seed(seed, &config.database_path).await?;
        let store = Self::connect(&config.database_path).await?;
        let now = store.schema_version().await?;
        if now != SCHEMA_VERSION {
          return Err(Error::SchemaVersion { found: now, expected: SCHEMA_VERSION });
        }
        Ok(store)
      }
      None => {
        self.with_conn(|conn| ops::drop_all_tables(conn)).await?;
        self.init_schema().await?;
        Ok(self)
      }
    }
  }

  /// Run `f` on the connection thread.
  async fn with_conn<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }

  #[cfg(test)]
  pub(crate) async fn conn_for_tests<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.with_conn(move |conn| Ok(f(conn)?)).await
  }
}

// ─── Opening ─────────────────────────────────────────────────────────────────

/// What to do with a database whose `user_version` is `found`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpenPlan {
  /// Schema is current.
  Ready,
  /// Blank file; create the schema in place.
  Initialise,
  /// Older schema under [`UpgradePolicy::Reseed`].
  Reset,
  Reject,
}

pub(crate) fn plan_open(found: i64, expected: i64, policy: UpgradePolicy) -> OpenPlan {
  match found {
    0 => OpenPlan::Initialise,
    v if v == expected => OpenPlan::Ready,
    v if v > expected => OpenPlan::Reject,
    _ => match policy {
      UpgradePolicy::Reseed => OpenPlan::Reset,
      UpgradePolicy::Refuse => OpenPlan::Reject,
    },
  }
}

// ─── Transaction writer ──────────────────────────────────────────────────────

struct TxWriter<'a> {
  conn: &'a rusqlite::Connection,
}

impl RecordWriter for TxWriter<'_> {
  type Error = Error;

  fn insert(&mut self, record: &Record) -> Result<()> { ops::insert(self.conn, record) }

  fn upsert(&mut self, record: &Record) -> Result<Upserted> { ops::upsert(self.conn, record) }

  fn insert_relation(&mut self, relation: &Relation) -> Result<bool> {
    ops::insert_relation(self.conn, relation)
  }

  fn trim_to_retention_limit(&mut self, table: Table, limit: usize) -> Result<usize> {
    ops::trim_to_retention_limit(self.conn, table, limit)
  }

  fn empty_table(&mut self, table: Table) -> Result<usize> { ops::empty_table(self.conn, table) }
}

// ─── LocalStore impl ─────────────────────────────────────────────────────────

impl LocalStore for SqliteStore {
  type Error = Error;

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn read_all(&self, table: Table) -> Result<Vec<Record>> {
    self.with_conn(move |conn| ops::read_all(conn, table)).await
  }

  async fn read_ordered(&self, table: Table, newest_first: bool) -> Result<Vec<Record>> {
    self
      .with_conn(move |conn| ops::read_ordered(conn, table, newest_first))
      .await
  }

  async fn get(&self, table: Table, id: i64) -> Result<Option<Record>> {
    self.with_conn(move |conn| ops::get(conn, table, id)).await
  }

  async fn count(&self, table: Table) -> Result<usize> {
    self.with_conn(move |conn| ops::count(conn, table)).await
  }

  async fn last_ordering_value(&self, table: Table) -> Result<Option<i64>> {
    self
      .with_conn(move |conn| ops::last_ordering_value(conn, table))
      .await
  }

  // ── Single writes ─────────────────────────────────────────────────────────

  async fn insert(&self, record: Record) -> Result<()> {
    self.with_conn(move |conn| ops::insert(conn, &record)).await
  }

  async fn upsert(&self, record: Record) -> Result<Upserted> {
    self.with_conn(move |conn| ops::upsert(conn, &record)).await
  }

  async fn insert_relation(&self, relation: Relation) -> Result<bool> {
    self
      .with_conn(move |conn| ops::insert_relation(conn, &relation))
      .await
  }

  async fn trim_to_retention_limit(&self, table: Table, limit: usize) -> Result<usize> {
    self
      .with_conn(move |conn| ops::trim_to_retention_limit(conn, table, limit))
      .await
  }

  async fn empty_table(&self, table: Table) -> Result<usize> {
    self.with_conn(move |conn| ops::empty_table(conn, table)).await
  }

  async fn mark_notification_seen(&self, id: i64) -> Result<bool> {
    self
      .with_conn(move |conn| ops::mark_notification_seen(conn, id))
      .await
  }

  // ── Transactions ──────────────────────────────────────────────────────────

  async fn transaction<F, T>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut dyn RecordWriter<Error = Self::Error>) -> Result<T, Self::Error>
      + Send
      + 'static,
    T: Send + 'static,
  {
    let outcome = self
      .with_conn(move |conn| {
        let tx = conn.transaction()?;
        // A panic must not unwind through the connection thread.
        let body = panic::catch_unwind(AssertUnwindSafe(|| f(&mut TxWriter { conn: &tx })));
        match body {
          Ok(Ok(out)) => {
            tx.commit()?;
            debug!("transaction committed");
            Ok(Ok(out))
          }
          // Dropping `tx` without commit rolls back.
          Ok(Err(e)) => Err(e),
          Err(payload) => {
            drop(tx);
            warn!("transaction body panicked; rolled back");
            Ok(Err(payload))
          }
        }
      })
      .await?;

    // Re-raise on the caller's task; the store itself stays usable.
    Ok(outcome.unwrap_or_else(|payload| panic::resume_unwind(payload)))
  }

  fn in_flight(&self) -> &InFlight { &self.in_flight }
}
