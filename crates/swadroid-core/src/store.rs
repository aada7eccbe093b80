//! The `LocalStore` trait and its transactional writer.
//!
//! The trait is implemented by storage backends (e.g.
//! `swadroid-store-sqlite`). The sync driver depends on this abstraction, not
//! on any concrete backend.

use std::{
  collections::HashSet,
  future::Future,
  sync::{Arc, Mutex, PoisonError},
};

use crate::{
  record::{Record, Relation},
  table::Table,
};

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
  Inserted,
  Updated,
}

/// Write operations available inside a transaction.
///
/// A writer is only ever handed out by [`LocalStore::transaction`] and has no
/// path back to the store, so transactions cannot nest.
pub trait RecordWriter {
  type Error;

  /// Insert one record. A duplicate key is an error.
  fn insert(&mut self, record: &Record) -> Result<(), Self::Error>;

  /// Insert or update one record keyed by its id. Device-local columns of an
  /// existing row are left untouched.
  fn upsert(&mut self, record: &Record) -> Result<Upserted, Self::Error>;

  /// Insert a join-table edge. Returns `false` if the edge already existed.
  fn insert_relation(&mut self, relation: &Relation) -> Result<bool, Self::Error>;

  /// Delete the oldest rows (by the table's ordering column) so that at most
  /// `limit` remain. Returns the number of rows evicted.
  fn trim_to_retention_limit(
    &mut self,
    table: Table,
    limit: usize,
  ) -> Result<usize, Self::Error>;

  /// Delete every row. Returns the number of rows deleted.
  fn empty_table(&mut self, table: Table) -> Result<usize, Self::Error>;
}

/// Abstraction over the on-device mirror.
///
/// Every read returns independent copies; nothing returned refers back to
/// storage. All methods return `Send` futures so the trait can be used from a
/// multi-threaded runtime.
pub trait LocalStore: Send + Sync {
  type Error: std::error::Error + From<crate::Error> + Send + Sync + 'static;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Every row of `table`, in storage order.
  fn read_all(
    &self,
    table: Table,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_;

  /// Every row of `table` ordered by its ordering column.
  fn read_ordered(
    &self,
    table: Table,
    newest_first: bool,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_;

  /// A single record by id. Returns `None` if not found.
  fn get(
    &self,
    table: Table,
    id: i64,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + '_;

  fn count(
    &self,
    table: Table,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// The largest value of the table's ordering column, `None` when empty.
  fn last_ordering_value(
    &self,
    table: Table,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + '_;

  /// The "since" cursor for an incremental fetch: last ordering value + 1, or
  /// 0 for an empty table. Saturates at `i64::MAX`.
  fn watermark(
    &self,
    table: Table,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_ {
    async move {
      Ok(self.last_ordering_value(table).await?.map_or(0, |v| v.saturating_add(1)))
    }
  }

  // ── Single writes ─────────────────────────────────────────────────────

  fn insert(
    &self,
    record: Record,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn upsert(
    &self,
    record: Record,
  ) -> impl Future<Output = Result<Upserted, Self::Error>> + Send + '_;

  fn insert_relation(
    &self,
    relation: Relation,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn trim_to_retention_limit(
    &self,
    table: Table,
    limit: usize,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn empty_table(
    &self,
    table: Table,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Mark a notification as read on this device. Returns `false` if there is
  /// no such notification.
  fn mark_notification_seen(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Transactions ──────────────────────────────────────────────────────

  /// Run `f` inside one transaction. `Ok` commits; `Err` (or a panic) rolls
  /// back every write made through the writer. A panic is resumed on the
  /// caller's task and leaves the store usable.
  ///
  /// To abandon a transaction without a backend error, return
  /// `Err(crate::Error::Cancelled.into())`.
  fn transaction<F, T>(
    &self,
    f: F,
  ) -> impl Future<Output = Result<T, Self::Error>> + Send + '_
  where
    F: FnOnce(&mut dyn RecordWriter<Error = Self::Error>) -> Result<T, Self::Error>
      + Send
      + 'static,
    T: Send + 'static;

  // ── Coordination ──────────────────────────────────────────────────────

  /// Tables with a sync in progress. Every handle to the same store returns
  /// the same registry.
  fn in_flight(&self) -> &InFlight;
}

// ─── In-flight registry ──────────────────────────────────────────────────────

/// The set of tables currently being synchronised. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Arc<Mutex<HashSet<Table>>>);

impl InFlight {
  /// Claim `table`. `None` if it is already claimed.
  pub fn acquire(&self, table: Table) -> Option<InFlightGuard> {
    let mut running = self.0.lock().unwrap_or_else(PoisonError::into_inner);
    running.insert(table).then(|| InFlightGuard { registry: self.0.clone(), table })
  }

  pub fn is_running(&self, table: Table) -> bool {
    self.0.lock().unwrap_or_else(PoisonError::into_inner).contains(&table)
  }
}

/// Releases its table when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
  registry: Arc<Mutex<HashSet<Table>>>,
  table:    Table,
}

impl Drop for InFlightGuard {
  fn drop(&mut self) {
    self
      .registry
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .remove(&self.table);
  }
}
