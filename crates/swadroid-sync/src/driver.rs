//! The notification sync driver.

use std::sync::{
  Arc,
  atomic::{AtomicBool, Ordering},
};

use swadroid_core::{
  store::{LocalStore, Upserted},
  Table,
};
use tokio::sync::{mpsc, watch};
use tracing::{Instrument as _, debug, info, info_span, warn};
use uuid::Uuid;

use crate::{
  cancel::CancelToken, config::SyncConfig, convert::notification_from_properties,
  remote::NotificationSource, Result, SyncError,
};

const TABLE: Table = Table::Notifications;

// ─── Public types ────────────────────────────────────────────────────────────

/// Per-user context for remote calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncContext {
  /// Session key returned by the service's login call.
  pub ws_key: String,
}

impl SyncContext {
  pub fn new(ws_key: impl Into<String>) -> Self { Self { ws_key: ws_key.into() } }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncState {
  #[default]
  Idle,
  Fetching,
  Merging,
  Trimming,
  /// The last run failed; the next run starts from `Fetching` again.
  Failed,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
  pub fetched:  usize,
  pub inserted: usize,
  pub updated:  usize,
  pub evicted:  usize,
}

impl SyncReport {
  /// `true` when the service had nothing new.
  pub fn is_empty(&self) -> bool { self.fetched == 0 }

  /// The count to show in a "new notifications" alert, capped at `limit`.
  pub fn alert_count(&self, limit: usize) -> usize { self.fetched.min(limit) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
  Started { run_id: Uuid },
  Finished { run_id: Uuid, report: SyncReport },
  Failed { run_id: Uuid, message: String },
}

// ─── Driver ──────────────────────────────────────────────────────────────────

/// Pulls notifications from `R` into the store `S`.
///
/// Runs are claimed in the store's [`InFlight`] registry, so while one run is
/// in progress a second run over the same store fails with
/// [`SyncError::AlreadyRunning`], whichever driver or clone starts it.
///
/// [`InFlight`]: swadroid_core::store::InFlight
pub struct NotificationSync<S, R> {
  store:   Arc<S>,
  remote:  Arc<R>,
  context: SyncContext,
  config:  SyncConfig,
  state:   Arc<watch::Sender<SyncState>>,
  events:  Option<mpsc::Sender<SyncEvent>>,
}

impl<S, R> Clone for NotificationSync<S, R> {
  fn clone(&self) -> Self {
    Self {
      store:   self.store.clone(),
      remote:  self.remote.clone(),
      context: self.context.clone(),
      config:  self.config.clone(),
      state:   self.state.clone(),
      events:  self.events.clone(),
    }
  }
}

impl<S, R> NotificationSync<S, R>
where
  S: LocalStore + 'static,
  R: NotificationSource,
{
  pub fn new(store: Arc<S>, remote: Arc<R>, context: SyncContext, config: SyncConfig) -> Self {
    let (state, _) = watch::channel(SyncState::Idle);
    Self {
      store,
      remote,
      context,
      config,
      state: Arc::new(state),
      events: None,
    }
  }

  /// Send [`SyncEvent`]s to `events`. A dropped receiver is ignored.
  pub fn with_events(mut self, events: mpsc::Sender<SyncEvent>) -> Self {
    self.events = Some(events);
    self
  }

  pub fn state(&self) -> SyncState { *self.state.borrow() }

  pub fn subscribe(&self) -> watch::Receiver<SyncState> { self.state.subscribe() }

  /// Fetch everything newer than the local watermark, merge it and trim the
  /// table, all or nothing.
  pub async fn run(&self, cancel: &CancelToken) -> Result<SyncReport> {
    let _guard = self.store.in_flight().acquire(TABLE).ok_or(SyncError::AlreadyRunning)?;
    let run_id = Uuid::new_v4();

    async {
      self.emit(SyncEvent::Started { run_id }).await;
      let result = self.sync_once(cancel).await;

      match &result {
        Ok(report) => {
          self.state.send_replace(SyncState::Idle);
          info!(
            fetched = report.fetched,
            inserted = report.inserted,
            updated = report.updated,
            evicted = report.evicted,
            "notification sync finished"
          );
          self.emit(SyncEvent::Finished { run_id, report: *report }).await;
        }
        Err(e) => {
          let state = match e {
            SyncError::Cancelled => SyncState::Idle,
            _ => SyncState::Failed,
          };
          self.state.send_replace(state);
          warn!(error = %e, "notification sync did not complete");
          self.emit(SyncEvent::Failed { run_id, message: e.to_string() }).await;
        }
      }
      result
    }
    .instrument(info_span!("notification_sync", %run_id))
    .await
  }

  /// Delete every stored notification.
  pub async fn clear(&self) -> Result<usize> {
    let _guard = self.store.in_flight().acquire(TABLE).ok_or(SyncError::AlreadyRunning)?;
    let deleted = self.store.empty_table(TABLE).await.map_err(SyncError::store)?;
    info!(deleted, "cleared notifications");
    Ok(deleted)
  }

  async fn sync_once(&self, cancel: &CancelToken) -> Result<SyncReport> {
    self.state.send_replace(SyncState::Fetching);
    let since = self.store.watermark(TABLE).await.map_err(SyncError::store)?;

    let fetched = tokio::select! {
      biased;
      _ = cancel.cancelled() => return Err(SyncError::Cancelled),
      res = self.remote.fetch_notifications(&self.context.ws_key, since) => {
        res.map_err(|e| SyncError::Remote(e.to_string()))?
      }
    };
    debug!(since, count = fetched.len(), "fetched notifications");

    let notifications = fetched
      .iter()
      .enumerate()
      .map(|(index, record)| notification_from_properties(index, record))
      .collect::<Result<Vec<_>>>()?;

    self.state.send_replace(SyncState::Merging);
    let limit = self.config.retention_limit;
    let cancel = cancel.clone();
    let state = self.state.clone();
    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_in_tx = cancelled.clone();

    let outcome = self
      .store
      .transaction(move |w| {
        let mut report = SyncReport { fetched: notifications.len(), ..SyncReport::default() };
        for notification in notifications {
          if cancel.is_cancelled() {
            return abort(&cancelled_in_tx);
          }
          debug!(id = notification.id, "merging notification");
          match w.upsert(&notification.into())? {
            Upserted::Inserted => report.inserted += 1,
            Upserted::Updated => report.updated += 1,
          }
        }
        if cancel.is_cancelled() {
          return abort(&cancelled_in_tx);
        }

        state.send_replace(SyncState::Trimming);
        report.evicted = w.trim_to_retention_limit(TABLE, limit)?;
        Ok(report)
      })
      .await;

    match outcome {
      Ok(report) => Ok(report),
      Err(_) if cancelled.load(Ordering::SeqCst) => Err(SyncError::Cancelled),
      Err(e) => Err(SyncError::store(e)),
    }
  }

  async fn emit(&self, event: SyncEvent) {
    if let Some(events) = &self.events {
      if events.send(event).await.is_err() {
        debug!("sync event receiver dropped");
      }
    }
  }
}

/// Record that the transaction body gave up, and roll it back.
fn abort<T, E: From<swadroid_core::Error>>(flag: &AtomicBool) -> std::result::Result<T, E> {
  flag.store(true, Ordering::SeqCst);
  Err(swadroid_core::Error::Cancelled.into())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn alert_count_is_capped() {
    let report = SyncReport { fetched: 40, inserted: 40, ..SyncReport::default() };
    assert_eq!(report.alert_count(25), 25);
    assert_eq!(report.alert_count(50), 40);
    assert!(!report.is_empty());
    assert!(SyncReport::default().is_empty());
  }
}
