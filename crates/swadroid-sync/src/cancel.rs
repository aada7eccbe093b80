//! Cooperative cancellation for sync runs.

use std::sync::Arc;

use tokio::sync::watch;

/// A cloneable cancellation flag. Every clone observes the same state; once
/// cancelled it stays cancelled.
#[derive(Debug, Clone)]
pub struct CancelToken {
  tx: Arc<watch::Sender<bool>>,
  rx: watch::Receiver<bool>,
}

impl Default for CancelToken {
  fn default() -> Self { Self::new() }
}

impl CancelToken {
  pub fn new() -> Self {
    let (tx, rx) = watch::channel(false);
    Self { tx: Arc::new(tx), rx }
  }

  pub fn cancel(&self) { self.tx.send_replace(true); }

  pub fn is_cancelled(&self) -> bool { *self.rx.borrow() }

  /// Resolves once the token is cancelled.
  pub async fn cancelled(&self) {
    let mut rx = self.rx.clone();
    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
      // Unreachable while `self` holds the sender.
      std::future::pending::<()>().await;
    }
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;

  #[tokio::test]
  async fn clones_share_state() {
    let token = CancelToken::new();
    let other = token.clone();
    assert!(!other.is_cancelled());

    token.cancel();
    assert!(other.is_cancelled());
    tokio::time::timeout(Duration::from_secs(1), other.cancelled())
      .await
      .expect("cancelled() resolves");
  }

  #[tokio::test]
  async fn cancelled_waits_until_cancel() {
    let token = CancelToken::new();
    let waiter = tokio::spawn({
      let token = token.clone();
      async move { token.cancelled().await }
    });

    tokio::task::yield_now().await;
    assert!(!waiter.is_finished());
    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), waiter)
      .await
      .expect("waiter wakes")
      .unwrap();
  }
}
