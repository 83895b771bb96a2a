//! Trailing-edge debounce on the tokio timer.

use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;

/// Quiet period before a search box issues its lookup.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(250);

/// Runs the most recently scheduled action once `delay` has passed without
/// another `schedule`. Rescheduling or cancelling aborts the pending timer,
/// so a superseded action never runs at all.
///
/// Scheduled actions should be quick hand-offs (e.g. posting a message to
/// the owner). Anything long-running belongs in its own task, because a
/// later `schedule` would abort it mid-flight.
#[derive(Debug)]
pub struct Debouncer {
  delay:   Duration,
  pending: Option<JoinHandle<()>>,
}

impl Debouncer {
  pub fn new(delay: Duration) -> Self { Self { delay, pending: None } }

  pub fn delay(&self) -> Duration { self.delay }

  pub fn schedule<F>(&mut self, action: F)
  where
    F: Future<Output = ()> + Send + 'static,
  {
    self.cancel();
    let delay = self.delay;
    self.pending = Some(tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      action.await;
    }));
  }

  pub fn cancel(&mut self) {
    if let Some(handle) = self.pending.take() {
      handle.abort();
    }
  }

  /// `true` while a scheduled action has not yet run.
  pub fn is_pending(&self) -> bool {
    self.pending.as_ref().is_some_and(|h| !h.is_finished())
  }
}

impl Drop for Debouncer {
  fn drop(&mut self) { self.cancel(); }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  };

  use super::*;

  fn bump(hits: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
    let hits = hits.clone();
    async move {
      hits.fetch_add(1, Ordering::SeqCst);
    }
  }

  #[tokio::test(start_paused = true)]
  async fn fires_once_after_quiet_period() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut debounce = Debouncer::new(Duration::from_millis(250));

    debounce.schedule(bump(&hits));
    tokio::time::sleep(Duration::from_millis(249)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(!debounce.is_pending());
  }

  #[tokio::test(start_paused = true)]
  async fn rescheduling_restarts_the_timer_and_drops_the_old_action() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut debounce = Debouncer::new(Duration::from_millis(250));

    debounce.schedule(bump(&hits));
    tokio::time::sleep(Duration::from_millis(200)).await;
    debounce.schedule(bump(&hits));
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn cancel_prevents_the_action() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut debounce = Debouncer::new(Duration::from_millis(250));

    debounce.schedule(bump(&hits));
    debounce.cancel();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);
  }
}
