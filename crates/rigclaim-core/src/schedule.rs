//! Cancellable single-shot timers.

use std::time::Duration;

use tokio::task::JoinHandle;

/// A closure scheduled to run once after a delay on the tokio runtime.
///
/// Dropping the value cancels the completion if it has not fired yet, so a
/// timer owned by a view can never outlive that view.
#[derive(Debug)]
pub struct ScheduledCompletion {
  handle: JoinHandle<()>,
}

impl ScheduledCompletion {
  /// Must be called from within a tokio runtime.
  pub fn schedule<F>(delay: Duration, complete: F) -> Self
  where
    F: FnOnce() + Send + 'static,
  {
    let handle = tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      complete();
    });
    Self { handle }
  }

  pub fn cancel(&self) { self.handle.abort(); }

  pub fn is_finished(&self) -> bool { self.handle.is_finished() }
}

impl Drop for ScheduledCompletion {
  fn drop(&mut self) { self.handle.abort(); }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  };

  use super::*;

  fn flag() -> Arc<AtomicBool> { Arc::new(AtomicBool::new(false)) }

  #[tokio::test(start_paused = true)]
  async fn fires_after_delay() {
    let fired = flag();
    let f = fired.clone();
    let timer = ScheduledCompletion::schedule(Duration::from_millis(1500), move || {
      f.store(true, Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert!(!fired.load(Ordering::SeqCst));

    tokio::time::sleep(Duration::from_millis(600)).await;
    tokio::task::yield_now().await;
    assert!(fired.load(Ordering::SeqCst));
    assert!(timer.is_finished());
  }

  #[tokio::test(start_paused = true)]
  async fn dropping_suppresses_completion() {
    let fired = flag();
    let f = fired.clone();
    let timer = ScheduledCompletion::schedule(Duration::from_millis(1500), move || {
      f.store(true, Ordering::SeqCst);
    });

    drop(timer);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(!fired.load(Ordering::SeqCst));
  }

  #[tokio::test(start_paused = true)]
  async fn cancel_suppresses_completion() {
    let fired = flag();
    let f = fired.clone();
    let timer = ScheduledCompletion::schedule(Duration::from_millis(10), move || {
      f.store(true, Ordering::SeqCst);
    });

    timer.cancel();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(!fired.load(Ordering::SeqCst));
  }
}
