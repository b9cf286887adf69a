//! Cancelable deferred action for the end-of-session summary.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs at most one pending action after a delay.
///
/// Scheduling again replaces the pending action. Cancelling, or dropping the
/// timer, guarantees the action never runs.
#[derive(Default)]
pub struct SummaryTimer {
    pending: Mutex<Option<CancellationToken>>,
}

impl SummaryTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<F, Fut>(&self, delay: Duration, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }

        tracing::debug!(delay_ms = delay.as_millis() as u64, "[Summary] Scheduled");
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!("[Summary] Cancelled before firing");
                }
                _ = tokio::time::sleep(delay) => {
                    // cancellation may have raced the sleep
                    if !token.is_cancelled() {
                        action().await;
                    }
                }
            }
        });
    }

    pub fn cancel(&self) {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(token) = pending {
            token.cancel();
        }
    }
}

impl Drop for SummaryTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter_action(count: &Arc<AtomicUsize>) -> impl FnOnce() -> std::future::Ready<()> + Send + 'static {
        let count = count.clone();
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let count = Arc::new(AtomicUsize::new(0));
        let timer = SummaryTimer::new();
        timer.schedule(Duration::from_millis(2800), counter_action(&count));

        tokio::time::sleep(Duration::from_millis(2799)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_drop_prevent_firing() {
        let count = Arc::new(AtomicUsize::new(0));
        let timer = SummaryTimer::new();
        timer.schedule(Duration::from_millis(100), counter_action(&count));
        timer.cancel();

        let dropped = SummaryTimer::new();
        dropped.schedule(Duration::from_millis(100), counter_action(&count));
        drop(dropped);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending() {
        let count = Arc::new(AtomicUsize::new(0));
        let timer = SummaryTimer::new();
        timer.schedule(Duration::from_millis(100), counter_action(&count));
        timer.schedule(Duration::from_millis(500), counter_action(&count));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
