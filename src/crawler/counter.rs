//! Outstanding-task counter
//!
//! Counts URLs that are queued or being processed. The crawl is finished
//! exactly when this reaches zero, because only a worker holding a task can
//! admit new URLs.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct OutstandingCounter {
    count: AtomicUsize,
    started: AtomicU64,
    finished: AtomicU64,
    zero: Notify,
}

impl OutstandingCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one pending task
    pub fn increment(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// Removes one task, waking zero-waiters if it was the last
    ///
    /// Returns true if this call brought the count to zero. Calling it on an
    /// empty counter is a bookkeeping bug; it is logged and ignored rather than
    /// wrapping around.
    pub fn decrement(&self) -> bool {
        match self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        {
            Ok(previous) => {
                self.finished.fetch_add(1, Ordering::Relaxed);
                if previous == 1 {
                    self.zero.notify_waiters();
                    true
                } else {
                    false
                }
            }
            Err(_) => {
                tracing::error!("outstanding-task counter decremented below zero");
                false
            }
        }
    }

    /// Returns a guard that decrements once when dropped
    ///
    /// Taken by a worker as soon as it dequeues a URL, so the task is released
    /// on every exit path of the pipeline.
    pub fn complete_on_drop(&self) -> TaskGuard<'_> {
        TaskGuard { counter: self }
    }

    /// Waits until no task is pending or in flight
    pub async fn wait_for_zero(&self) {
        loop {
            let notified = self.zero.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.count.load(Ordering::SeqCst) == 0 {
                return;
            }

            notified.await;
        }
    }

    pub fn current(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Total increments since creation
    pub fn started(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    /// Total successful decrements since creation
    pub fn finished(&self) -> u64 {
        self.finished.load(Ordering::Relaxed)
    }
}

/// Releases one outstanding task on drop
#[must_use = "the task is released as soon as the guard is dropped"]
pub struct TaskGuard<'a> {
    counter: &'a OutstandingCounter,
}

impl Drop for TaskGuard<'_> {
    fn drop(&mut self) {
        self.counter.decrement();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_increment_decrement() {
        let counter = OutstandingCounter::new();
        counter.increment();
        counter.increment();
        assert_eq!(counter.current(), 2);

        assert!(!counter.decrement());
        assert!(counter.decrement());
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.started(), 2);
        assert_eq!(counter.finished(), 2);
    }

    #[test]
    fn test_decrement_at_zero_is_ignored() {
        let counter = OutstandingCounter::new();
        assert!(!counter.decrement());
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.finished(), 0);
    }

    #[test]
    fn test_guard_decrements_once() {
        let counter = OutstandingCounter::new();
        counter.increment();
        counter.increment();
        {
            let _guard = counter.complete_on_drop();
            assert_eq!(counter.current(), 2);
        }
        assert_eq!(counter.current(), 1);
    }

    #[tokio::test]
    async fn test_wait_for_zero_returns_immediately_when_idle() {
        let counter = OutstandingCounter::new();
        tokio::time::timeout(Duration::from_secs(1), counter.wait_for_zero())
            .await
            .expect("idle counter should not block");
    }

    #[tokio::test]
    async fn test_wait_for_zero_wakes_on_last_decrement() {
        let counter = Arc::new(OutstandingCounter::new());
        counter.increment();
        counter.increment();

        let waiter = {
            let counter = counter.clone();
            tokio::spawn(async move { counter.wait_for_zero().await })
        };

        tokio::task::yield_now().await;
        counter.decrement();
        assert!(!waiter.is_finished());

        counter.decrement();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_balance() {
        let counter = Arc::new(OutstandingCounter::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..1000 {
                    counter.increment();
                    tokio::task::yield_now().await;
                    counter.decrement();
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(counter.current(), 0);
        assert_eq!(counter.started(), 8000);
        assert_eq!(counter.finished(), 8000);
    }
}
