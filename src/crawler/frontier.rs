//! Bounded frontier queue
//!
//! A fixed-capacity multi-producer, multi-consumer FIFO of canonical URLs.
//! Enqueue never waits unless the caller asks it to, dequeue waits for an
//! item or for the queue to be closed, and closing happens at most once.

use crate::url::CanonicalUrl;
use crossbeam_queue::ArrayQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Why an enqueue did not happen; the URL is handed back
#[derive(Debug, Error)]
pub enum EnqueueError {
    #[error("frontier is full")]
    Full(CanonicalUrl),

    #[error("frontier is closed")]
    Closed(CanonicalUrl),

    #[error("crawl was cancelled while waiting for frontier space")]
    Cancelled(CanonicalUrl),

    #[error("timed out waiting for frontier space")]
    TimedOut(CanonicalUrl),
}

impl EnqueueError {
    /// Returns the URL that was not enqueued
    pub fn into_inner(self) -> CanonicalUrl {
        match self {
            Self::Full(url) | Self::Closed(url) | Self::Cancelled(url) | Self::TimedOut(url) => {
                url
            }
        }
    }
}

pub struct Frontier {
    queue: ArrayQueue<CanonicalUrl>,
    closed: AtomicBool,
    items: Notify,
    space: Notify,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; configuration validation rejects that.
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity),
            closed: AtomicBool::new(false),
            items: Notify::new(),
            space: Notify::new(),
        }
    }

    /// Adds a URL without waiting
    pub fn try_enqueue(&self, url: CanonicalUrl) -> Result<(), EnqueueError> {
        if self.is_closed() {
            return Err(EnqueueError::Closed(url));
        }

        self.queue.push(url).map_err(EnqueueError::Full)?;
        self.items.notify_one();
        Ok(())
    }

    /// Adds a URL, waiting up to `timeout` for a free slot
    ///
    /// Gives up early if the crawl is cancelled or the frontier closes.
    pub async fn enqueue_wait(
        &self,
        url: CanonicalUrl,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), EnqueueError> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut url = url;

        loop {
            let notified = self.space.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.try_enqueue(url) {
                Ok(()) => return Ok(()),
                Err(EnqueueError::Full(returned)) => url = returned,
                Err(other) => return Err(other),
            }

            tokio::select! {
                _ = notified.as_mut() => {}
                _ = cancel.cancelled() => return Err(EnqueueError::Cancelled(url)),
                _ = tokio::time::sleep_until(deadline) => return Err(EnqueueError::TimedOut(url)),
            }
        }
    }

    /// Takes the next URL, waiting while the frontier is empty and open
    ///
    /// Returns `None` once the frontier is closed and drained. Dropping the
    /// returned future before it completes never loses an item.
    pub async fn dequeue(&self) -> Option<CanonicalUrl> {
        loop {
            let notified = self.items.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(url) = self.queue.pop() {
                self.space.notify_one();
                return Some(url);
            }

            if self.is_closed() {
                return None;
            }

            notified.await;
        }
    }

    /// Closes the frontier, waking every waiting consumer and producer
    ///
    /// Returns true only for the call that actually closed it.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }

        self.items.notify_waiters();
        self.space.notify_waiters();
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}
