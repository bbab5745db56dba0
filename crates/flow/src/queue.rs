//! Bounded blocking FIFO queue
//!
//! The transport between pipeline stages. Producers block when the queue
//! is full, consumers poll with a timeout, and `close()` lets consumers
//! drain the remainder before they observe the closed state.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Outcome of a [`BoundedQueue::get`] call
#[derive(Debug, PartialEq, Eq)]
pub enum Recv<T> {
    /// An item was dequeued
    Item(T),
    /// Nothing arrived within the timeout; the queue is still open
    TimedOut,
    /// The queue is closed and fully drained
    Closed,
}

/// Returned by [`BoundedQueue::put`] when the queue is closed
///
/// Hands the rejected item back to the caller.
#[derive(Debug)]
pub struct QueueClosed<T>(pub T);

/// FIFO queue with a hard capacity
///
/// Many producers, many consumers. `len()` is advisory: it may be stale by
/// the time the caller acts on it, which is fine for watermark
/// observation.
///
/// # Invariants
///
/// - `0 <= len() <= capacity()` at all times
/// - After `close()`, `get` yields every previously enqueued item exactly
///   once, then `Closed`
#[derive(Debug)]
pub struct BoundedQueue<T> {
    capacity: usize,
    inner: Mutex<Inner<T>>,
    not_full: Notify,
    not_empty: Notify,
}

#[derive(Debug)]
struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; configuration validation rejects that
    /// before a flow is built.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "queue capacity must be at least 1");
        Self {
            capacity,
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_full: Notify::new(),
            not_empty: Notify::new(),
        }
    }

    /// Maximum number of items the queue holds
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of queued items (advisory)
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Whether the queue currently holds no items (advisory)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Whether `close()` has been called
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Enqueue an item, waiting for space if the queue is full
    ///
    /// # Errors
    ///
    /// Returns the item back inside [`QueueClosed`] if the queue is (or
    /// becomes) closed before space opens up.
    pub async fn put(&self, item: T) -> Result<(), QueueClosed<T>> {
        loop {
            let notified = self.not_full.notified();
            tokio::pin!(notified);
            // Register interest before checking, so a wakeup between the
            // check and the await is not lost
            notified.as_mut().enable();
            {
                let mut inner = self.inner.lock();
                if inner.closed {
                    return Err(QueueClosed(item));
                }
                if inner.items.len() < self.capacity {
                    inner.items.push_back(item);
                    drop(inner);
                    self.not_empty.notify_one();
                    return Ok(());
                }
            }
            notified.await;
        }
    }

    /// Dequeue an item, waiting at most `timeout`
    ///
    /// Returns `Closed` only once the queue is closed *and* drained;
    /// items enqueued before the close are always delivered.
    pub async fn get(&self, timeout: Duration) -> Recv<T> {
        match tokio::time::timeout(timeout, self.next()).await {
            Ok(result) => result,
            // One final non-blocking look: an item may have landed in the
            // instant the timer fired
            Err(_) => self.try_take().unwrap_or(Recv::TimedOut),
        }
    }

    /// Close the queue; idempotent
    ///
    /// Wakes every blocked producer and consumer. Future `put`s fail;
    /// future `get`s drain the remainder and then report `Closed`.
    pub fn close(&self) {
        {
            let mut inner = self.inner.lock();
            if inner.closed {
                return;
            }
            inner.closed = true;
        }
        self.not_full.notify_waiters();
        self.not_empty.notify_waiters();
    }

    /// Wait indefinitely for an item or the drained-and-closed state
    async fn next(&self) -> Recv<T> {
        loop {
            let notified = self.not_empty.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if let Some(result) = self.try_take() {
                return result;
            }
            notified.await;
        }
    }

    /// Non-blocking dequeue attempt
    ///
    /// `None` means empty-but-open.
    fn try_take(&self) -> Option<Recv<T>> {
        let mut inner = self.inner.lock();
        if let Some(item) = inner.items.pop_front() {
            drop(inner);
            self.not_full.notify_one();
            return Some(Recv::Item(item));
        }
        if inner.closed {
            Some(Recv::Closed)
        } else {
            None
        }
    }
}
