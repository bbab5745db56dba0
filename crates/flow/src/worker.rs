//! Fixed-size worker pool
//!
//! A pool is a set of identical tasks looping over a shared input queue.
//! The pool itself only tracks the tasks; "stop accepting new jobs" is
//! expressed by closing that queue before shutting the pool down.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};

/// How a pool shutdown ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every worker exited within the budget
    Drained,
    /// Some workers overran the deadline and were abandoned
    TimedOut {
        /// Number of abandoned workers
        abandoned: usize,
    },
}

impl ShutdownOutcome {
    /// Whether every worker exited cleanly
    #[inline]
    pub fn is_drained(&self) -> bool {
        matches!(self, Self::Drained)
    }
}

/// A fixed set of spawned worker tasks
pub struct WorkerPool {
    name: String,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` workers built by `factory`
    ///
    /// The factory is called once per worker index, so per-worker state
    /// (like an owned source) can be moved out of it.
    pub fn spawn<F, Fut>(name: impl Into<String>, size: usize, mut factory: F) -> Self
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let handles = (0..size).map(|index| tokio::spawn(factory(index))).collect();
        tracing::debug!(pool = %name, size, "worker pool started");
        Self { name, handles }
    }

    /// Number of workers in the pool
    #[inline]
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Shut the pool down within `budget`
    ///
    /// With `drain = true` workers are joined as they finish their queues;
    /// with `drain = false` they are aborted first. Either way, a worker
    /// that has not exited by the deadline is aborted and counted as
    /// abandoned; the pool never wedges the caller past the budget.
    pub async fn shutdown(mut self, drain: bool, budget: Duration) -> ShutdownOutcome {
        if !drain {
            for handle in &self.handles {
                handle.abort();
            }
        }

        let deadline = Instant::now() + budget;
        let mut abandoned = 0;
        for mut handle in self.handles.drain(..) {
            match timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(join_error)) => {
                    if join_error.is_panic() {
                        tracing::error!(pool = %self.name, error = %join_error, "worker panicked");
                    }
                    // Cancelled workers (abort path) are expected
                }
                Err(_) => {
                    handle.abort();
                    abandoned += 1;
                }
            }
        }

        if abandoned > 0 {
            tracing::warn!(
                pool = %self.name,
                abandoned,
                "shutdown budget exceeded; abandoning workers"
            );
            ShutdownOutcome::TimedOut { abandoned }
        } else {
            tracing::debug!(pool = %self.name, "worker pool drained");
            ShutdownOutcome::Drained
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("size", &self.handles.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_workers_run() {
        let count = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::spawn("test", 4, |_| {
            let count = Arc::clone(&count);
            async move {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });

        assert_eq!(pool.size(), 4);
        let outcome = pool.shutdown(true, Duration::from_secs(1)).await;
        assert!(outcome.is_drained());
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_factory_sees_indices() {
        let sum = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::spawn("test", 3, |index| {
            let sum = Arc::clone(&sum);
            async move {
                sum.fetch_add(index, Ordering::SeqCst);
            }
        });

        pool.shutdown(true, Duration::from_secs(1)).await;
        assert_eq!(sum.load(Ordering::SeqCst), 0 + 1 + 2);
    }

    #[tokio::test]
    async fn test_hung_worker_is_abandoned() {
        let pool = WorkerPool::spawn("test", 2, |index| async move {
            if index == 0 {
                // Never exits on its own
                std::future::pending::<()>().await;
            }
        });

        let outcome = pool.shutdown(true, Duration::from_millis(50)).await;
        assert_eq!(outcome, ShutdownOutcome::TimedOut { abandoned: 1 });
    }

    #[tokio::test]
    async fn test_abort_shutdown_interrupts() {
        let pool = WorkerPool::spawn("test", 2, |_| async {
            std::future::pending::<()>().await;
        });

        let outcome = pool.shutdown(false, Duration::from_secs(1)).await;
        assert!(outcome.is_drained());
    }
}
