//! Per-manager FIFO request queue with a fixed dispatch rate.
//!
//! Every queued operation is dispatched strictly one at a time, in enqueue order,
//! and consecutive dispatches are separated by at least the queue interval. The
//! submitter receives a [`Queued`] ticket that settles with the operation's own
//! result; one operation failing (or panicking) never affects the others.
//!
//! The lane is pushed to synchronously inside [`RateLimitedQueue::enqueue`], so
//! ordering follows call order even if tickets are awaited out of order or dropped.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{Error, Result};

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

#[derive(Default)]
struct Lane {
    backlog: VecDeque<Job>,
    draining: bool,
}

/// FIFO lane that dispatches queued operations at a bounded rate.
///
/// Clones share the same lane.
#[derive(Clone)]
pub struct RateLimitedQueue {
    lane: Arc<Mutex<Lane>>,
    interval: Duration,
    name: &'static str,
}

impl std::fmt::Debug for RateLimitedQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitedQueue")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("pending", &self.pending())
            .field("draining", &self.is_draining())
            .finish()
    }
}

impl RateLimitedQueue {
    /// Create an empty queue whose dispatches are spaced by `interval`.
    #[must_use]
    pub fn new(name: &'static str, interval: Duration) -> Self {
        Self {
            lane: Arc::new(Mutex::new(Lane::default())),
            interval,
            name,
        }
    }

    /// Create an empty queue dispatching `rate_per_second` operations per second.
    #[must_use]
    pub fn with_rate(name: &'static str, rate_per_second: u32) -> Self {
        let rate = u64::from(rate_per_second.max(1));
        Self::new(name, Duration::from_millis(1000 / rate))
    }

    /// Queue name used in log events.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Minimum spacing between dispatches.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Operations waiting to be dispatched (excluding the one in flight).
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().backlog.len()
    }

    /// Whether a drain task is currently active.
    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.lock().draining
    }

    /// Append an operation to the lane and return a ticket for its result.
    ///
    /// The operation runs even if the ticket is dropped. Must be called from
    /// within a Tokio runtime; otherwise the ticket settles with
    /// [`Error::InternalError`] and nothing is dispatched.
    pub fn enqueue<T, F, Fut>(&self, operation: F) -> Queued<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let queue = self.name;
        let job: Job = Box::new(move || {
            async move {
                let outcome = AssertUnwindSafe(operation()).catch_unwind().await;
                let result = outcome.unwrap_or_else(|_| {
                    warn!(queue, "queued operation panicked");
                    Err(Error::InternalError("Queued operation panicked".to_string()))
                });
                // Receiver may be gone; the operation still ran.
                let _ = tx.send(result);
            }
            .boxed()
        });

        let start_drain = {
            let mut lane = self.lock();
            lane.backlog.push_back(job);
            debug!(queue, pending = lane.backlog.len(), "operation enqueued");
            if lane.draining {
                false
            } else {
                lane.draining = true;
                true
            }
        };

        if start_drain {
            match Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(self.clone().drain());
                }
                Err(_) => {
                    warn!(queue, "no async runtime available; dropping queued operations");
                    let mut lane = self.lock();
                    lane.backlog.clear();
                    lane.draining = false;
                }
            }
        }

        Queued { rx }
    }

    async fn drain(self) {
        debug!(queue = self.name, "drain started");
        let mut guard = DrainGuard {
            lane: &self.lane,
            finished: false,
        };
        loop {
            let next = {
                let mut lane = self.lock();
                match lane.backlog.pop_front() {
                    Some(job) => job,
                    None => {
                        lane.draining = false;
                        guard.finished = true;
                        break;
                    }
                }
            };

            // Panics are already converted inside the job; this guards the lane.
            if AssertUnwindSafe(next()).catch_unwind().await.is_err() {
                warn!(queue = self.name, "queued job aborted");
            }
            tokio::time::sleep(self.interval).await;
        }
        debug!(queue = self.name, "drain finished");
    }

    fn lock(&self) -> MutexGuard<'_, Lane> {
        self.lane.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// Clears `draining` when a drain task is dropped before it empties the lane,
// e.g. because its runtime shut down, so the next enqueue starts a new drain.
struct DrainGuard<'a> {
    lane: &'a Mutex<Lane>,
    finished: bool,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.lane
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .draining = false;
        }
    }
}

/// Ticket for a queued operation; resolves with that operation's result.
#[must_use = "dropping the ticket discards the result, but the operation still runs"]
#[derive(Debug)]
pub struct Queued<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> Future for Queued<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(Error::InternalError(
                    "Queued operation was dropped before completing".to_string(),
                ))
            })
        })
    }
}
