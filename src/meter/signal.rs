//! Counting readiness signal between the audio callback and a consumer.
//!
//! `Notifier::post` is a compare-and-swap on the pending count plus a
//! futex-backed thread unpark: it takes no lock, never blocks and never
//! allocates, so it is safe on the real-time thread. `Waiter::wait` parks the
//! consumer thread until a post arrives. The pending count saturates at a
//! limit so a stalled consumer cannot make it grow without bound.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, Thread};
use thiserror::Error;

/// The producer side has shut down and nothing is pending
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("signal closed")]
pub struct Closed;

struct Inner {
    pending: AtomicUsize,
    limit: usize,
    closed: AtomicBool,
}

/// Producer half, cloneable so the stream's error callback can close it
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Inner>,
    consumer: Thread,
}

/// Consumer half, pinned to the thread that created the signal
pub struct Waiter {
    inner: Arc<Inner>,
    _not_send: PhantomData<*const ()>,
}

/// Create a connected signal pair holding at most `limit` pending posts.
///
/// The calling thread is the consumer: only it may wait, and posts unpark it.
pub fn signal(limit: usize) -> (Notifier, Waiter) {
    let inner = Arc::new(Inner {
        pending: AtomicUsize::new(0),
        limit: limit.max(1),
        closed: AtomicBool::new(false),
    });

    (
        Notifier {
            inner: Arc::clone(&inner),
            consumer: thread::current(),
        },
        Waiter {
            inner,
            _not_send: PhantomData,
        },
    )
}

impl Notifier {
    /// Record one new reading. Returns false if the pending count was full.
    pub fn post(&self) -> bool {
        let limit = self.inner.limit;
        let counted = self
            .inner
            .pending
            .fetch_update(Ordering::Release, Ordering::Relaxed, |n| {
                (n < limit).then_some(n + 1)
            })
            .is_ok();
        self.consumer.unpark();
        counted
    }

    /// Mark the signal permanently failed; wakes the consumer.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.consumer.unpark();
    }
}

impl Waiter {
    /// Block until a post is pending and consume it.
    ///
    /// Pending posts are still delivered after `close`; once they are drained
    /// every call returns `Err(Closed)`.
    pub fn wait(&self) -> Result<(), Closed> {
        loop {
            if self.try_take() {
                return Ok(());
            }
            if self.inner.closed.load(Ordering::Acquire) {
                // A post may have landed between the take and the close check
                return if self.try_take() { Ok(()) } else { Err(Closed) };
            }
            thread::park();
        }
    }

    /// The producer closed the signal; pending posts may remain
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Number of posts not yet consumed
    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    fn try_take(&self) -> bool {
        self.inner
            .pending
            .fetch_update(Ordering::Acquire, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok()
    }
}
