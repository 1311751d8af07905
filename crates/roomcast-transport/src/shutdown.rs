//! One-shot session-end signal.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Releases waiters exactly once when a session ends.
///
/// The disconnect path may be reached more than once (remote close racing a
/// local close, or a transport error followed by the close notification).
/// Only the first [`signal`](Self::signal) call releases; the rest are
/// no-ops. Waiters that arrive after the signal resolve immediately.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    fired: AtomicBool,
    notify: Notify,
}

impl ShutdownSignal {
    /// Creates an unsignalled instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the session as ended. Returns `true` only for the first call.
    pub fn signal(&self) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.notify.notify_waiters();
        true
    }

    /// Returns whether the signal has fired.
    pub fn is_signalled(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Waits until the session has ended.
    pub async fn wait(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        if self.fired.load(Ordering::SeqCst) {
            return;
        }
        // Register before the second check so a signal racing this call
        // cannot slip between check and await.
        notified.as_mut().enable();
        if self.fired.load(Ordering::SeqCst) {
            return;
        }
        notified.await;
    }
}
