//! Cooperative cancellation for in-flight saves.
//!
//! A handle is created per save attempt and handed to the saver. Aborting is sticky: once
//! aborted, every current and future [`AbortHandle::aborted`] wait completes immediately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct AbortInner {
    aborted: AtomicBool,
    notify: Notify,
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct AbortHandle {
    inner: Arc<AbortInner>,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and wake every waiter.
    pub fn abort(&self) {
        self.inner.aborted.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::SeqCst)
    }

    /// Resolves once [`AbortHandle::abort`] has been called.
    pub async fn aborted(&self) {
        loop {
            // Register before checking the flag so an abort between the two is not missed.
            let notified = self.inner.notify.notified();
            if self.is_aborted() {
                return;
            }
            notified.await;
        }
    }

    /// Whether `other` is a clone of this handle.
    pub fn same_as(&self, other: &AbortHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn clones_share_the_flag() {
        let handle = AbortHandle::new();
        let clone = handle.clone();
        assert!(!clone.is_aborted());
        handle.abort();
        assert!(clone.is_aborted());
        assert!(handle.same_as(&clone));
        assert!(!handle.same_as(&AbortHandle::new()));
    }

    #[tokio::test]
    async fn aborted_wakes_waiters() {
        let handle = AbortHandle::new();
        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.aborted().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.abort();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish")
            .expect("task should not panic");
    }

    #[tokio::test]
    async fn already_aborted_returns_immediately() {
        let handle = AbortHandle::new();
        handle.abort();
        tokio::time::timeout(Duration::from_millis(100), handle.aborted())
            .await
            .expect("should not wait");
    }
}
