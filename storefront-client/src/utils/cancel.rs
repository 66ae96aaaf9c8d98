use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Cooperative cancellation signal shared between the coordinator and the
/// request it issued. Clones observe the same signal.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Drives `fut` to completion unless the token fires first.
    pub async fn guard<F, T>(&self, fut: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            value = fut => Some(value),
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
