//! Cancellation channel for the relay loop.
//!
//! The loop observes cancellation through the same `select!` it uses for
//! device readiness, so a stop request never mutates relay state directly.

use tokio::sync::watch;

/// Create a linked cancellation handle and token.
pub fn cancellation() -> (CancelHandle, Cancellation) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, Cancellation { rx })
}

/// Requests cancellation. Clonable; any clone may cancel.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes cancellation.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    /// Resolve once cancellation has been requested.
    ///
    /// If every handle is dropped without cancelling, this never resolves.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn cancel_before_wait() {
        let (handle, mut token) = cancellation();
        handle.cancel();
        tokio::time::timeout(Duration::from_secs(1), token.cancelled())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancel_while_waiting() {
        let (handle, mut token) = cancellation();
        let waiter = tokio::spawn(async move { token.cancelled().await });
        tokio::task::yield_now().await;
        handle.clone().cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn dropped_handle_never_cancels() {
        let (handle, mut token) = cancellation();
        drop(handle);
        let waited = tokio::time::timeout(Duration::from_millis(50), token.cancelled()).await;
        assert!(waited.is_err());
    }
}
