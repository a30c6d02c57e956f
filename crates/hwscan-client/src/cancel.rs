use tokio::sync::watch;

/// Requests cancellation of a discovery run.
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// Observed by a discovery run between addresses.
#[derive(Debug, Clone)]
pub struct CancelToken(watch::Receiver<bool>);

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self(rx)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once cancellation is requested.
    pub async fn cancelled(&mut self) {
        // An error means the handle is gone and cancellation can no longer happen.
        if self.0.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Creates a linked handle and token.
pub fn cancellation() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(tx), CancelToken(rx))
}

#[cfg(test)]
mod tests {
    use super::{cancellation, CancelToken};
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn handle_cancels_every_clone() {
        let (handle, token) = cancellation();
        let mut other = token.clone();
        assert!(!token.is_cancelled());

        handle.cancel();
        assert!(token.is_cancelled());
        timeout(Duration::from_secs(1), other.cancelled())
            .await
            .expect("cancellation not observed");
    }

    #[tokio::test]
    async fn never_token_stays_live() {
        let mut token = CancelToken::never();
        assert!(!token.is_cancelled());
        assert!(timeout(Duration::from_millis(20), token.cancelled())
            .await
            .is_err());
    }
}
