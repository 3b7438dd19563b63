//! Shutdown coordination.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// How long in-flight HTTP requests get after a shutdown signal.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Coordinator for graceful shutdown.
///
/// Cloning yields another handle to the same trigger. Tokens handed out by
/// [`Shutdown::token`] observe the trigger even if they subscribe late.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
    grace_period: Duration,
}

impl Shutdown {
    /// Create a new shutdown coordinator with the default grace period.
    pub fn new() -> Self {
        Self::with_grace_period(DEFAULT_GRACE_PERIOD)
    }

    pub fn with_grace_period(grace_period: Duration) -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            grace_period,
        }
    }

    /// Hand out a cancellation token.
    pub fn token(&self) -> ShutdownToken {
        ShutdownToken {
            rx: self.tx.subscribe(),
            grace_period: self.grace_period,
        }
    }

    /// Trigger the shutdown signal. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation token carrying the deadline to apply once cancelled.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
    grace_period: Duration,
}

impl ShutdownToken {
    /// Resolve once shutdown has been triggered.
    ///
    /// If every [`Shutdown`] handle is dropped without triggering, this never
    /// resolves. Cancel-safe.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|triggered| *triggered).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Time allowed for in-flight work after cancellation.
    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn late_subscriber_sees_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let mut token = shutdown.token();
        assert!(token.is_cancelled());
        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("token should already be cancelled");
    }

    #[tokio::test]
    async fn token_waits_for_trigger() {
        let shutdown = Shutdown::with_grace_period(Duration::from_millis(250));
        let mut token = shutdown.token();
        assert_eq!(token.grace_period(), Duration::from_millis(250));

        let pending = tokio::time::timeout(Duration::from_millis(50), token.cancelled()).await;
        assert!(pending.is_err());

        let trigger = shutdown.clone();
        tokio::spawn(async move { trigger.trigger() });
        token.cancelled().await;
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn dropped_coordinator_does_not_cancel() {
        let mut token = Shutdown::new().token();
        let res = tokio::time::timeout(Duration::from_millis(50), token.cancelled()).await;
        assert!(res.is_err());
    }
}
