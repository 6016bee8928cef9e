// Stop signal shared by every worker of one factory

use tokio::sync::watch;

/// Observed by serving workers
#[derive(Clone)]
pub struct StopToken {
    rx: watch::Receiver<bool>,
}

impl StopToken {
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal fires (or the sender is dropped)
    pub async fn stopped(&mut self) {
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }
}

/// Owned by the factory
pub struct StopSignal {
    tx: watch::Sender<bool>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn token(&self) -> StopToken {
        StopToken {
            rx: self.tx.subscribe(),
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_observes_trigger() {
        let signal = StopSignal::new();
        let mut token = signal.token();
        assert!(!token.is_stopped());

        let waiter = tokio::spawn(async move {
            token.stopped().await;
            token.is_stopped()
        });
        signal.trigger();

        assert!(waiter.await.unwrap());
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn test_token_created_after_trigger_is_stopped() {
        let signal = StopSignal::new();
        signal.trigger();

        let mut token = signal.token();
        token.stopped().await;
        assert!(token.is_stopped());
    }
}
