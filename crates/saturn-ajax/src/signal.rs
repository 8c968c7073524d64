//! Cancellation signals scoped to the lifetime of a view.

use tokio_util::sync::CancellationToken;

/// Aborts every request bound to it once triggered.
///
/// Clones share state: cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct Signal {
    token: CancellationToken,
}

impl Signal {
    /// A fresh, untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger the signal.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the signal has been triggered.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal is triggered.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// A signal that fires with this one but can also be triggered alone.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }
}

/// Owns a signal and triggers it when dropped.
#[derive(Debug, Default)]
pub struct ViewScope {
    signal: Signal,
}

impl ViewScope {
    /// Open a scope with a fresh signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal to bind requests to.
    #[must_use]
    pub fn signal(&self) -> Signal {
        self.signal.clone()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.signal.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_scope_cancels_its_signal() {
        let scope = ViewScope::new();
        let signal = scope.signal();
        assert!(!signal.is_cancelled());
        drop(scope);
        assert!(signal.is_cancelled());
    }

    #[test]
    fn child_cancels_alone_but_follows_parent() {
        let parent = Signal::new();
        let child = parent.child();
        child.cancel();
        assert!(!parent.is_cancelled());

        let second = parent.child();
        parent.cancel();
        assert!(second.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_future_resolves_after_trigger() {
        let signal = Signal::new();
        let waiter = signal.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        signal.cancel();
        handle.await.expect("waiter task");
    }
}
