//! Request-scoped cancellation for provider operations
//!
//! Every async provider call takes a `Context` as its first argument. The
//! host cancels it when Terraform is interrupted; handlers check it before
//! doing network work.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    done_tx: watch::Sender<bool>,
    done_rx: watch::Receiver<bool>,
}

impl Context {
    pub fn new() -> Self {
        let (done_tx, done_rx) = watch::channel(false);
        Self {
            inner: Arc::new(ContextInner { done_tx, done_rx }),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done_rx.borrow()
    }

    /// Resolves once the context is cancelled
    pub async fn cancelled(&self) {
        let mut done = self.inner.done_rx.clone();
        let _ = done.wait_for(|cancelled| *cancelled).await;
    }

    pub fn cancel(&self) {
        let _ = self.inner.done_tx.send(true);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
