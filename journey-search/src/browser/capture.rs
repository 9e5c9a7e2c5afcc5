//! Write-once rendezvous between the response interceptor and the session.
//!
//! The interceptor runs on its own task and may fire at any point after it
//! is installed. It records what it saw at most once; the session reads the
//! cell only after its wait for the results container has resolved. A
//! forbidden response additionally wakes the session so it can abort
//! without sitting out the results timeout.

use std::sync::{Arc, OnceLock};

use tokio::sync::Notify;

/// What the interceptor saw on the search API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intercepted {
    /// Response body, passed through to the page unmodified.
    Body(String),
    /// The site answered 403.
    Forbidden { url: String },
    /// The search API answered but its body could not be read.
    Failed(String),
}

/// Shared write-once cell for the intercepted search response.
#[derive(Debug, Clone, Default)]
pub struct ResponseCapture {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cell: OnceLock<Intercepted>,
    recorded: Notify,
}

impl ResponseCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an interception. Only the first call has any effect.
    ///
    /// Returns whether this call was the one that filled the cell.
    pub fn record(&self, intercepted: Intercepted) -> bool {
        let first = self.inner.cell.set(intercepted).is_ok();
        if first {
            self.inner.recorded.notify_waiters();
        }
        first
    }

    pub fn get(&self) -> Option<&Intercepted> {
        self.inner.cell.get()
    }

    /// Resolves with the blocked URL once a forbidden response is recorded.
    ///
    /// Never resolves if the cell holds (or later receives) anything else.
    pub async fn forbidden(&self) -> String {
        loop {
            let recorded = self.inner.recorded.notified();
            tokio::pin!(recorded);
            // Register before checking the cell so a concurrent `record`
            // cannot slip between the check and the wait.
            recorded.as_mut().enable();

            match self.inner.cell.get() {
                Some(Intercepted::Forbidden { url }) => return url.clone(),
                Some(_) => std::future::pending::<()>().await,
                None => recorded.await,
            }
        }
    }
}
