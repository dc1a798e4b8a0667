//! One-shot singleton holder used by the object graph.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Lazily constructed, process-wide instance of `T`.
///
/// Concurrent first requests are serialized, so the initializer completes
/// successfully at most once. A failed initializer leaves the cell empty.
pub struct Singleton<T> {
    name: &'static str,
    cell: OnceCell<Arc<T>>,
}

impl<T> Singleton<T> {
    /// Create an empty holder; `name` identifies the binding in logs.
    pub fn new(name: &'static str) -> Self {
        Singleton {
            name,
            cell: OnceCell::new(),
        }
    }

    /// Return the cached instance, constructing it with `init` on first use.
    ///
    /// # Errors
    /// Returns whatever `init` returns, unchanged.
    pub async fn get_or_try_init<F, Fut, E>(&self, init: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let name = self.name;
        self.cell
            .get_or_try_init(|| async move {
                debug!(binding = name, "Constructing singleton");
                init().await.map(Arc::new)
            })
            .await
            .map(Arc::clone)
    }

    /// The instance, if it has been constructed.
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
