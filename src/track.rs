//! Change tracking around arbitrary async operations.
//!
//! [`ChangeTracker`] watches the document from the outside: it snapshots the
//! store before an operation runs and again after, then logs what changed and
//! who caused it. The operation itself needs no knowledge of the store, and
//! changes made by any means (through the store or straight to the file) are
//! picked up the same way.

use crate::store::DocumentStore;
use std::future::Future;
use std::sync::Arc;

/// Who ran a tracked operation.
///
/// Rendered as `name (id)` in log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Display name.
    pub name: String,
    /// Stable unique identifier.
    pub id: String,
}

impl Actor {
    /// Makes an actor from anything string-like.
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Observes a [`DocumentStore`] around arbitrary async operations.
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    store: Arc<DocumentStore>,
}

impl ChangeTracker {
    /// Builds a tracker observing `store`.
    #[must_use]
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// The observed store.
    #[must_use]
    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Runs `op`, logging who ran it and what it changed.
    ///
    /// The operation's result comes back unchanged, success or failure. A
    /// failure is logged at error level with its diagnostic, and the
    /// before/after comparison still runs afterwards, so partial changes a
    /// failing operation managed to persist are captured too.
    pub async fn track<F, Fut, T, E>(&self, operation: &str, actor: &Actor, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let before = self.store.read().await;
        tracing::info!("running {} from {}", operation, actor);

        let result = op().await;
        if let Err(e) = &result {
            tracing::error!("{} failed: {}", operation, e);
        }

        let after = self.store.read().await;
        let diff = self.store.diff(&before, &after);
        if diff.is_empty() {
            tracing::info!(
                "{} did not change {}",
                operation,
                self.store.path().display()
            );
        } else {
            tracing::info!(
                "{} changed {}: {}",
                operation,
                self.store.path().display(),
                diff
            );
        }
        result
    }
}
