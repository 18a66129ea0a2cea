//! Callback fan-out for snapshot consumers.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::types::Snapshot;

/// A registered consumer callback.
pub type SnapshotCallback = Box<dyn Fn(&Snapshot) + Send + Sync>;

/// Delivers snapshots to registered consumers in registration order.
///
/// Registration is append-only for the session's lifetime. Each callback
/// runs inside its own panic boundary, so one failing consumer cannot
/// starve the others or take down the stream session.
#[derive(Default)]
pub struct CallbackDispatcher {
    callbacks: Vec<SnapshotCallback>,
}

impl CallbackDispatcher {
    /// Create a dispatcher with no consumers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a consumer callback.
    pub fn register<F>(&mut self, callback: F)
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Number of registered consumers.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether any consumer is registered.
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Invoke every consumer with the given snapshot, in registration
    /// order. Returns how many callbacks panicked.
    pub fn dispatch(&self, snapshot: &Snapshot) -> usize {
        let mut failures = 0;
        for (index, callback) in self.callbacks.iter().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| callback(snapshot))).is_err() {
                tracing::warn!(callback = index, "snapshot callback panicked, continuing");
                failures += 1;
            }
        }
        failures
    }
}

impl std::fmt::Debug for CallbackDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackDispatcher")
            .field("callback_count", &self.callbacks.len())
            .finish()
    }
}
