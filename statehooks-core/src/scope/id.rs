//! Identifiers and the invalidation handle.
//!
//! A `ScopeId` names one owning UI scope (a mounted component). An
//! `Invalidator` is what a cell holds to tell the host "this scope needs to
//! render again". It only carries a weak liveness token, so once the scope is
//! torn down every invalidation becomes a no-op.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Unique identifier for an owning scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    /// Allocate a new unique scope ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier for a value watcher registered on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Sink that receives "render this scope again" requests.
pub(crate) type InvalidationSink = Arc<dyn Fn(ScopeId) + Send + Sync>;

/// Handle a cell uses to request a re-render of its owning scope.
#[derive(Clone)]
pub struct Invalidator {
    scope: ScopeId,
    alive: Weak<()>,
    sink: InvalidationSink,
}

impl Invalidator {
    pub(crate) fn new(scope: ScopeId, alive: Weak<()>, sink: InvalidationSink) -> Self {
        Self { scope, alive, sink }
    }

    /// An invalidator that belongs to no scope and never notifies anyone.
    pub fn noop() -> Self {
        Self {
            scope: ScopeId::new(),
            alive: Weak::new(),
            sink: Arc::new(|_| {}),
        }
    }

    /// The scope this invalidator targets.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Whether the owning scope still exists.
    pub fn is_live(&self) -> bool {
        self.alive.strong_count() > 0
    }

    /// Ask the host to render the owning scope again.
    ///
    /// Silently ignored once the scope has been torn down.
    pub fn invalidate(&self) {
        if self.is_live() {
            tracing::trace!(scope = %self.scope, "scope invalidated");
            (self.sink)(self.scope);
        } else {
            tracing::trace!(scope = %self.scope, "invalidation after teardown ignored");
        }
    }
}

impl fmt::Debug for Invalidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invalidator")
            .field("scope", &self.scope)
            .field("live", &self.is_live())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn scope_ids_are_unique() {
        let id1 = ScopeId::new();
        let id2 = ScopeId::new();
        let id3 = ScopeId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn invalidator_reaches_sink_while_alive() {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();
        let token = Arc::new(());
        let scope = ScopeId::new();

        let invalidator = Invalidator::new(
            scope,
            Arc::downgrade(&token),
            Arc::new(move |id| {
                assert_eq!(id, scope);
                hits_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        invalidator.invalidate();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        drop(token);
        assert!(!invalidator.is_live());
        invalidator.invalidate();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn noop_invalidator_is_never_live() {
        let invalidator = Invalidator::noop();
        assert!(!invalidator.is_live());
        invalidator.invalidate();
    }
}
