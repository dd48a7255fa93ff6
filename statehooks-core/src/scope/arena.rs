//! Per-scope hook storage.
//!
//! A `Scope` is the owning UI scope of every cell: each hook called while
//! rendering it gets a slot in the scope's arena, keyed by call position.
//! The first render creates the slots; later renders hand back the same
//! handles in the same order. Nothing is stored in statics, so two scopes
//! never share state even when they run the same render function.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

use super::id::{InvalidationSink, Invalidator, ScopeId};
use crate::error::{HookError, Result};

/// A stored hook handle.
type Slot = Box<dyn Any + Send + Sync>;

/// Teardown action registered by a hook.
type Cleanup = Box<dyn FnOnce() + Send>;

/// Arena of hook slots for one mounted component.
pub struct Scope {
    id: ScopeId,

    /// Hook handles in call order. Most components use a handful of hooks.
    slots: Mutex<SmallVec<[Slot; 8]>>,

    /// Position of the next hook call in the current render.
    cursor: AtomicUsize,

    /// Set after the first successful render; the hook count is fixed from then on.
    sealed: AtomicBool,

    cleanups: Mutex<Vec<Cleanup>>,

    /// Liveness token. Invalidators hold a weak reference to it.
    alive: Arc<()>,

    sink: InvalidationSink,
}

impl Scope {
    /// Create a scope whose invalidations are delivered to `sink`.
    pub fn new<F>(sink: F) -> Self
    where
        F: Fn(ScopeId) + Send + Sync + 'static,
    {
        Self::with_sink(ScopeId::new(), Arc::new(sink))
    }

    /// Create a scope that ignores invalidations.
    ///
    /// Useful when driving hooks by hand, outside any host.
    pub fn detached() -> Self {
        Self::new(|_| {})
    }

    pub(crate) fn with_sink(id: ScopeId, sink: InvalidationSink) -> Self {
        Self {
            id,
            slots: Mutex::new(SmallVec::new()),
            cursor: AtomicUsize::new(0),
            sealed: AtomicBool::new(false),
            cleanups: Mutex::new(Vec::new()),
            alive: Arc::new(()),
            sink,
        }
    }

    /// The scope's identity.
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// A handle that requests a re-render of this scope.
    pub fn invalidator(&self) -> Invalidator {
        Invalidator::new(self.id, Arc::downgrade(&self.alive), Arc::clone(&self.sink))
    }

    /// Number of hook slots created so far.
    pub fn hook_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Run one render pass of this scope.
    ///
    /// Resets the hook cursor, runs `f`, and checks that the render called
    /// the same number of hooks as the first one did.
    pub fn render<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Scope) -> Result<R>,
    {
        self.cursor.store(0, Ordering::SeqCst);
        let output = f(self)?;

        let found = self.cursor.load(Ordering::SeqCst);
        let expected = self.hook_count();
        if self.sealed.load(Ordering::SeqCst) && found != expected {
            return Err(HookError::HookCountChanged {
                scope: self.id,
                expected,
                found,
            });
        }

        self.sealed.store(true, Ordering::SeqCst);
        Ok(output)
    }

    /// Fetch the hook at the current call position, creating it on first use.
    ///
    /// `init` runs only when the slot does not exist yet. If it fails the
    /// call position is released so the error leaves no slot behind.
    pub fn use_hook<H, F>(&self, init: F) -> Result<H>
    where
        H: Clone + Send + Sync + 'static,
        F: FnOnce(&HookContext<'_>) -> Result<H>,
    {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);

        {
            let slots = self.slots.lock();
            if let Some(slot) = slots.get(index) {
                return slot
                    .downcast_ref::<H>()
                    .cloned()
                    .ok_or(HookError::HookOrderMismatch {
                        scope: self.id,
                        index,
                        expected: type_name::<H>(),
                    });
            }

            if self.sealed.load(Ordering::SeqCst) {
                return Err(HookError::HookCountChanged {
                    scope: self.id,
                    expected: slots.len(),
                    found: index + 1,
                });
            }
        }

        let hook = match init(&HookContext { scope: self }) {
            Ok(hook) => hook,
            Err(err) => {
                self.cursor.fetch_sub(1, Ordering::SeqCst);
                return Err(err);
            }
        };

        tracing::trace!(scope = %self.id, index, hook = type_name::<H>(), "hook created");
        self.slots.lock().push(Box::new(hook.clone()));
        Ok(hook)
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        // Kill the liveness token first so cleanups cannot re-queue this scope.
        self.alive = Arc::new(());

        let cleanups = std::mem::take(self.cleanups.get_mut());
        tracing::debug!(scope = %self.id, cleanups = cleanups.len(), "scope torn down");
        for cleanup in cleanups.into_iter().rev() {
            cleanup();
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("hooks", &self.hook_count())
            .field("sealed", &self.sealed.load(Ordering::SeqCst))
            .finish()
    }
}

/// What a hook initialiser can reach while its slot is being created.
pub struct HookContext<'a> {
    scope: &'a Scope,
}

impl HookContext<'_> {
    /// The owning scope's identity.
    pub fn scope_id(&self) -> ScopeId {
        self.scope.id
    }

    /// Invalidation handle for the owning scope.
    pub fn invalidator(&self) -> Invalidator {
        self.scope.invalidator()
    }

    /// Register an action to run when the owning scope is torn down.
    ///
    /// Cleanups run once, in reverse registration order.
    pub fn on_cleanup<F>(&self, cleanup: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.scope.cleanups.lock().push(Box::new(cleanup));
    }
}
