//! Host Runtime
//!
//! The runtime is a minimal host that owns mounted scopes and re-renders
//! them when their cells change.
//!
//! # How It Works
//!
//! 1. `mount` creates a scope and renders it once.
//!
//! 2. When a cell commits, its invalidator pushes the scope's ID onto the
//!    runtime's render queue. The queue is a set, so several commits in the
//!    same turn cause one render.
//!
//! 3. `flush` drains the queue and renders each scope in the order it was
//!    queued. Renders may queue more work; flushing repeats until the queue
//!    is empty or the configured pass limit is hit.
//!
//! 4. `unmount` drops the scope, which runs its hook cleanups.
//!
//! The queue sits behind an `Arc<Mutex<_>>` so cells updated from timer
//! tasks can still reach it; rendering itself only happens inside `flush`.

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::arena::Scope;
use super::id::ScopeId;
use crate::error::{HookError, Result};

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// How many drain passes `flush` makes before reporting a render loop.
    pub max_flush_passes: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_flush_passes: 100,
        }
    }
}

impl RuntimeConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The render function of a mounted component.
type RenderFn = Box<dyn FnMut(&Scope) -> Result<()>>;

struct Mounted {
    scope: Scope,
    render: RenderFn,
    renders: usize,
}

impl Mounted {
    fn render(&mut self) -> Result<()> {
        let render = &mut self.render;
        self.scope.render(|scope| render(scope))?;
        self.renders += 1;
        Ok(())
    }
}

/// Owns mounted scopes and drives their re-renders.
pub struct Runtime {
    config: RuntimeConfig,
    scopes: IndexMap<ScopeId, Mounted>,
    queue: Arc<Mutex<IndexSet<ScopeId>>>,
}

impl Runtime {
    /// Create a runtime with default settings.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a runtime with the given settings.
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            config,
            scopes: IndexMap::new(),
            queue: Arc::new(Mutex::new(IndexSet::new())),
        }
    }

    /// The active settings.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Mount a component and render it once.
    ///
    /// Commits made during that render leave the scope queued for the next
    /// `flush`. If the first render fails the scope is torn down again and the error
    /// is returned.
    pub fn mount<F>(&mut self, render: F) -> Result<ScopeId>
    where
        F: FnMut(&Scope) -> Result<()> + 'static,
    {
        let queue = Arc::clone(&self.queue);
        let id = ScopeId::new();
        let scope = Scope::with_sink(
            id,
            Arc::new(move |scope| {
                queue.lock().insert(scope);
            }),
        );

        let mut mounted = Mounted {
            scope,
            render: Box::new(render),
            renders: 0,
        };
        mounted.render()?;

        tracing::debug!(scope = %id, "scope mounted");
        self.scopes.insert(id, mounted);
        Ok(id)
    }

    /// Tear a scope down. Returns false if it was not mounted.
    pub fn unmount(&mut self, id: ScopeId) -> bool {
        self.queue.lock().shift_remove(&id);
        match self.scopes.shift_remove(&id) {
            Some(mounted) => {
                tracing::debug!(scope = %id, renders = mounted.renders, "scope unmounted");
                true
            }
            None => false,
        }
    }

    /// Whether a scope is currently mounted.
    pub fn is_mounted(&self, id: ScopeId) -> bool {
        self.scopes.contains_key(&id)
    }

    /// How many times a scope has rendered, including the mount render.
    pub fn render_count(&self, id: ScopeId) -> Option<usize> {
        self.scopes.get(&id).map(|mounted| mounted.renders)
    }

    /// Number of scopes waiting to render.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Render every queued scope until the queue settles.
    ///
    /// Returns the number of renders performed. If a render fails, that
    /// scope and the ones not yet reached in its pass stay queued, so a
    /// later `flush` still renders them.
    pub fn flush(&mut self) -> Result<usize> {
        let mut rendered = 0;

        for _ in 0..self.config.max_flush_passes {
            let batch: Vec<ScopeId> = self.queue.lock().drain(..).collect();
            if batch.is_empty() {
                tracing::trace!(rendered, "flush settled");
                return Ok(rendered);
            }

            for (position, id) in batch.iter().enumerate() {
                // Scopes unmounted since they were queued are skipped.
                let Some(mounted) = self.scopes.get_mut(id) else {
                    continue;
                };
                if let Err(err) = mounted.render() {
                    let requeued = batch.len() - position;
                    tracing::debug!(scope = %id, requeued, "render failed");
                    self.requeue_front(&batch[position..]);
                    return Err(err);
                }
                rendered += 1;
            }
        }

        if self.queue.lock().is_empty() {
            return Ok(rendered);
        }

        let passes = self.config.max_flush_passes;
        tracing::warn!(passes, "render queue did not settle");
        Err(HookError::RenderLoop { passes })
    }

    /// Put `ids` back ahead of anything queued since they were drained.
    fn requeue_front(&self, ids: &[ScopeId]) {
        let mut queue = self.queue.lock();
        let queued = std::mem::take(&mut *queue);
        queue.extend(ids.iter().copied());
        queue.extend(queued);
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("scopes", &self.scopes.len())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config = RuntimeConfig::from_json("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());

        let config = RuntimeConfig::from_json(r#"{"max_flush_passes": 3}"#).unwrap();
        assert_eq!(config.max_flush_passes, 3);

        assert!(matches!(
            RuntimeConfig::from_json("not json"),
            Err(HookError::Config(_))
        ));
    }

    #[test]
    fn mount_renders_once() {
        let mut runtime = Runtime::new();
        let id = runtime.mount(|_| Ok(())).unwrap();

        assert!(runtime.is_mounted(id));
        assert_eq!(runtime.render_count(id), Some(1));
        assert_eq!(runtime.flush().unwrap(), 0);
    }

    #[test]
    fn invalidations_are_batched_per_scope() {
        let mut runtime = Runtime::new();
        let invalidator = Rc::new(Cell::new(None));
        let slot = invalidator.clone();

        let id = runtime
            .mount(move |scope| {
                slot.set(Some(scope.invalidator()));
                Ok(())
            })
            .unwrap();

        let handle = invalidator.take().unwrap();
        handle.invalidate();
        handle.invalidate();
        handle.invalidate();
        assert_eq!(runtime.pending(), 1);

        assert_eq!(runtime.flush().unwrap(), 1);
        assert_eq!(runtime.render_count(id), Some(2));
    }

    #[test]
    fn unmounted_scopes_are_not_rendered() {
        let mut runtime = Runtime::new();
        let invalidator = Rc::new(Cell::new(None));
        let slot = invalidator.clone();

        let id = runtime
            .mount(move |scope| {
                slot.set(Some(scope.invalidator()));
                Ok(())
            })
            .unwrap();
        let handle = invalidator.take().unwrap();

        assert!(runtime.unmount(id));
        assert!(!runtime.unmount(id));

        handle.invalidate();
        assert_eq!(runtime.pending(), 0);
        assert_eq!(runtime.flush().unwrap(), 0);
    }

    #[test]
    fn failed_render_keeps_unrendered_scopes_queued() {
        let mut runtime = Runtime::new();
        let fail = Rc::new(Cell::new(false));
        let handles = Rc::new(RefCell::new(Vec::new()));

        let failing = fail.clone();
        let slot = handles.clone();
        let broken = runtime
            .mount(move |scope| {
                slot.borrow_mut().push(scope.invalidator());
                if failing.get() {
                    return Err(HookError::NoAsyncRuntime);
                }
                Ok(())
            })
            .unwrap();

        let slot = handles.clone();
        let healthy = runtime
            .mount(move |scope| {
                slot.borrow_mut().push(scope.invalidator());
                Ok(())
            })
            .unwrap();

        fail.set(true);
        for handle in handles.borrow().iter().take(2) {
            handle.invalidate();
        }
        assert_eq!(runtime.pending(), 2);

        assert!(matches!(runtime.flush(), Err(HookError::NoAsyncRuntime)));
        assert_eq!(runtime.pending(), 2);
        assert_eq!(runtime.render_count(healthy), Some(1));

        fail.set(false);
        assert_eq!(runtime.flush().unwrap(), 2);
        assert_eq!(runtime.render_count(broken), Some(2));
        assert_eq!(runtime.render_count(healthy), Some(2));
        assert_eq!(runtime.pending(), 0);
    }

    #[test]
    fn endless_rerender_is_reported() {
        let mut runtime = Runtime::with_config(RuntimeConfig { max_flush_passes: 4 });
        runtime
            .mount(|scope| {
                scope.invalidator().invalidate();
                Ok(())
            })
            .unwrap();
        assert_eq!(runtime.pending(), 1);

        assert!(matches!(
            runtime.flush(),
            Err(HookError::RenderLoop { passes: 4 })
        ));
    }
}
