//! External notification sources.
//!
//! Browser capabilities (battery, geolocation, observers, window events) are
//! outside this crate. What matters here is their shape: something that can
//! be subscribed to, calls back with events, and must be unsubscribed when
//! the owning scope goes away. [`EventSource`] is that contract and
//! [`Emitter`] is a plain in-memory implementation of it.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::error::Result;
use crate::scope::{Scope, SubscriberId};
use crate::state::{ReadState, StateCell};

/// Callback invoked with each event.
pub type Listener<E> = Arc<dyn Fn(E) + Send + Sync>;

/// Anything that delivers events to subscribed listeners.
pub trait EventSource<E>: Send + Sync {
    /// Start delivering events to `listener` until the returned guard is
    /// dropped or cancelled.
    fn subscribe(&self, listener: Listener<E>) -> Subscription;
}

/// Guard for an active subscription. Dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// A subscription that runs `cancel` when released.
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to release.
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// Unsubscribe now.
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

type ListenerList<E> = RwLock<Vec<(SubscriberId, Listener<E>)>>;

/// In-memory broadcast source.
pub struct Emitter<E> {
    listeners: Arc<ListenerList<E>>,
}

impl<E> Emitter<E>
where
    E: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Deliver `event` to every listener. Returns how many were called.
    pub fn emit(&self, event: E) -> usize {
        let listeners: Vec<Listener<E>> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in &listeners {
            listener(event.clone());
        }
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl<E> Default for Emitter<E>
where
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}

impl<E> EventSource<E> for Emitter<E>
where
    E: Clone + Send + 'static,
{
    fn subscribe(&self, listener: Listener<E>) -> Subscription {
        let id = SubscriberId::new();
        self.listeners.write().push((id, listener));

        let listeners: Weak<ListenerList<E>> = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.write().retain(|(existing, _)| *existing != id);
            }
        })
    }
}

impl Scope {
    /// State fed by an external source.
    ///
    /// `on_event` receives the backing cell and each event, and decides how
    /// to commit it (replace, merge, or transform). The subscription is
    /// released when the scope is torn down.
    pub fn use_subscription<T, E, S, F>(
        &self,
        source: &S,
        initial: T,
        on_event: F,
    ) -> Result<ReadState<T>>
    where
        T: Clone + Send + Sync + 'static,
        E: 'static,
        S: EventSource<E> + ?Sized,
        F: Fn(&StateCell<T>, E) + Send + Sync + 'static,
    {
        self.use_hook(|cx| {
            let cell = StateCell::new(initial, cx.invalidator());
            let target = cell.clone();
            let subscription = source.subscribe(Arc::new(move |event| on_event(&target, event)));
            tracing::trace!(scope = %cx.scope_id(), cell = cell.id(), "source subscribed");

            cx.on_cleanup(move || drop(subscription));
            Ok(cell.read_only())
        })
    }
}
