//! State Cell Implementation
//!
//! A `StateCell` is the reactive container every hook in this crate builds
//! on. It holds a value, applies explicit updates to it, and tells its
//! owning scope to render again after each commit.
//!
//! # How Commits Work
//!
//! 1. The update is applied to the stored value under the write lock.
//!    `Transform` closures read and replace the value in one step.
//!
//! 2. The commit version is bumped, so a read right after the call already
//!    sees the new value.
//!
//! 3. Value watchers are called with a snapshot of the committed value, with
//!    no lock held. A watcher may therefore read or even update the cell.
//!
//! 4. The owning scope is invalidated.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::update::{Merge, Update};
use crate::error::Result;
use crate::scope::{Invalidator, Scope, ScopeId, SubscriberId};

/// Counter for generating unique cell IDs.
static CELL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_cell_id() -> u64 {
    CELL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Callback invoked with each committed value.
type Watcher<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A reactive state cell holding a value of type `T`.
///
/// Cloning a cell yields another handle to the same state.
///
/// # Example
///
/// ```rust,ignore
/// let count = scope.use_state(0)?;
///
/// count.set(5);
/// count.update(|n| n + 1);
/// assert_eq!(count.get(), 6);
/// ```
pub struct StateCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Unique identifier for this cell.
    id: u64,

    value: Arc<RwLock<T>>,

    /// Number of commits so far.
    version: Arc<AtomicU64>,

    watchers: Arc<RwLock<Vec<(SubscriberId, Watcher<T>)>>>,

    invalidator: Invalidator,
}

impl<T> StateCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a cell bound to the scope behind `invalidator`.
    pub fn new(value: T, invalidator: Invalidator) -> Self {
        Self {
            id: next_cell_id(),
            value: Arc::new(RwLock::new(value)),
            version: Arc::new(AtomicU64::new(0)),
            watchers: Arc::new(RwLock::new(Vec::new())),
            invalidator,
        }
    }

    /// Create a cell that belongs to no scope.
    pub fn detached(value: T) -> Self {
        Self::new(value, Invalidator::noop())
    }

    /// Get the cell's unique ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The scope this cell invalidates.
    pub fn scope(&self) -> ScopeId {
        self.invalidator.scope()
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&*self.value.read())
    }

    /// Number of commits applied since creation.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        *self.value.write() = value;
        self.commit();
    }

    /// Compute the next value from the current one.
    ///
    /// `f` runs under the write lock, so concurrent updates never lose a
    /// step. It must not access this cell.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        self.modify(|value| {
            *value = f(&*value);
            true
        });
    }

    /// Merge a partial patch into the current value.
    pub fn merge(&self, patch: T::Patch)
    where
        T: Merge,
    {
        self.value.write().merge(patch);
        self.commit();
    }

    /// Apply an explicitly tagged update.
    pub fn apply(&self, update: Update<T, T::Patch>)
    where
        T: Merge,
    {
        match update {
            Update::Replace(value) => self.set(value),
            Update::Merge(patch) => self.merge(patch),
            Update::Transform(f) => self.update(f),
        }
    }

    /// Mutate in place and commit only when `f` reports a change.
    ///
    /// Returns what `f` returned.
    pub(crate) fn modify<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let changed = f(&mut *self.value.write());
        if changed {
            self.commit();
        }
        changed
    }

    /// Register a watcher called with every committed value.
    pub fn subscribe<F>(&self, subscriber_id: SubscriberId, watcher: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.watchers
            .write()
            .push((subscriber_id, Arc::new(watcher)));
    }

    /// Remove a watcher.
    pub fn unsubscribe(&self, subscriber_id: SubscriberId) {
        self.watchers.write().retain(|(id, _)| *id != subscriber_id);
    }

    /// Get the number of watchers.
    pub fn subscriber_count(&self) -> usize {
        self.watchers.read().len()
    }

    /// A read-only view of this cell.
    pub fn read_only(&self) -> ReadState<T> {
        ReadState { cell: self.clone() }
    }

    /// Split into a read-only view and the writable handle.
    pub fn split(self) -> (ReadState<T>, StateCell<T>) {
        (self.read_only(), self)
    }

    fn commit(&self) {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        let scope = self.invalidator.scope();
        tracing::trace!(cell = self.id, scope = %scope, version, "state committed");

        let watchers: Vec<Watcher<T>> = self
            .watchers
            .read()
            .iter()
            .map(|(_, watcher)| Arc::clone(watcher))
            .collect();
        if !watchers.is_empty() {
            let snapshot = self.get();
            for watcher in watchers {
                watcher(&snapshot);
            }
        }

        self.invalidator.invalidate();
    }
}

impl<T> Clone for StateCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Arc::clone(&self.value),
            version: Arc::clone(&self.version),
            watchers: Arc::clone(&self.watchers),
            invalidator: self.invalidator.clone(),
        }
    }
}

impl<T> Debug for StateCell<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCell")
            .field("id", &self.id)
            .field("value", &*self.value.read())
            .field("version", &self.version())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Read-only view of a [`StateCell`].
pub struct ReadState<T>
where
    T: Clone + Send + Sync + 'static,
{
    cell: StateCell<T>,
}

impl<T> ReadState<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.cell.get()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.cell.with(f)
    }

    /// Number of commits applied to the underlying cell.
    pub fn version(&self) -> u64 {
        self.cell.version()
    }

    /// Register a watcher called with every committed value.
    pub fn subscribe<F>(&self, subscriber_id: SubscriberId, watcher: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.cell.subscribe(subscriber_id, watcher);
    }

    /// Remove a watcher.
    pub fn unsubscribe(&self, subscriber_id: SubscriberId) {
        self.cell.unsubscribe(subscriber_id);
    }
}

impl<T> Clone for ReadState<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T> Debug for ReadState<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ReadState").field(&self.cell).finish()
    }
}

impl Scope {
    /// Declare a state cell with an initial value.
    ///
    /// The initial value is only used on the first render.
    pub fn use_state<T>(&self, initial: T) -> Result<StateCell<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.use_state_with(move || initial)
    }

    /// Declare a state cell whose initial value comes from `producer`.
    ///
    /// `producer` is called once, on the first render.
    pub fn use_state_with<T, F>(&self, producer: F) -> Result<StateCell<T>>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        self.use_hook(|cx| Ok(StateCell::new(producer(), cx.invalidator())))
    }
}
