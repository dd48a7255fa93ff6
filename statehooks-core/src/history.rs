//! Undo/Redo History
//!
//! A `History` keeps a present value together with the values that came
//! before it (`past`, oldest first) and the values undone from it (`future`,
//! nearest redo first).
//!
//! # Transitions
//!
//! - `set(x)`: the present moves to the end of `past`, `x` becomes the
//!   present, and `future` is discarded.
//! - `undo()`: the last entry of `past` becomes the present and the old
//!   present goes to the front of `future`. No-op when `past` is empty.
//! - `redo()`: the first entry of `future` becomes the present and the old
//!   present goes to the end of `past`. No-op when `future` is empty.
//! - `clear()`: both stacks are emptied and the present goes back to the
//!   value the history was created with.
//!
//! Every transition is also expressible as a [`HistoryAction`], and
//! [`History::dispatch`] is the single place they are applied. Replaying the
//! same actions from the same initial value always yields the same history.
//!
//! [`HistoryCell`] is the scope-bound form: a state cell holding a
//! `History` that re-renders its scope only when a transition changed it.

use std::collections::VecDeque;
use std::mem;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scope::{Invalidator, Scope};
use crate::state::StateCell;

/// One history transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryAction<T> {
    Set(T),
    Undo,
    Redo,
    Clear,
}

/// Linear undo/redo history.
///
/// Deserializing trims `past` to the stored limit, oldest entries first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredHistory<T>")]
pub struct History<T> {
    past: VecDeque<T>,
    present: T,
    future: VecDeque<T>,

    /// Value restored by `clear`.
    initial: T,

    /// Maximum number of `past` entries kept, if bounded.
    limit: Option<usize>,
}

/// Serialized form of a `History`, checked against its limit on load.
#[derive(Deserialize)]
struct StoredHistory<T> {
    past: VecDeque<T>,
    present: T,
    future: VecDeque<T>,
    initial: T,
    limit: Option<usize>,
}

impl<T> From<StoredHistory<T>> for History<T> {
    fn from(stored: StoredHistory<T>) -> Self {
        let mut history = Self {
            past: stored.past,
            present: stored.present,
            future: stored.future,
            initial: stored.initial,
            limit: stored.limit,
        };
        history.enforce_limit();
        history
    }
}

impl<T: Clone> History<T> {
    /// Create an unbounded history.
    pub fn new(initial: T) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial.clone(),
            future: VecDeque::new(),
            initial,
            limit: None,
        }
    }

    /// Create a history that keeps at most `limit` past entries.
    ///
    /// Older entries are dropped first.
    pub fn with_limit(initial: T, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new(initial)
        }
    }

    /// Rebuild a history by applying `actions` to a fresh one.
    pub fn replay<I>(initial: T, actions: I) -> Self
    where
        I: IntoIterator<Item = HistoryAction<T>>,
    {
        let mut history = Self::new(initial);
        for action in actions {
            history.dispatch(action);
        }
        history
    }

    /// Apply one transition. Returns whether the history changed.
    pub fn dispatch(&mut self, action: HistoryAction<T>) -> bool {
        match action {
            HistoryAction::Set(value) => self.set(value),
            HistoryAction::Undo => self.undo(),
            HistoryAction::Redo => self.redo(),
            HistoryAction::Clear => self.clear(),
        }
    }

    /// Make `value` the present, discarding any redo entries.
    pub fn set(&mut self, value: T) -> bool {
        let previous = mem::replace(&mut self.present, value);
        self.past.push_back(previous);
        self.future.clear();
        self.enforce_limit();
        true
    }

    /// Step back one entry.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        true
    }

    /// Step forward one entry.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = mem::replace(&mut self.present, next);
        self.past.push_back(current);
        self.enforce_limit();
        true
    }

    /// Forget all entries and restore the construction-time value.
    pub fn clear(&mut self) -> bool {
        self.past.clear();
        self.future.clear();
        self.present = self.initial.clone();
        true
    }
}

impl<T> History<T> {
    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            while self.past.len() > limit {
                self.past.pop_front();
            }
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Earlier values, oldest first.
    pub fn past(&self) -> &VecDeque<T> {
        &self.past
    }

    /// Undone values, nearest redo first.
    pub fn future(&self) -> &VecDeque<T> {
        &self.future
    }

    pub fn initial(&self) -> &T {
        &self.initial
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }
}

/// A history stored in a state cell.
pub struct HistoryCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    cell: StateCell<History<T>>,
}

impl<T> HistoryCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wrap `history` in a cell bound to the scope behind `invalidator`.
    pub fn new(history: History<T>, invalidator: Invalidator) -> Self {
        Self {
            cell: StateCell::new(history, invalidator),
        }
    }

    /// A history cell that belongs to no scope.
    pub fn detached(initial: T) -> Self {
        Self::new(History::new(initial), Invalidator::noop())
    }

    /// The present value.
    pub fn state(&self) -> T {
        self.cell.with(|history| history.present().clone())
    }

    /// A copy of the whole history.
    pub fn snapshot(&self) -> History<T> {
        self.cell.get()
    }

    /// Number of commits so far. Guarded no-ops do not count.
    pub fn version(&self) -> u64 {
        self.cell.version()
    }

    pub fn can_undo(&self) -> bool {
        self.cell.with(History::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        self.cell.with(History::can_redo)
    }

    pub fn set(&self, value: T) {
        self.dispatch(HistoryAction::Set(value));
    }

    /// Returns false when there was nothing to undo.
    pub fn undo(&self) -> bool {
        self.dispatch(HistoryAction::Undo)
    }

    /// Returns false when there was nothing to redo.
    pub fn redo(&self) -> bool {
        self.dispatch(HistoryAction::Redo)
    }

    pub fn clear(&self) {
        self.dispatch(HistoryAction::Clear);
    }

    /// Apply a transition, committing only if it changed the history.
    pub fn dispatch(&self, action: HistoryAction<T>) -> bool {
        let kind = match &action {
            HistoryAction::Set(_) => "set",
            HistoryAction::Undo => "undo",
            HistoryAction::Redo => "redo",
            HistoryAction::Clear => "clear",
        };
        let changed = self.cell.modify(|history| history.dispatch(action));
        tracing::trace!(cell = self.cell.id(), action = kind, changed, "history transition");
        changed
    }
}

impl<T> Clone for HistoryCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T> std::fmt::Debug for HistoryCell<T>
where
    T: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HistoryCell").field(&self.cell).finish()
    }
}

impl Scope {
    /// Declare an unbounded undo/redo history.
    pub fn use_history<T>(&self, initial: T) -> Result<HistoryCell<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.use_hook(|cx| Ok(HistoryCell::new(History::new(initial), cx.invalidator())))
    }

    /// Declare a history that keeps at most `limit` past entries.
    pub fn use_history_with_limit<T>(&self, initial: T, limit: usize) -> Result<HistoryCell<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.use_hook(|cx| {
            Ok(HistoryCell::new(
                History::with_limit(initial, limit),
                cx.invalidator(),
            ))
        })
    }
}
