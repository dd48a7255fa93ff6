//! Indexed list state.
//!
//! Index-based mutations that fall outside the list are no-ops and commit
//! nothing, except `insert_at`, which appends when the index is past the end.

use crate::error::Result;
use crate::scope::Scope;
use crate::state::{ReadState, StateCell};

#[derive(Debug, Clone)]
pub struct ListState<T>
where
    T: Clone + Send + Sync + 'static,
{
    cell: StateCell<Vec<T>>,
}

impl<T> ListState<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(cell: StateCell<Vec<T>>) -> Self {
        Self { cell }
    }

    /// A copy of the current items.
    pub fn get(&self) -> Vec<T> {
        self.cell.get()
    }

    pub fn len(&self) -> usize {
        self.cell.with(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.cell.with(Vec::is_empty)
    }

    pub fn read_only(&self) -> ReadState<Vec<T>> {
        self.cell.read_only()
    }

    /// Replace the whole list.
    pub fn set(&self, items: Vec<T>) {
        self.cell.set(items);
    }

    pub fn push(&self, item: T) {
        self.cell.modify(|items| {
            items.push(item);
            true
        });
    }

    /// Insert before `index`; an index past the end appends.
    pub fn insert_at(&self, index: usize, item: T) {
        self.cell.modify(|items| {
            let index = index.min(items.len());
            items.insert(index, item);
            true
        });
    }

    /// Replace the item at `index`. Returns false if there is none.
    pub fn update_at(&self, index: usize, item: T) -> bool {
        self.cell.modify(|items| match items.get_mut(index) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        })
    }

    /// Remove and return the item at `index`, if any.
    pub fn remove_at(&self, index: usize) -> Option<T> {
        let mut removed = None;
        self.cell.modify(|items| {
            if index < items.len() {
                removed = Some(items.remove(index));
            }
            removed.is_some()
        });
        removed
    }

    pub fn clear(&self) {
        self.cell.modify(|items| {
            let had_items = !items.is_empty();
            items.clear();
            had_items
        });
    }
}

impl Scope {
    /// Declare list state.
    pub fn use_list<T>(&self, initial: Vec<T>) -> Result<ListState<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.use_state(initial).map(ListState::new)
    }
}
