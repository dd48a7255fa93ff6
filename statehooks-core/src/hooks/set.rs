//! Insertion-ordered set state with immutable snapshots.
//!
//! Readers hold `Arc<IndexSet<T>>` snapshots that never change under them.
//! Every mutator builds the next snapshot, stores it, signals a re-render,
//! and returns it. A snapshot that nobody else holds is reused in place.

use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexSet;

use crate::error::Result;
use crate::scope::Scope;
use crate::state::{ReadState, StateCell};

/// Shared immutable view of the set.
pub type SetSnapshot<T> = Arc<IndexSet<T>>;

#[derive(Debug, Clone)]
pub struct SetState<T>
where
    T: Clone + Hash + Eq + Send + Sync + 'static,
{
    cell: StateCell<SetSnapshot<T>>,
}

impl<T> SetState<T>
where
    T: Clone + Hash + Eq + Send + Sync + 'static,
{
    pub fn new(cell: StateCell<SetSnapshot<T>>) -> Self {
        Self { cell }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> SetSnapshot<T> {
        self.cell.get()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.cell.with(|set| set.contains(value))
    }

    pub fn len(&self) -> usize {
        self.cell.with(|set| set.len())
    }

    pub fn is_empty(&self) -> bool {
        self.cell.with(|set| set.is_empty())
    }

    pub fn read_only(&self) -> ReadState<SetSnapshot<T>> {
        self.cell.read_only()
    }

    /// Insert `value`. A value already present leaves the snapshot as is.
    pub fn add(&self, value: T) -> SetSnapshot<T> {
        self.mutate(|set| {
            if set.contains(&value) {
                return false;
            }
            Arc::make_mut(set).insert(value);
            true
        })
    }

    /// Remove `value`, keeping the order of the rest.
    pub fn remove(&self, value: &T) -> SetSnapshot<T> {
        self.mutate(|set| {
            if !set.contains(value) {
                return false;
            }
            Arc::make_mut(set).shift_remove(value);
            true
        })
    }

    /// Remove `value` if present, insert it otherwise.
    pub fn toggle(&self, value: T) -> SetSnapshot<T> {
        self.mutate(|set| {
            let set = Arc::make_mut(set);
            if !set.shift_remove(&value) {
                set.insert(value);
            }
            true
        })
    }

    pub fn clear(&self) -> SetSnapshot<T> {
        self.mutate(|set| {
            if set.is_empty() {
                return false;
            }
            *set = Arc::new(IndexSet::new());
            true
        })
    }

    fn mutate<F>(&self, f: F) -> SetSnapshot<T>
    where
        F: FnOnce(&mut SetSnapshot<T>) -> bool,
    {
        self.cell.modify(f);
        self.snapshot()
    }
}

impl Scope {
    /// Declare set state seeded from `initial`.
    pub fn use_set<T, I>(&self, initial: I) -> Result<SetState<T>>
    where
        T: Clone + Hash + Eq + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        self.use_state_with(|| Arc::new(initial.into_iter().collect()))
            .map(SetState::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(snapshot: &SetSnapshot<&'static str>) -> Vec<&'static str> {
        snapshot.iter().copied().collect()
    }

    #[test]
    fn snapshots_are_immutable() {
        let scope = Scope::detached();
        let set = scope.render(|scope| scope.use_set(["a", "b"])).unwrap();

        let before = set.snapshot();
        let after = set.add("c");

        assert_eq!(values(&before), vec!["a", "b"]);
        assert_eq!(values(&after), vec!["a", "b", "c"]);
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn remove_keeps_insertion_order() {
        let set = SetState::new(StateCell::detached(Arc::new(
            ["a", "b", "c"].into_iter().collect(),
        )));

        let snapshot = set.remove(&"b");
        assert_eq!(values(&snapshot), vec!["a", "c"]);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let set: SetState<&'static str> = SetState::new(StateCell::detached(Arc::default()));

        set.toggle("x");
        assert!(set.contains(&"x"));

        set.toggle("x");
        assert!(!set.contains(&"x"));
        assert!(set.is_empty());
    }

    #[test]
    fn noop_mutations_do_not_commit() {
        let set = SetState::new(StateCell::detached(Arc::new(
            ["a"].into_iter().collect::<IndexSet<_>>(),
        )));
        let view = set.read_only();
        let before = set.snapshot();

        let same = set.add("a");
        set.remove(&"zzz");

        assert!(Arc::ptr_eq(&before, &same));
        assert_eq!(view.version(), 0);

        set.clear();
        set.clear();
        assert_eq!(view.version(), 1);
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn rerender_keeps_contents() {
        let scope = Scope::detached();
        let set = scope.render(|scope| scope.use_set([1, 2])).unwrap();
        set.add(3);

        let again = scope
            .render(|scope| scope.use_set(Vec::<i32>::new()))
            .unwrap();
        assert_eq!(again.len(), 3);
    }
}
