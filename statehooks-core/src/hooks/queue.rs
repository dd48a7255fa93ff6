//! FIFO queue state.

use std::collections::VecDeque;

use crate::error::Result;
use crate::scope::Scope;
use crate::state::{ReadState, StateCell};

#[derive(Debug, Clone)]
pub struct QueueState<T>
where
    T: Clone + Send + Sync + 'static,
{
    cell: StateCell<VecDeque<T>>,
}

impl<T> QueueState<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(cell: StateCell<VecDeque<T>>) -> Self {
        Self { cell }
    }

    /// Append to the back.
    pub fn add(&self, item: T) {
        self.cell.modify(|queue| {
            queue.push_back(item);
            true
        });
    }

    /// Take from the front.
    pub fn remove(&self) -> Option<T> {
        let mut removed = None;
        self.cell.modify(|queue| {
            removed = queue.pop_front();
            removed.is_some()
        });
        removed
    }

    pub fn clear(&self) {
        self.cell.modify(|queue| {
            let had_items = !queue.is_empty();
            queue.clear();
            had_items
        });
    }

    pub fn first(&self) -> Option<T> {
        self.cell.with(|queue| queue.front().cloned())
    }

    pub fn last(&self) -> Option<T> {
        self.cell.with(|queue| queue.back().cloned())
    }

    pub fn size(&self) -> usize {
        self.cell.with(VecDeque::len)
    }

    /// Items from front to back.
    pub fn items(&self) -> Vec<T> {
        self.cell.with(|queue| queue.iter().cloned().collect())
    }

    pub fn read_only(&self) -> ReadState<VecDeque<T>> {
        self.cell.read_only()
    }
}

impl Scope {
    /// Declare queue state. The first element of `initial` is the front.
    pub fn use_queue<T>(&self, initial: Vec<T>) -> Result<QueueState<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.use_state(VecDeque::from(initial)).map(QueueState::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_is_first_in_first_out() {
        let scope = Scope::detached();
        let queue = scope.render(|scope| scope.use_queue(vec![1])).unwrap();

        queue.add(2);
        queue.add(3);
        assert_eq!(queue.first(), Some(1));
        assert_eq!(queue.last(), Some(3));
        assert_eq!(queue.size(), 3);

        assert_eq!(queue.remove(), Some(1));
        assert_eq!(queue.items(), vec![2, 3]);
    }

    #[test]
    fn empty_queue_operations_do_not_commit() {
        let queue: QueueState<u8> = QueueState::new(StateCell::detached(VecDeque::new()));
        let view = queue.read_only();

        assert_eq!(queue.remove(), None);
        queue.clear();
        assert_eq!(queue.first(), None);
        assert_eq!(view.version(), 0);
    }
}
