//! Bounded counter.
//!
//! Construction is strict: a starting value outside the bounds is an error
//! and no slot is created. Mutation is lenient: every result is clamped into
//! the bounds, and a mutation that lands on the current value commits
//! nothing.

use crate::error::{HookError, Result};
use crate::scope::{Invalidator, Scope};
use crate::state::{ReadState, StateCell};

/// Optional inclusive bounds for a [`Counter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterBounds {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl CounterBounds {
    /// No bounds at all.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: i64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(max: i64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Whether `value` lies within the bounds.
    pub fn contains(&self, value: i64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }

    /// Pull `value` into the bounds.
    pub fn clamp(&self, value: i64) -> i64 {
        let value = self.max.map_or(value, |max| value.min(max));
        self.min.map_or(value, |min| value.max(min))
    }
}

/// An integer counter kept within [`CounterBounds`].
#[derive(Debug, Clone)]
pub struct Counter {
    cell: StateCell<i64>,
    start: i64,
    bounds: CounterBounds,
}

impl Counter {
    /// Create a counter, rejecting a start value outside `bounds`.
    pub fn new(start: i64, bounds: CounterBounds, invalidator: Invalidator) -> Result<Self> {
        if !bounds.contains(start) {
            return Err(HookError::CounterOutOfBounds {
                start,
                min: bounds.min,
                max: bounds.max,
            });
        }

        Ok(Self {
            cell: StateCell::new(start, invalidator),
            start,
            bounds,
        })
    }

    pub fn get(&self) -> i64 {
        self.cell.get()
    }

    pub fn bounds(&self) -> CounterBounds {
        self.bounds
    }

    pub fn read_only(&self) -> ReadState<i64> {
        self.cell.read_only()
    }

    pub fn increment(&self) {
        self.increment_by(1);
    }

    pub fn decrement(&self) {
        self.decrement_by(1);
    }

    pub fn increment_by(&self, step: i64) {
        self.commit(|count| count.saturating_add(step));
    }

    pub fn decrement_by(&self, step: i64) {
        self.commit(|count| count.saturating_sub(step));
    }

    /// Set the count, clamped into the bounds.
    pub fn set(&self, value: i64) {
        self.commit(|_| value);
    }

    /// Go back to the starting value.
    pub fn reset(&self) {
        self.commit(|_| self.start);
    }

    fn commit<F>(&self, next: F)
    where
        F: FnOnce(i64) -> i64,
    {
        let bounds = self.bounds;
        self.cell.modify(|count| {
            let value = bounds.clamp(next(*count));
            if value == *count {
                return false;
            }
            *count = value;
            true
        });
    }
}

impl Scope {
    /// Declare a bounded counter.
    ///
    /// Fails with [`HookError::CounterOutOfBounds`] on the first render if
    /// `start` lies outside `bounds`.
    pub fn use_counter(&self, start: i64, bounds: CounterBounds) -> Result<Counter> {
        self.use_hook(|cx| Counter::new(start, bounds, cx.invalidator()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(start: i64, bounds: CounterBounds) -> Counter {
        Counter::new(start, bounds, Invalidator::noop()).unwrap()
    }

    #[test]
    fn start_outside_bounds_is_rejected() {
        let scope = Scope::detached();

        let below = scope.render(|scope| scope.use_counter(-1, CounterBounds::at_least(0)));
        assert!(matches!(
            below,
            Err(HookError::CounterOutOfBounds { start: -1, min: Some(0), max: None })
        ));

        let above = scope.render(|scope| scope.use_counter(11, CounterBounds::new(0, 10)));
        assert!(matches!(above, Err(HookError::CounterOutOfBounds { start: 11, .. })));

        assert_eq!(scope.hook_count(), 0);
    }

    #[test]
    fn increment_stops_at_max() {
        let counter = counter(9, CounterBounds::new(0, 10));
        counter.increment();
        assert_eq!(counter.get(), 10);

        counter.increment();
        assert_eq!(counter.get(), 10);
    }

    #[test]
    fn decrement_stops_at_min() {
        let counter = counter(1, CounterBounds::at_least(0));
        counter.decrement();
        counter.decrement();
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn set_and_steps_are_clamped() {
        let counter = counter(5, CounterBounds::new(0, 10));

        counter.set(42);
        assert_eq!(counter.get(), 10);

        counter.set(-42);
        assert_eq!(counter.get(), 0);

        counter.increment_by(7);
        assert_eq!(counter.get(), 7);

        counter.decrement_by(100);
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn reset_restores_start() {
        let counter = counter(3, CounterBounds::unbounded());
        counter.increment_by(10);
        counter.reset();
        assert_eq!(counter.get(), 3);
    }

    #[test]
    fn unchanged_value_does_not_commit() {
        let counter = counter(10, CounterBounds::at_most(10));
        let view = counter.read_only();

        counter.increment();
        assert_eq!(view.version(), 0);

        counter.decrement();
        assert_eq!(view.version(), 1);
    }

    #[test]
    fn unbounded_counter_saturates() {
        let counter = counter(i64::MAX - 1, CounterBounds::unbounded());
        counter.increment_by(5);
        assert_eq!(counter.get(), i64::MAX);
    }
}
