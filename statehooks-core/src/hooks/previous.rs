//! Previous distinct value tracking.

use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::scope::Scope;

#[derive(Debug)]
struct Tracked<T> {
    current: T,
    previous: Option<T>,
}

/// Remembers the value before the most recent change.
#[derive(Debug, Clone)]
pub struct PreviousTracker<T> {
    tracked: Arc<Mutex<Tracked<T>>>,
}

impl<T> PreviousTracker<T>
where
    T: Clone + PartialEq,
{
    pub fn new(initial: T) -> Self {
        Self {
            tracked: Arc::new(Mutex::new(Tracked {
                current: initial,
                previous: None,
            })),
        }
    }

    /// Feed the latest value and get the one before the last change.
    pub fn observe(&self, value: T) -> Option<T> {
        let mut tracked = self.tracked.lock();
        if tracked.current != value {
            let old = mem::replace(&mut tracked.current, value);
            tracked.previous = Some(old);
        }
        tracked.previous.clone()
    }
}

impl Scope {
    /// The value `value` had before it last changed, across renders.
    ///
    /// `None` until the value changes for the first time. Does not request
    /// any renders itself.
    pub fn use_previous<T>(&self, value: T) -> Result<Option<T>>
    where
        T: Clone + PartialEq + Send + Sync + 'static,
    {
        let seed = value.clone();
        let tracker = self.use_hook(|_| Ok(PreviousTracker::new(seed)))?;
        Ok(tracker.observe(value))
    }
}
