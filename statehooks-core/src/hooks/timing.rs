//! Debounced and throttled views of a cell.
//!
//! Both hooks watch a source cell and mirror it into a cell of their own,
//! delaying commits with timers on the ambient tokio runtime. Watchers and
//! pending timers are released when the owning scope is torn down.
//!
//! The source and timing given on the first render are the ones used for
//! the scope's lifetime; later renders return the same view.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

use crate::error::{HookError, Result};
use crate::scope::{HookContext, Scope, SubscriberId};
use crate::state::{ReadState, StateCell};

/// Rate gate that opens at most once per interval.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Pass through the gate at `now` if a full interval has elapsed since
    /// the last pass. Otherwise reports how long until it reopens.
    pub fn try_acquire(&self, now: Instant) -> std::result::Result<(), Duration> {
        let mut last = self.last.lock();
        if let Some(at) = *last {
            let elapsed = now.saturating_duration_since(at);
            if elapsed < self.interval {
                return Err(self.interval - elapsed);
            }
        }
        *last = Some(now);
        Ok(())
    }

    /// Record a pass at `now` unconditionally.
    pub fn mark(&self, now: Instant) {
        *self.last.lock() = Some(now);
    }
}

/// The single timer a hook may have outstanding.
type PendingTask = Arc<Mutex<Option<JoinHandle<()>>>>;

fn replace_pending(pending: &PendingTask, task: Option<JoinHandle<()>>) {
    let previous = std::mem::replace(&mut *pending.lock(), task);
    if let Some(previous) = previous {
        previous.abort();
    }
}

fn current_runtime() -> Result<Handle> {
    Handle::try_current().map_err(|_| HookError::NoAsyncRuntime)
}

/// Unsubscribe from `source` and cancel the pending timer on teardown.
fn release_on_cleanup<T>(
    cx: &HookContext<'_>,
    source: &ReadState<T>,
    subscriber_id: SubscriberId,
    pending: PendingTask,
) where
    T: Clone + Send + Sync + 'static,
{
    let source = source.clone();
    cx.on_cleanup(move || {
        source.unsubscribe(subscriber_id);
        replace_pending(&pending, None);
    });
}

impl Scope {
    /// A view of `source` that only updates after `delay` without changes.
    pub fn use_debounce<T>(&self, source: &ReadState<T>, delay: Duration) -> Result<ReadState<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.use_hook(|cx| {
            let runtime = current_runtime()?;
            let output = StateCell::new(source.get(), cx.invalidator());
            let pending = PendingTask::default();
            let subscriber_id = SubscriberId::new();

            let target = output.clone();
            let timer = Arc::clone(&pending);
            source.subscribe(subscriber_id, move |value: &T| {
                let value = value.clone();
                let target = target.clone();
                let task = runtime.spawn(async move {
                    sleep(delay).await;
                    target.set(value);
                });
                replace_pending(&timer, Some(task));
            });

            release_on_cleanup(cx, source, subscriber_id, pending);
            Ok(output.read_only())
        })
    }

    /// A view of `source` that updates at most once per `interval`.
    ///
    /// A change inside the interval is held back and committed when the
    /// interval ends, unless a newer change replaces it first.
    pub fn use_throttle<T>(&self, source: &ReadState<T>, interval: Duration) -> Result<ReadState<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.use_hook(|cx| {
            let runtime = current_runtime()?;
            let output = StateCell::new(source.get(), cx.invalidator());
            let gate = Arc::new(Throttle::new(interval));
            let pending = PendingTask::default();
            let subscriber_id = SubscriberId::new();

            let target = output.clone();
            let trailing = Arc::clone(&pending);
            source.subscribe(subscriber_id, move |value: &T| {
                replace_pending(&trailing, None);

                match gate.try_acquire(Instant::now()) {
                    Ok(()) => target.set(value.clone()),
                    Err(remaining) => {
                        let value = value.clone();
                        let target = target.clone();
                        let gate = Arc::clone(&gate);
                        let task = runtime.spawn(async move {
                            sleep(remaining).await;
                            gate.mark(Instant::now());
                            target.set(value);
                        });
                        replace_pending(&trailing, Some(task));
                    }
                }
            });

            release_on_cleanup(cx, source, subscriber_id, pending);
            Ok(output.read_only())
        })
    }
}
