//! State Hooks
//!
//! Small specialisations of the state cell, each declared through a
//! `Scope::use_*` method:
//!
//! - `use_counter`: integer clamped to optional bounds
//! - `use_toggle`: boolean flag
//! - `use_list`, `use_queue`: vector and FIFO state
//! - `use_set`: insertion-ordered set exposed as immutable snapshots
//! - `use_previous`: the value before the last change
//! - `use_debounce`, `use_throttle`: timer-delayed views of another cell
//! - `use_subscription`: state fed by an external event source
//!
//! Undo/redo history lives in [`crate::history`].

mod counter;
mod list;
mod previous;
mod queue;
mod set;
mod subscription;
mod timing;
mod toggle;

pub use counter::{Counter, CounterBounds};
pub use list::ListState;
pub use previous::PreviousTracker;
pub use queue::QueueState;
pub use set::{SetSnapshot, SetState};
pub use subscription::{Emitter, EventSource, Listener, Subscription};
pub use timing::Throttle;
pub use toggle::Toggle;
