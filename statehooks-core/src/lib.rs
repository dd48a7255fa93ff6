//! Statehooks Core
//!
//! This crate provides reactive state for component-based UIs. It
//! implements:
//!
//! - Scopes that own hook state and request re-renders
//! - State cells with explicit replace, merge, and transform updates
//! - Undo/redo history with replayable transitions
//! - Derived hooks (counter, toggle, list, queue, set, previous value,
//!   debounce, throttle, external subscriptions)
//!
//! The crate is designed to be used both as a native Rust library and, with
//! the `python` feature, as a Python extension module via PyO3.
//!
//! # Architecture
//!
//! - `scope`: per-component hook arenas, invalidation, and a host runtime
//! - `state`: the state cell every hook is built on
//! - `history`: undo/redo history
//! - `hooks`: specialised hooks declared through `Scope::use_*`
//!
//! # Example
//!
//! ```rust
//! use statehooks_core::scope::Runtime;
//! use statehooks_core::hooks::CounterBounds;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut runtime = Runtime::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let log = seen.clone();
//!
//! let id = runtime.mount(move |scope| {
//!     let counter = scope.use_counter(0, CounterBounds::new(0, 2))?;
//!     log.borrow_mut().push(counter.get());
//!     if counter.get() < 2 {
//!         counter.increment();
//!     }
//!     Ok(())
//! })?;
//!
//! runtime.flush()?;
//! assert_eq!(*seen.borrow(), vec![0, 1, 2]);
//! assert_eq!(runtime.render_count(id), Some(3));
//! # Ok::<(), statehooks_core::HookError>(())
//! ```

pub mod error;
pub mod history;
pub mod hooks;
pub mod scope;
pub mod state;

#[cfg(feature = "python")]
mod python;

pub use error::{HookError, Result};
pub use history::{History, HistoryAction, HistoryCell};
pub use scope::{Runtime, RuntimeConfig, Scope, ScopeId};
pub use state::{Merge, ReadState, StateCell, Update};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition.
///
/// This function is called by Python when importing the module.
/// It registers all Python-exposed types.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyStateCell>()?;
    m.add_class::<python::PyHistory>()?;

    // Add version info
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
