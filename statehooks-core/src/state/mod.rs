//! Reactive State
//!
//! The state cell is the single primitive every hook in this crate is
//! built from.
//!
//! # Update Forms
//!
//! A caller picks one of three update forms explicitly:
//!
//! - `Replace(value)` stores `value` as is.
//! - `Merge(patch)` overwrites the fields named by `patch` and keeps the rest.
//!   Only types implementing [`Merge`] accept patches.
//! - `Transform(f)` stores `f(current)`.
//!
//! The convenience methods `set`, `merge`, and `update` map onto these forms
//! one to one; `apply` takes the tagged [`Update`] value directly.

mod cell;
mod update;

pub use cell::{ReadState, StateCell};
pub use update::{Merge, Transform, Update};
