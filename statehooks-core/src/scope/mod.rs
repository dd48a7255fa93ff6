//! Owning Scopes
//!
//! Every cell belongs to exactly one scope: the mounted component that
//! created it. This module provides the scope arena that stores hook
//! handles by call position, the invalidation handle cells use to request a
//! re-render, and a small host runtime that batches those requests.
//!
//! # Concepts
//!
//! ## Scope
//!
//! A per-component arena. Hooks are looked up by the order in which they are
//! called during a render, so a component must call the same hooks in the
//! same order every time it renders.
//!
//! ## Invalidator
//!
//! The binding between a cell and its host. Committing a value calls
//! `invalidate`, which forwards the scope's ID to whatever sink the host
//! installed. After teardown the invalidator goes quiet.
//!
//! ## Runtime
//!
//! A host that mounts scopes, queues invalidated ones, and re-renders them
//! on `flush`. Embedders with their own scheduler can skip it and build
//! scopes directly with `Scope::new`.

mod arena;
mod id;
mod runtime;

pub use arena::{HookContext, Scope};
pub use id::{Invalidator, ScopeId, SubscriberId};
pub use runtime::{Runtime, RuntimeConfig};
