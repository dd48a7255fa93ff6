//! Error types shared by every hook.
//!
//! Only construction-time validation and hook bookkeeping can fail. Steady-state
//! mutators (counter clamping, guarded undo/redo) never return errors.

use thiserror::Error;

use crate::scope::ScopeId;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HookError>;

/// Errors raised by scopes, the runtime, and hook construction.
#[derive(Debug, Error)]
pub enum HookError {
    /// A bounded counter was created with a starting value outside its bounds.
    #[error("counter start {start} is outside the configured bounds [{min:?}, {max:?}]")]
    CounterOutOfBounds {
        start: i64,
        min: Option<i64>,
        max: Option<i64>,
    },

    /// The slot at `index` holds a different hook type than the one requested.
    ///
    /// This happens when hooks are called conditionally or in a different
    /// order from one render to the next.
    #[error("hook #{index} in scope {scope} is not a {expected}")]
    HookOrderMismatch {
        scope: ScopeId,
        index: usize,
        expected: &'static str,
    },

    /// A render called a different number of hooks than the first render.
    #[error("scope {scope} rendered {found} hooks, expected {expected}")]
    HookCountChanged {
        scope: ScopeId,
        expected: usize,
        found: usize,
    },

    /// Flushing kept producing invalidations past the configured pass limit.
    #[error("render queue did not settle after {passes} passes")]
    RenderLoop { passes: usize },

    /// A timer-driven hook was created outside a tokio runtime.
    #[error("timer hooks require a running tokio runtime")]
    NoAsyncRuntime,

    /// Runtime configuration could not be parsed.
    #[error("invalid runtime configuration: {0}")]
    Config(#[from] serde_json::Error),
}
