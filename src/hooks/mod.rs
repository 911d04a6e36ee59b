//! Hooks - State that survives re-renders of a function component.
//!
//! Hooks may only be called from a component body, unconditionally, and in
//! the same order on every render: records are matched by call position.

mod context;
mod state;

pub use context::{is_rendering, Hook};
pub(crate) use context::render_with_hooks;
pub use state::{use_state, use_state_with, Dispatch};
