//! Error types.

use thiserror::Error;

/// Errors raised while rendering or while dispatching state updates.
///
/// Any of these escaping the render phase aborts the pass: the
/// work-in-progress tree is thrown away and nothing is committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A hook was called outside the body of a function component.
    #[error(
        "invalid hook call: hooks can only be called inside the body of a function component"
    )]
    InvalidHookCall,

    /// A component called a different number of hooks than on its previous render.
    #[error("component rendered {rendered} hooks, but {expected} were recorded on the previous render")]
    HookCountMismatch { expected: usize, rendered: usize },

    /// The hook at `index` was created with a different state type.
    #[error("hook #{index} holds a different state type than requested")]
    HookStateMismatch { index: usize },

    /// A component reported its own failure.
    #[error("component `{component}` failed: {message}")]
    Component { component: String, message: String },

    /// Updates dispatched during render kept scheduling more renders.
    #[error("too many re-renders: gave up after {limit} nested updates")]
    TooManyRerenders { limit: usize },

    /// The root is borrowed through `Root::with_host` or `Root::with_host_mut`.
    /// The update stays queued and is applied by the next render.
    #[error("state update dispatched while the root's host is borrowed")]
    RootBorrowed,

    /// The root that owned the dispatching hook has been dropped.
    #[error("state update dispatched to a root that no longer exists")]
    RootUnmounted,
}

impl RenderError {
    /// Build a [`RenderError::Component`] from inside a component body.
    pub fn component(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by the synthetic event layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// No callback props are mapped for this event type.
    #[error("unsupported event type `{0}`")]
    UnsupportedEventType(String),
}
