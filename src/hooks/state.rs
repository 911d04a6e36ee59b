//! State hook.
//!
//! ```ignore
//! let counter = Component::new("Counter", |_| {
//!     let (count, set_count) = use_state(0)?;
//!     Ok(Element::host("button")
//!         .on("onClick", move |_| {
//!             let _ = set_count.update(|n| n + 1);
//!         })
//!         .child(count)
//!         .into())
//! });
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::RenderError;
use crate::fiber::FiberId;
use crate::reconciler::Schedule;
use crate::update_queue::{
    create_update, create_update_queue, enqueue_update, process_update_queue, take_pending, Action,
    SharedQueue, UpdateQueue,
};

use super::context::{resolve_dispatcher, with_context, Dispatcher, Hook};

// =============================================================================
// Dispatch
// =============================================================================

/// Handle for updating one `use_state` slot.
///
/// Callable from anywhere (event callbacks included). Every call enqueues
/// the update and synchronously re-renders the owning root.
pub struct Dispatch<S> {
    fiber: FiberId,
    queue: SharedQueue<S>,
    scheduler: Weak<dyn Schedule>,
}

impl<S> Clone for Dispatch<S> {
    fn clone(&self) -> Self {
        Self {
            fiber: self.fiber,
            queue: self.queue.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<S> PartialEq for Dispatch<S> {
    /// Handles from different renders of the same slot are equal.
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.queue, &other.queue)
    }
}

impl<S> fmt::Debug for Dispatch<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch").field("fiber", &self.fiber).finish_non_exhaustive()
    }
}

impl<S: 'static> Dispatch<S> {
    /// Enqueue `action` (replacing any update not rendered yet) and re-render.
    pub fn dispatch(&self, action: Action<S>) -> Result<(), RenderError> {
        enqueue_update(&self.queue, create_update(action));
        let scheduler = self.scheduler.upgrade().ok_or(RenderError::RootUnmounted)?;
        scheduler.schedule_update_on_fiber(self.fiber)
    }

    /// Replace the state.
    pub fn set(&self, value: S) -> Result<(), RenderError> {
        self.dispatch(Action::Replace(value))
    }

    /// Compute the next state from the previous one.
    pub fn update(&self, f: impl FnOnce(&S) -> S + 'static) -> Result<(), RenderError> {
        self.dispatch(Action::reduce(f))
    }
}

// =============================================================================
// use_state
// =============================================================================

/// State hook with a literal initial value.
///
/// Returns the current state and its [`Dispatch`] handle. Fails with
/// [`RenderError::InvalidHookCall`] outside a component body.
pub fn use_state<S: Clone + 'static>(initial: S) -> Result<(S, Dispatch<S>), RenderError> {
    use_state_with(move || initial)
}

/// State hook whose initial value is produced on the first render only.
pub fn use_state_with<S: Clone + 'static>(
    init: impl FnOnce() -> S,
) -> Result<(S, Dispatch<S>), RenderError> {
    match resolve_dispatcher()? {
        Dispatcher::OnMount => mount_state(init),
        Dispatcher::OnUpdate => update_state(),
    }
}

fn mount_state<S: Clone + 'static>(
    init: impl FnOnce() -> S,
) -> Result<(S, Dispatch<S>), RenderError> {
    let state = init();
    let queue = create_update_queue::<S>();

    with_context(|context| {
        let dispatch = Dispatch {
            fiber: context.fiber,
            queue: queue.clone(),
            scheduler: context.scheduler.clone(),
        };
        let hook = Hook::new(context.fiber, Rc::new(state.clone()), queue);
        context.mount_work_in_progress_hook(hook);
        (state, dispatch)
    })
}

fn update_state<S: Clone + 'static>() -> Result<(S, Dispatch<S>), RenderError> {
    let (hook, index) = with_context(|context| context.next_current_hook())??;

    let queue = hook
        .update_queue
        .downcast::<RefCell<UpdateQueue<S>>>()
        .map_err(|_| RenderError::HookStateMismatch { index })?;
    let base_state = hook
        .memoized_state
        .downcast_ref::<S>()
        .ok_or(RenderError::HookStateMismatch { index })?
        .clone();

    let state = process_update_queue(base_state, take_pending(&queue));

    // Mount-time fiber: stays alive while the component is mounted.
    with_context(|context| {
        let dispatch = Dispatch {
            fiber: hook.fiber,
            queue: queue.clone(),
            scheduler: context.scheduler.clone(),
        };
        let next = Hook::new(hook.fiber, Rc::new(state.clone()), queue);
        context.update_work_in_progress_hook(next);
        (state, dispatch)
    })
}

// =============================================================================
// Tests
// =============================================================================
