//! Update queue - Single-slot pending state updates.
//!
//! A queue holds at most one pending update. Enqueueing while one is
//! pending replaces it (last write wins); the next render consumes it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Action / Update
// =============================================================================

/// Next state, given literally or computed from the previous state.
pub enum Action<S> {
    Replace(S),
    Reduce(Box<dyn FnOnce(&S) -> S>),
}

impl<S> Action<S> {
    /// Action computing the next state from the previous one.
    pub fn reduce(f: impl FnOnce(&S) -> S + 'static) -> Self {
        Action::Reduce(Box::new(f))
    }

    /// Apply to `prev`.
    pub fn apply(self, prev: S) -> S {
        match self {
            Action::Replace(next) => next,
            Action::Reduce(f) => f(&prev),
        }
    }
}

impl<S> From<S> for Action<S> {
    fn from(value: S) -> Self {
        Action::Replace(value)
    }
}

impl<S> fmt::Debug for Action<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Replace(_) => write!(f, "Action::Replace(..)"),
            Action::Reduce(_) => write!(f, "Action::Reduce(..)"),
        }
    }
}

/// One state update.
#[derive(Debug)]
pub struct Update<S> {
    pub action: Action<S>,
}

/// The pending slot.
#[derive(Debug)]
pub struct SharedPending<S> {
    pub pending: Option<Update<S>>,
}

/// Per-fiber (or per-hook) queue.
#[derive(Debug)]
pub struct UpdateQueue<S> {
    pub shared: SharedPending<S>,
}

/// Queue shared between a hook record, its dispatch handle, and the
/// record's copy in the next render.
pub type SharedQueue<S> = Rc<RefCell<UpdateQueue<S>>>;

// =============================================================================
// Operations
// =============================================================================

pub fn create_update<S>(action: Action<S>) -> Update<S> {
    Update { action }
}

pub fn create_update_queue<S>() -> SharedQueue<S> {
    Rc::new(RefCell::new(UpdateQueue {
        shared: SharedPending { pending: None },
    }))
}

/// Put `update` in the pending slot, replacing any update already there.
pub fn enqueue_update<S>(queue: &SharedQueue<S>, update: Update<S>) {
    let replaced = queue.borrow_mut().shared.pending.replace(update);
    if replaced.is_some() {
        tracing::trace!("pending update replaced before it was rendered");
    }
}

/// Take the pending update out of the queue, leaving the slot empty.
pub fn take_pending<S>(queue: &SharedQueue<S>) -> Option<Update<S>> {
    queue.borrow_mut().shared.pending.take()
}

/// State after applying `pending` (if any) to `base_state`.
pub fn process_update_queue<S>(base_state: S, pending: Option<Update<S>>) -> S {
    match pending {
        Some(update) => update.action.apply(base_state),
        None => base_state,
    }
}

// =============================================================================
// Tests
// =============================================================================
