//! Render context - Hook bookkeeping for the component being rendered.
//!
//! Component bodies are plain function calls, so hooks find their fiber
//! through a thread-local context. [`render_with_hooks`] installs it for the
//! duration of one component call and a guard restores the previous value
//! on every exit path, including panics.
//!
//! # Positional identity
//!
//! The Nth hook call of a render is the Nth record of the previous render.
//! In update mode each call takes the next record from `current_hooks` and
//! pushes its successor onto `work_in_progress_hooks`.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::element::{Component, Node, Props};
use crate::error::RenderError;
use crate::fiber::FiberId;
use crate::reconciler::Schedule;

// =============================================================================
// Hook Record
// =============================================================================

/// One hook's persistent slot.
#[derive(Clone)]
pub struct Hook {
    /// Fiber the hook was mounted on. Lives until the position is deleted.
    pub(crate) fiber: FiberId,
    pub(crate) memoized_state: Rc<dyn Any>,
    pub(crate) update_queue: Rc<dyn Any>,
}

impl Hook {
    pub(crate) fn new(
        fiber: FiberId,
        memoized_state: Rc<dyn Any>,
        update_queue: Rc<dyn Any>,
    ) -> Self {
        Self {
            fiber,
            memoized_state,
            update_queue,
        }
    }

    /// Memoized state, if it has type `S`.
    pub fn state<S: 'static>(&self) -> Option<&S> {
        self.memoized_state.downcast_ref()
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook").finish_non_exhaustive()
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Which hook implementations are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dispatcher {
    /// First render of the fiber: allocate records.
    OnMount,
    /// Later renders: walk the previous records.
    OnUpdate,
}

pub(crate) struct RenderContext {
    pub(crate) fiber: FiberId,
    pub(crate) dispatcher: Dispatcher,
    current_hooks: Vec<Hook>,
    cursor: usize,
    work_in_progress_hooks: Vec<Hook>,
    pub(crate) scheduler: Weak<dyn Schedule>,
}

impl RenderContext {
    /// Append a freshly mounted record.
    pub(crate) fn mount_work_in_progress_hook(&mut self, hook: Hook) {
        self.work_in_progress_hooks.push(hook);
    }

    /// Next record of the previous render, with its position.
    pub(crate) fn next_current_hook(&mut self) -> Result<(Hook, usize), RenderError> {
        let index = self.cursor;
        let hook = self
            .current_hooks
            .get(index)
            .cloned()
            .ok_or(RenderError::HookCountMismatch {
                expected: self.current_hooks.len(),
                rendered: index + 1,
            })?;
        self.cursor += 1;
        Ok((hook, index))
    }

    /// Append the successor of a record taken with [`Self::next_current_hook`].
    pub(crate) fn update_work_in_progress_hook(&mut self, hook: Hook) {
        self.work_in_progress_hooks.push(hook);
    }
}

thread_local! {
    static CURRENTLY_RENDERING: RefCell<Option<RenderContext>> = const { RefCell::new(None) };
}

/// Run `f` against the active context.
///
/// `f` must not call back into user code.
pub(crate) fn with_context<R>(f: impl FnOnce(&mut RenderContext) -> R) -> Result<R, RenderError> {
    CURRENTLY_RENDERING.with(|slot| {
        let mut slot = slot.borrow_mut();
        let context = slot.as_mut().ok_or(RenderError::InvalidHookCall)?;
        Ok(f(context))
    })
}

/// Active dispatcher, or an invalid-hook-call error outside of render.
pub(crate) fn resolve_dispatcher() -> Result<Dispatcher, RenderError> {
    with_context(|context| context.dispatcher)
}

/// Whether a component body is executing on this thread.
pub fn is_rendering() -> bool {
    CURRENTLY_RENDERING.with(|slot| slot.borrow().is_some())
}

// =============================================================================
// Render Guard
// =============================================================================

/// Installs a context and restores the previous one when dropped.
///
/// Keeping the previous context lets a component synchronously render a
/// different root without clobbering its own hooks.
struct RenderGuard {
    previous: Option<Option<RenderContext>>,
}

impl RenderGuard {
    fn enter(context: RenderContext) -> Self {
        let previous = CURRENTLY_RENDERING.with(|slot| slot.borrow_mut().replace(context));
        Self {
            previous: Some(previous),
        }
    }

    /// Take the context back out and restore the previous one.
    fn finish(mut self) -> Option<RenderContext> {
        let previous = self.previous.take().flatten();
        CURRENTLY_RENDERING.with(|slot| std::mem::replace(&mut *slot.borrow_mut(), previous))
    }
}

impl Drop for RenderGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            let _ = CURRENTLY_RENDERING.try_with(|slot| *slot.borrow_mut() = previous);
        }
    }
}

// =============================================================================
// Render With Hooks
// =============================================================================

/// Call a function component with hooks wired to `fiber`.
///
/// `previous` holds the records of the committed render (`None` on mount).
/// Returns the rendered children and the new record list.
pub(crate) fn render_with_hooks(
    fiber: FiberId,
    component: &Component,
    props: &Props,
    previous: Option<Vec<Hook>>,
    scheduler: Weak<dyn Schedule>,
) -> Result<(Node, Vec<Hook>), RenderError> {
    let _span = tracing::trace_span!("render_with_hooks", component = component.name()).entered();

    let dispatcher = match previous {
        Some(_) => Dispatcher::OnUpdate,
        None => Dispatcher::OnMount,
    };
    let guard = RenderGuard::enter(RenderContext {
        fiber,
        dispatcher,
        current_hooks: previous.unwrap_or_default(),
        cursor: 0,
        work_in_progress_hooks: Vec::new(),
        scheduler,
    });

    let children = component.render(props);
    let context = guard.finish().ok_or(RenderError::InvalidHookCall)?;
    let children = children?;

    if context.dispatcher == Dispatcher::OnUpdate && context.cursor != context.current_hooks.len() {
        return Err(RenderError::HookCountMismatch {
            expected: context.current_hooks.len(),
            rendered: context.cursor,
        });
    }

    Ok((children, context.work_in_progress_hooks))
}

// =============================================================================
// Tests
// =============================================================================
