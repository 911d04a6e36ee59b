//! Root - A mounted tree and the handle that drives it.
//!
//! ```ignore
//! let mut host = MemoryHost::new();
//! let container = host.create_container();
//! let root = create_container(host, container);
//!
//! update_container(Element::host("p").child("hello"), &root)?;
//! assert_eq!(root.with_host(|h| h.to_markup(container)), "<p>hello</p>");
//! ```
//!
//! # Re-entrancy
//!
//! Rendering holds the root borrowed. A state update dispatched while the
//! root is rendering (from a component body, say) cannot start another
//! pass; it is queued and the root renders again right after the current
//! pass commits. The nested update limit
//! ([`ReconcilerConfig`](crate::config::ReconcilerConfig)) bounds how often
//! that may repeat.
//!
//! An update dispatched while the host is borrowed through
//! [`Root::with_host`] cannot render either; it stays queued and the
//! dispatch fails with [`RenderError::RootBorrowed`].

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::config::{config, dev_warn};
use crate::element::Node;
use crate::error::{EventError, RenderError};
use crate::events::{collect_paths, EventTree, SyntheticEvent};
use crate::fiber::{FiberArena, FiberId, RootQueue};
use crate::host::HostConfig;
use crate::update_queue::{create_update, create_update_queue, enqueue_update, Action};

use super::work_loop::{mark_update_from_fiber_to_root, perform_sync_work_on_root};
use super::Schedule;

// =============================================================================
// Fiber Root
// =============================================================================

/// State of one mounted tree.
pub(crate) struct FiberRoot<H: HostConfig> {
    pub(crate) host: H,
    pub(crate) container: H::Node,
    /// Committed HostRoot fiber.
    pub(crate) current: FiberId,
    /// HostRoot of a rendered tree waiting for commit.
    pub(crate) finished_work: Option<FiberId>,
    pub(crate) fibers: FiberArena<H::Node>,
    /// Pending root element, shared by both HostRoot fibers.
    pub(crate) root_queue: RootQueue,
}

impl<H: HostConfig> FiberRoot<H> {
    pub(crate) fn new(host: H, container: H::Node) -> Self {
        let mut fibers = FiberArena::new();
        let current = fibers.create_host_root_fiber();
        let root_queue = create_update_queue::<Node>();
        fibers[current].update_queue = Some(root_queue.clone());

        Self {
            host,
            container,
            current,
            finished_work: None,
            fibers,
            root_queue,
        }
    }
}

// =============================================================================
// Root Cell
// =============================================================================

struct RootCell<H: HostConfig> {
    root: RefCell<FiberRoot<H>>,
    root_queue: RootQueue,
    rendering: Cell<bool>,
    rerender_pending: Cell<bool>,
    this: Weak<RootCell<H>>,
}

/// Marks a root as rendering until dropped, unwinding included.
struct RenderingScope<'a>(&'a Cell<bool>);

impl<'a> RenderingScope<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for RenderingScope<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<H: HostConfig + 'static> RootCell<H> {
    /// Render now, or after the in-flight pass if the root is busy.
    ///
    /// `fiber` is the fiber that requested the update (`None` for the root
    /// itself); updates for fibers that are gone are dropped.
    fn schedule(&self, fiber: Option<FiberId>) -> Result<(), RenderError> {
        if self.rendering.get() {
            tracing::debug!("update scheduled while rendering; deferred");
            self.rerender_pending.set(true);
            return Ok(());
        }
        let Ok(mut root) = self.root.try_borrow_mut() else {
            tracing::warn!("update scheduled while the host is borrowed");
            return Err(RenderError::RootBorrowed);
        };

        if let Some(fiber) = fiber {
            if mark_update_from_fiber_to_root(&root.fibers, fiber).is_none() {
                dev_warn!(?fiber, "state update on an unmounted component ignored");
                return Ok(());
            }
        }

        self.perform_work(&mut root)
    }

    fn perform_work(&self, root: &mut FiberRoot<H>) -> Result<(), RenderError> {
        let scheduler: Weak<dyn Schedule> = self.this.clone();
        let limit = config().nested_update_limit;
        let mut nested = 0;
        let _rendering = RenderingScope::enter(&self.rendering);

        loop {
            self.rerender_pending.set(false);
            if let Err(err) = perform_sync_work_on_root(root, &scheduler) {
                self.rerender_pending.set(false);
                return Err(err);
            }
            if !self.rerender_pending.get() {
                return Ok(());
            }

            nested += 1;
            if nested > limit {
                self.rerender_pending.set(false);
                tracing::warn!(limit, "too many nested updates");
                return Err(RenderError::TooManyRerenders { limit });
            }
        }
    }
}

impl<H: HostConfig + 'static> Schedule for RootCell<H> {
    fn schedule_update_on_fiber(&self, fiber: FiberId) -> Result<(), RenderError> {
        self.schedule(Some(fiber))
    }
}

// =============================================================================
// Root Handle
// =============================================================================

/// Handle to a mounted tree.
///
/// Dropping the last handle unmounts nothing on the host but makes every
/// outstanding [`Dispatch`](crate::hooks::Dispatch) fail with
/// [`RenderError::RootUnmounted`].
pub struct Root<H: HostConfig + 'static> {
    cell: Rc<RootCell<H>>,
}

impl<H: HostConfig + 'static> Clone for Root<H> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

/// Create a root rendering into `container`.
pub fn create_container<H: HostConfig + 'static>(host: H, container: H::Node) -> Root<H> {
    let fiber_root = FiberRoot::new(host, container);
    let root_queue = fiber_root.root_queue.clone();

    let cell = Rc::new_cyclic(|this| RootCell {
        root: RefCell::new(fiber_root),
        root_queue,
        rendering: Cell::new(false),
        rerender_pending: Cell::new(false),
        this: this.clone(),
    });

    Root { cell }
}

/// Render `element` into `root` synchronously and return it.
///
/// Pass [`Node::Empty`] to clear the container.
pub fn update_container<H: HostConfig + 'static>(
    element: impl Into<Node>,
    root: &Root<H>,
) -> Result<Node, RenderError> {
    let element = element.into();
    enqueue_update(
        &root.cell.root_queue,
        create_update(Action::Replace(element.clone())),
    );
    root.cell.schedule(None)?;
    Ok(element)
}

impl<H: HostConfig + 'static> Root<H> {
    /// Same as [`update_container`].
    pub fn render(&self, element: impl Into<Node>) -> Result<Node, RenderError> {
        update_container(element, self)
    }

    /// Container this root renders into.
    pub fn container(&self) -> H::Node {
        self.cell.root.borrow().container.clone()
    }

    /// Read the host.
    ///
    /// State updates dispatched from `f` fail with
    /// [`RenderError::RootBorrowed`] and render later.
    ///
    /// # Panics
    ///
    /// If called while this root is rendering.
    pub fn with_host<R>(&self, f: impl FnOnce(&H) -> R) -> R {
        f(&self.cell.root.borrow().host)
    }

    /// Mutate the host, e.g. to clear its operation log.
    ///
    /// # Panics
    ///
    /// If called while this root is rendering.
    pub fn with_host_mut<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(&mut self.cell.root.borrow_mut().host)
    }

    /// Number of live fibers, both generations.
    pub fn fiber_count(&self) -> usize {
        self.cell.root.borrow().fibers.len()
    }

    /// Whether a render of this root is in progress.
    pub fn is_rendering(&self) -> bool {
        self.cell.rendering.get()
    }
}

impl<H> Root<H>
where
    H: HostConfig + EventTree<Node = <H as HostConfig>::Node> + 'static,
{
    /// Dispatch a synthetic event at `target`.
    ///
    /// Callbacks run after the root borrow is released, so they may update
    /// state.
    pub fn dispatch_event(
        &self,
        target: <H as HostConfig>::Node,
        event_type: &str,
    ) -> Result<SyntheticEvent, EventError> {
        let paths = {
            let root = self.cell.root.borrow();
            collect_paths(&root.host, &root.container, &target, event_type)?
        };
        let event = SyntheticEvent::new(event_type);
        paths.dispatch(&event);
        Ok(event)
    }
}
