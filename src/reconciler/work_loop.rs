//! Work loop - Depth-first render pass followed by commit.
//!
//! ```text
//! perform_unit_of_work(fiber)
//!   begin_work ──child──> descend
//!        │ none
//!        ▼
//!   complete_unit_of_work ──sibling──> perform_unit_of_work(sibling)
//!        │ none
//!        ▼
//!   complete the parent, and so on until the root is complete
//! ```

use std::rc::Weak;

use crate::element::Props;
use crate::error::RenderError;
use crate::fiber::{FiberArena, FiberId, WorkTag};
use crate::host::HostConfig;

use super::begin_work::begin_work;
use super::commit_work::commit_root;
use super::complete_work::complete_work;
use super::root::FiberRoot;
use super::Schedule;

/// Render `root` from its HostRoot and commit the result.
///
/// On error nothing is committed: fibers allocated by the pass are freed and
/// the committed tree stays as it was.
#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn perform_sync_work_on_root<H: HostConfig>(
    root: &mut FiberRoot<H>,
    scheduler: &Weak<dyn Schedule>,
) -> Result<(), RenderError> {
    root.fibers.begin_pass();

    match render_root(root, scheduler) {
        Ok(finished_work) => {
            root.fibers.finish_pass();
            root.finished_work = Some(finished_work);
            commit_root(root);
            Ok(())
        }
        Err(err) => {
            tracing::warn!(%err, "render aborted");
            root.fibers.abort_pass();
            root.finished_work = None;
            restore_committed_props(root);
            Err(err)
        }
    }
}

/// Point every host instance of the current tree back at its committed props.
///
/// `complete_work` stores new props on reused instances during render, so an
/// aborted pass would otherwise leave them holding callbacks that never committed.
fn restore_committed_props<H: HostConfig>(root: &mut FiberRoot<H>) {
    let mut stack = vec![root.current];
    while let Some(id) = stack.pop() {
        let fiber = &root.fibers[id];
        if fiber.tag == WorkTag::HostComponent {
            if let (Some(instance), Some(props)) = (&fiber.state_node, &fiber.memoized_props) {
                root.host.update_fiber_props(instance, props);
            }
        }
        stack.extend(fiber.sibling);
        stack.extend(fiber.child);
    }
}

/// Run the render phase and return the finished HostRoot fiber.
pub(crate) fn render_root<H: HostConfig>(
    root: &mut FiberRoot<H>,
    scheduler: &Weak<dyn Schedule>,
) -> Result<FiberId, RenderError> {
    let work_in_progress_root = prepare_fresh_stack(root);

    let mut work_in_progress = Some(work_in_progress_root);
    while let Some(fiber) = work_in_progress {
        work_in_progress = perform_unit_of_work(root, fiber, scheduler)?;
    }

    Ok(work_in_progress_root)
}

fn prepare_fresh_stack<H: HostConfig>(root: &mut FiberRoot<H>) -> FiberId {
    root.fibers.create_work_in_progress(root.current, Props::new())
}

fn perform_unit_of_work<H: HostConfig>(
    root: &mut FiberRoot<H>,
    fiber: FiberId,
    scheduler: &Weak<dyn Schedule>,
) -> Result<Option<FiberId>, RenderError> {
    let next = begin_work(&mut root.fibers, fiber, scheduler)?;

    let unit = &mut root.fibers[fiber];
    unit.memoized_props = Some(unit.pending_props.clone());

    Ok(match next {
        Some(child) => Some(child),
        None => complete_unit_of_work(root, fiber),
    })
}

/// Complete `fiber` and its ancestors until one has an unvisited sibling.
fn complete_unit_of_work<H: HostConfig>(root: &mut FiberRoot<H>, fiber: FiberId) -> Option<FiberId> {
    let mut node = fiber;
    loop {
        complete_work(&mut root.host, &mut root.fibers, node);

        let completed = &root.fibers[node];
        if let Some(sibling) = completed.sibling {
            return Some(sibling);
        }
        node = completed.return_fiber?;
    }
}

/// HostRoot above `fiber`, or `None` when `fiber` is no longer mounted.
pub(crate) fn mark_update_from_fiber_to_root<N: Clone>(
    fibers: &FiberArena<N>,
    fiber: FiberId,
) -> Option<FiberId> {
    let mut node = fiber;
    loop {
        let current = fibers.get(node)?;
        match current.return_fiber {
            Some(parent) => node = parent,
            None if current.tag == WorkTag::HostRoot => return Some(node),
            None => return None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
