//! Begin phase - Produce a fiber's children on the way down.

use std::rc::Weak;

use crate::element::{ElementType, Node};
use crate::error::RenderError;
use crate::fiber::{FiberArena, FiberId, MemoizedState, WorkTag};
use crate::hooks::{render_with_hooks, Hook};
use crate::update_queue::{process_update_queue, take_pending};

use super::child_fibers::ChildReconciler;
use super::Schedule;

/// Reconcile the children of `wip` and return the first one to descend into.
pub(crate) fn begin_work<N: Clone>(
    fibers: &mut FiberArena<N>,
    wip: FiberId,
    scheduler: &Weak<dyn Schedule>,
) -> Result<Option<FiberId>, RenderError> {
    match fibers[wip].tag {
        WorkTag::HostRoot => Ok(update_host_root(fibers, wip)),
        WorkTag::HostComponent => Ok(update_host_component(fibers, wip)),
        WorkTag::FunctionComponent => update_function_component(fibers, wip, scheduler),
        WorkTag::HostText => Ok(None),
    }
}

fn update_host_root<N: Clone>(fibers: &mut FiberArena<N>, wip: FiberId) -> Option<FiberId> {
    let fiber = &fibers[wip];
    let base_state = match &fiber.memoized_state {
        MemoizedState::Root(element) => element.clone(),
        _ => Node::Empty,
    };
    let pending = fiber.update_queue.as_ref().and_then(take_pending);
    let next_children = process_update_queue(base_state, pending);

    fibers[wip].memoized_state = MemoizedState::Root(next_children.clone());
    reconcile_children(fibers, wip, &next_children)
}

fn update_host_component<N: Clone>(fibers: &mut FiberArena<N>, wip: FiberId) -> Option<FiberId> {
    let next_children = fibers[wip].pending_props.children().clone();
    reconcile_children(fibers, wip, &next_children)
}

fn update_function_component<N: Clone>(
    fibers: &mut FiberArena<N>,
    wip: FiberId,
    scheduler: &Weak<dyn Schedule>,
) -> Result<Option<FiberId>, RenderError> {
    let fiber = &fibers[wip];
    let Some(ElementType::Component(component)) = fiber.element_type.clone() else {
        return Ok(None);
    };
    let props = fiber.pending_props.clone();
    let previous = fiber
        .alternate
        .and_then(|current| fibers[current].memoized_state.hooks().map(<[Hook]>::to_vec));

    let (next_children, hooks) =
        render_with_hooks(wip, &component, &props, previous, scheduler.clone())?;

    fibers[wip].memoized_state = MemoizedState::Hooks(hooks);
    Ok(reconcile_children(fibers, wip, &next_children))
}

fn reconcile_children<N: Clone>(
    fibers: &mut FiberArena<N>,
    wip: FiberId,
    children: &Node,
) -> Option<FiberId> {
    let current = fibers[wip].alternate;
    let reconciler = match current {
        Some(_) => ChildReconciler::UPDATE,
        None => ChildReconciler::MOUNT,
    };
    let current_first_child = current.and_then(|current| fibers[current].child);

    let child = reconciler.reconcile_child_fibers(fibers, wip, current_first_child, children);
    fibers[wip].child = child;
    child
}
