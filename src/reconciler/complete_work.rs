//! Complete phase - Build host instances on the way up and bubble flags.
//!
//! A HostComponent completes after all of its descendants, so on mount it
//! can create its instance and attach every host instance beneath it at
//! once. Only the topmost new node of a subtree is inserted during commit.

use crate::config::dev_warn;
use crate::fiber::{FiberArena, FiberId, Flags, WorkTag};
use crate::host::HostConfig;

pub(crate) fn complete_work<H: HostConfig>(
    host: &mut H,
    fibers: &mut FiberArena<H::Node>,
    wip: FiberId,
) {
    let fiber = &fibers[wip];
    let current = fiber.alternate;

    match fiber.tag {
        WorkTag::HostComponent => match (current, fiber.state_node.clone()) {
            (Some(current), Some(instance)) => {
                let new_props = fiber.pending_props.clone();
                let changed = fibers[current]
                    .memoized_props
                    .as_ref()
                    .is_none_or(|old| !old.attributes_eq(&new_props));
                host.update_fiber_props(&instance, &new_props);
                if changed {
                    mark_update(fibers, wip);
                }
            }
            _ => match fiber.host_tag() {
                Some(tag) => {
                    let props = fiber.pending_props.clone();
                    let instance = host.create_instance(tag, &props);
                    host.update_fiber_props(&instance, &props);
                    append_all_children(host, fibers, &instance, wip);
                    fibers[wip].state_node = Some(instance);
                }
                None => dev_warn!(fiber = ?wip, "host component without a tag"),
            },
        },
        WorkTag::HostText => {
            let new_text = fiber.pending_props.content().unwrap_or_default().to_string();
            match (current, fiber.state_node.is_some()) {
                (Some(current), true) => {
                    let old_text = fibers[current]
                        .memoized_props
                        .as_ref()
                        .and_then(|props| props.content());
                    if old_text != Some(new_text.as_str()) {
                        mark_update(fibers, wip);
                    }
                }
                _ => {
                    let instance = host.create_text_instance(&new_text);
                    fibers[wip].state_node = Some(instance);
                }
            }
        }
        WorkTag::HostRoot | WorkTag::FunctionComponent => {}
    }

    bubble_properties(fibers, wip);
}

fn mark_update<N: Clone>(fibers: &mut FiberArena<N>, wip: FiberId) {
    fibers[wip].flags |= Flags::UPDATE;
}

/// Attach the topmost host instances under `wip` to `parent`.
///
/// Function components have no instance, so the walk looks through them.
fn append_all_children<H: HostConfig>(
    host: &mut H,
    fibers: &FiberArena<H::Node>,
    parent: &H::Node,
    wip: FiberId,
) {
    let Some(mut node) = fibers[wip].child else {
        return;
    };

    loop {
        let fiber = &fibers[node];
        if fiber.tag.is_host() {
            if let Some(instance) = &fiber.state_node {
                host.append_initial_child(parent, instance);
            }
        } else if let Some(child) = fiber.child {
            node = child;
            continue;
        }

        loop {
            if let Some(sibling) = fibers[node].sibling {
                node = sibling;
                break;
            }
            match fibers[node].return_fiber {
                Some(parent_fiber) if parent_fiber != wip => node = parent_fiber,
                _ => return,
            }
        }
    }
}

/// Set `subtree_flags` to the union of the children's own and subtree flags.
fn bubble_properties<N: Clone>(fibers: &mut FiberArena<N>, wip: FiberId) {
    let mut subtree_flags = Flags::empty();
    let mut child = fibers[wip].child;
    while let Some(id) = child {
        let fiber = &mut fibers[id];
        subtree_flags |= fiber.flags | fiber.subtree_flags;
        fiber.return_fiber = Some(wip);
        child = fiber.sibling;
    }
    fibers[wip].subtree_flags = subtree_flags;
}

// =============================================================================
// Tests
// =============================================================================
