//! Commit phase - Apply the flags of a finished tree to the host.
//!
//! The traversal descends only into children whose `subtree_flags` carry
//! mutation effects and applies each fiber's own effects on the way back
//! up, so children are committed before their parent and left siblings
//! before right ones. Flags are cleared as fibers are committed.

use crate::config::dev_warn;
use crate::element::Props;
use crate::fiber::{FiberArena, FiberId, Flags, WorkTag};
use crate::host::HostConfig;

use super::root::FiberRoot;

// =============================================================================
// Entry
// =============================================================================

/// Swap in the finished tree, committing its effects first.
pub(crate) fn commit_root<H: HostConfig>(root: &mut FiberRoot<H>) {
    let Some(finished_work) = root.finished_work.take() else {
        return;
    };
    let _span = tracing::debug_span!("commit_root").entered();

    let fiber = &root.fibers[finished_work];
    if (fiber.flags | fiber.subtree_flags).intersects(Flags::MUTATION_MASK) {
        commit_mutation_effects(root, finished_work);
    }

    root.current = finished_work;
}

fn commit_mutation_effects<H: HostConfig>(root: &mut FiberRoot<H>, finished_work: FiberId) {
    let mut next = Some(finished_work);

    while let Some(id) = next {
        let fiber = &root.fibers[id];
        if let Some(child) = fiber.child {
            if fiber.subtree_flags.intersects(Flags::MUTATION_MASK) {
                next = Some(child);
                continue;
            }
        }

        let mut node = id;
        loop {
            commit_mutation_effects_on_fiber(root, node);
            let fiber = &root.fibers[node];
            if let Some(sibling) = fiber.sibling {
                next = Some(sibling);
                break;
            }
            match fiber.return_fiber {
                Some(parent) => node = parent,
                None => {
                    next = None;
                    break;
                }
            }
        }
    }
}

fn commit_mutation_effects_on_fiber<H: HostConfig>(root: &mut FiberRoot<H>, id: FiberId) {
    let flags = root.fibers[id].flags;

    if flags.contains(Flags::PLACEMENT) {
        commit_placement(root, id);
    }
    if flags.contains(Flags::UPDATE) {
        commit_update(root, id);
    }
    if flags.contains(Flags::CHILD_DELETION) {
        for child in std::mem::take(&mut root.fibers[id].deletions) {
            commit_deletion(root, id, child);
        }
    }

    let fiber = &mut root.fibers[id];
    fiber.flags = Flags::empty();
    fiber.subtree_flags = Flags::empty();
}

// =============================================================================
// Placement
// =============================================================================

fn commit_placement<H: HostConfig>(root: &mut FiberRoot<H>, id: FiberId) {
    let parent = root.fibers[id].return_fiber;
    let Some(host_parent) = find_host_parent(root, parent) else {
        dev_warn!(fiber = ?id, "placement without a host parent");
        return;
    };
    let before = get_host_sibling(&root.fibers, id);
    tracing::trace!(fiber = ?id, ?before, "placement");

    insert_or_append_placement_node(root, id, &host_parent, before.as_ref());
}

/// Nearest host node that owns the children of `start` (the container for
/// the HostRoot), walking up from `start` itself.
fn find_host_parent<H: HostConfig>(root: &FiberRoot<H>, start: Option<FiberId>) -> Option<H::Node> {
    let mut parent = start;
    while let Some(id) = parent {
        let fiber = root.fibers.get(id)?;
        match fiber.tag {
            WorkTag::HostComponent => return fiber.state_node.clone(),
            WorkTag::HostRoot => return Some(root.container.clone()),
            WorkTag::HostText | WorkTag::FunctionComponent => parent = fiber.return_fiber,
        }
    }
    None
}

/// Host node a placed fiber must be inserted before: the first host node
/// after it in document order that is not itself being placed.
///
/// `None` means append.
fn get_host_sibling<N: Clone>(fibers: &FiberArena<N>, fiber: FiberId) -> Option<N> {
    let mut node = fiber;

    'siblings: loop {
        while fibers[node].sibling.is_none() {
            match fibers[node].return_fiber {
                Some(parent) if !is_host_parent(fibers[parent].tag) => node = parent,
                _ => return None,
            }
        }
        node = fibers[node].sibling?;

        while !fibers[node].tag.is_host() {
            if fibers[node].flags.contains(Flags::PLACEMENT) {
                continue 'siblings;
            }
            match fibers[node].child {
                Some(child) => node = child,
                None => continue 'siblings,
            }
        }

        if !fibers[node].flags.contains(Flags::PLACEMENT) {
            return fibers[node].state_node.clone();
        }
    }
}

fn is_host_parent(tag: WorkTag) -> bool {
    matches!(tag, WorkTag::HostRoot | WorkTag::HostComponent)
}

/// Insert every topmost host node of `id`'s subtree into `host_parent`.
fn insert_or_append_placement_node<H: HostConfig>(
    root: &mut FiberRoot<H>,
    id: FiberId,
    host_parent: &H::Node,
    before: Option<&H::Node>,
) {
    let fiber = &root.fibers[id];
    if fiber.tag.is_host() {
        if let Some(node) = &fiber.state_node {
            match before {
                Some(before) => root.host.insert_child_to_container(host_parent, node, before),
                None => root.host.append_child_to_container(host_parent, node),
            }
        }
        return;
    }

    let mut child = fiber.child;
    while let Some(id) = child {
        insert_or_append_placement_node(root, id, host_parent, before);
        child = root.fibers[id].sibling;
    }
}

// =============================================================================
// Update
// =============================================================================

fn commit_update<H: HostConfig>(root: &mut FiberRoot<H>, id: FiberId) {
    let fiber = &root.fibers[id];
    let Some(instance) = &fiber.state_node else {
        return;
    };

    match fiber.tag {
        WorkTag::HostText => {
            let content = fiber.memoized_props.as_ref().and_then(Props::content).unwrap_or_default();
            root.host.commit_text_update(instance, content);
        }
        WorkTag::HostComponent => {
            let (Some(tag), Some(new_props)) = (fiber.host_tag(), fiber.memoized_props.as_ref()) else {
                return;
            };
            let old_props = fiber
                .alternate
                .and_then(|current| root.fibers[current].memoized_props.clone())
                .unwrap_or_default();
            root.host.commit_update(instance, tag, &old_props, new_props);
        }
        WorkTag::HostRoot | WorkTag::FunctionComponent => {
            dev_warn!(fiber = ?id, tag = ?fiber.tag, "update flag on a fiber without a host node");
        }
    }
}

// =============================================================================
// Deletion
// =============================================================================

/// Remove the host nodes of a deleted child of `parent`, then free its fibers.
fn commit_deletion<H: HostConfig>(root: &mut FiberRoot<H>, parent: FiberId, child: FiberId) {
    let nodes = top_level_host_nodes(&root.fibers, child);
    match find_host_parent(root, Some(parent)) {
        Some(host_parent) => {
            for node in &nodes {
                root.host.remove_child(node, &host_parent);
            }
        }
        None if !nodes.is_empty() => dev_warn!(fiber = ?child, "deletion without a host parent"),
        None => {}
    }
    tracing::trace!(fiber = ?child, removed = nodes.len(), "deletion");

    root.fibers.release_subtree(child);
}

/// Host nodes of a subtree that are not nested in another host node of it,
/// in document order.
fn top_level_host_nodes<N: Clone>(fibers: &FiberArena<N>, root: FiberId) -> Vec<N> {
    let mut nodes = Vec::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        let fiber = &fibers[id];
        if fiber.tag.is_host() {
            nodes.extend(fiber.state_node.clone());
            continue;
        }
        let mut children = Vec::new();
        let mut child = fiber.child;
        while let Some(child_id) = child {
            children.push(child_id);
            child = fibers[child_id].sibling;
        }
        stack.extend(children.into_iter().rev());
    }

    nodes
}
