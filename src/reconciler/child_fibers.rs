//! Child reconciler - Diff the previous child fibers against new render output.
//!
//! Given a parent under construction, its previous first child, and the new
//! children, produce the new child list. Matching old fibers are recycled
//! through [`FiberArena::create_work_in_progress`]; everything else is
//! created fresh. Old fibers nobody matched are queued on the parent's
//! `deletions`.
//!
//! # Moves in lists
//!
//! New children are visited in order while `last_placed_index` tracks the
//! highest old index reused so far. A reused fiber whose old index is lower
//! moved backwards past something already placed and is flagged PLACEMENT.
//! This is greedy, not minimal: `[1, 2, 3] -> [3, 1, 2]` moves `1` and `2`
//! instead of just `3`.

use std::collections::HashMap;

use crate::config::dev_warn;
use crate::element::{Element, Key, Node, Props};
use crate::fiber::{FiberArena, FiberId, Flags, WorkTag};

/// Old children indexed for list reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ExistingKey {
    Key(Key),
    Index(usize),
}

impl ExistingKey {
    fn resolve(key: Option<&Key>, index: usize) -> Self {
        match key {
            Some(key) => ExistingKey::Key(key.clone()),
            None => ExistingKey::Index(index),
        }
    }
}

/// Diffing strategy for one parent.
///
/// Effects are tracked only when the parent already existed: a freshly
/// created subtree is inserted as a whole by its topmost PLACEMENT.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChildReconciler {
    should_track_effects: bool,
}

impl ChildReconciler {
    /// For parents rendered before: flags placements and deletions.
    pub(crate) const UPDATE: Self = Self {
        should_track_effects: true,
    };

    /// For parents rendered for the first time.
    pub(crate) const MOUNT: Self = Self {
        should_track_effects: false,
    };

    /// Reconcile `new_child` under `return_fiber` and return the first new child.
    pub(crate) fn reconcile_child_fibers<N: Clone>(
        self,
        fibers: &mut FiberArena<N>,
        return_fiber: FiberId,
        current_first_child: Option<FiberId>,
        new_child: &Node,
    ) -> Option<FiberId> {
        match new_child {
            Node::Element(element) => {
                let fiber =
                    self.reconcile_single_element(fibers, return_fiber, current_first_child, element);
                Some(self.place_single_child(fibers, fiber))
            }
            Node::Text(content) => {
                let fiber =
                    self.reconcile_single_text_node(fibers, return_fiber, current_first_child, content);
                Some(self.place_single_child(fibers, fiber))
            }
            Node::List(children) => {
                self.reconcile_children_array(fibers, return_fiber, current_first_child, children)
            }
            Node::Empty => {
                self.delete_remaining_children(fibers, return_fiber, current_first_child);
                None
            }
        }
    }

    // =========================================================================
    // Single Child
    // =========================================================================

    fn reconcile_single_element<N: Clone>(
        self,
        fibers: &mut FiberArena<N>,
        return_fiber: FiberId,
        current_first_child: Option<FiberId>,
        element: &Element,
    ) -> FiberId {
        let mut current = current_first_child;
        while let Some(id) = current {
            if fibers[id].key == element.key {
                if fibers[id].element_type.as_ref() == Some(&element.element_type) {
                    let existing = self.use_fiber(fibers, id, element.props.clone());
                    fibers[existing].return_fiber = Some(return_fiber);
                    let rest = fibers[id].sibling;
                    self.delete_remaining_children(fibers, return_fiber, rest);
                    return existing;
                }
                // Same key, different type: nothing left can match.
                self.delete_remaining_children(fibers, return_fiber, Some(id));
                break;
            }
            self.delete_child(fibers, return_fiber, id);
            current = fibers[id].sibling;
        }

        let fiber = fibers.create_fiber_from_element(element);
        fibers[fiber].return_fiber = Some(return_fiber);
        fiber
    }

    fn reconcile_single_text_node<N: Clone>(
        self,
        fibers: &mut FiberArena<N>,
        return_fiber: FiberId,
        current_first_child: Option<FiberId>,
        content: &str,
    ) -> FiberId {
        let mut current = current_first_child;
        while let Some(id) = current {
            if fibers[id].tag == WorkTag::HostText {
                let existing = self.use_fiber(fibers, id, Props::text(content.into()));
                fibers[existing].return_fiber = Some(return_fiber);
                let rest = fibers[id].sibling;
                self.delete_remaining_children(fibers, return_fiber, rest);
                return existing;
            }
            self.delete_child(fibers, return_fiber, id);
            current = fibers[id].sibling;
        }

        let fiber = fibers.create_fiber_from_text(content);
        fibers[fiber].return_fiber = Some(return_fiber);
        fiber
    }

    fn place_single_child<N: Clone>(self, fibers: &mut FiberArena<N>, fiber: FiberId) -> FiberId {
        if self.should_track_effects && fibers[fiber].alternate.is_none() {
            fibers[fiber].flags |= Flags::PLACEMENT;
        }
        fiber
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    fn delete_child<N: Clone>(self, fibers: &mut FiberArena<N>, return_fiber: FiberId, child: FiberId) {
        if !self.should_track_effects {
            return;
        }
        tracing::trace!(?child, "child deleted");
        let parent = &mut fibers[return_fiber];
        parent.deletions.push(child);
        parent.flags |= Flags::CHILD_DELETION;
    }

    fn delete_remaining_children<N: Clone>(
        self,
        fibers: &mut FiberArena<N>,
        return_fiber: FiberId,
        current_first_child: Option<FiberId>,
    ) {
        if !self.should_track_effects {
            return;
        }
        let mut current = current_first_child;
        while let Some(id) = current {
            self.delete_child(fibers, return_fiber, id);
            current = fibers[id].sibling;
        }
    }

    /// Recycle `current` for this render as an only child.
    fn use_fiber<N: Clone>(self, fibers: &mut FiberArena<N>, current: FiberId, props: Props) -> FiberId {
        let clone = fibers.create_work_in_progress(current, props);
        let fiber = &mut fibers[clone];
        fiber.index = 0;
        fiber.sibling = None;
        clone
    }

    // =========================================================================
    // Lists
    // =========================================================================

    fn reconcile_children_array<N: Clone>(
        self,
        fibers: &mut FiberArena<N>,
        return_fiber: FiberId,
        current_first_child: Option<FiberId>,
        new_children: &[Node],
    ) -> Option<FiberId> {
        let mut existing: HashMap<ExistingKey, FiberId> = HashMap::new();
        let mut current = current_first_child;
        while let Some(id) = current {
            let fiber = &fibers[id];
            let key = ExistingKey::resolve(fiber.key.as_ref(), fiber.index);
            current = fiber.sibling;
            if let Some(shadowed) = existing.insert(key, id) {
                dev_warn!(key = ?fibers[shadowed].key, "duplicate key among siblings");
                self.delete_child(fibers, return_fiber, shadowed);
            }
        }

        let mut last_placed_index = 0;
        let mut first_new_fiber: Option<FiberId> = None;
        let mut last_new_fiber: Option<FiberId> = None;

        for (index, child) in new_children.iter().enumerate() {
            let Some(new_fiber) = self.update_from_map(fibers, &mut existing, index, child) else {
                continue;
            };

            let fiber = &mut fibers[new_fiber];
            fiber.index = index;
            fiber.return_fiber = Some(return_fiber);

            match last_new_fiber {
                Some(previous) => fibers[previous].sibling = Some(new_fiber),
                None => first_new_fiber = Some(new_fiber),
            }
            last_new_fiber = Some(new_fiber);

            if !self.should_track_effects {
                continue;
            }

            match fibers[new_fiber].alternate {
                Some(current) => {
                    let old_index = fibers[current].index;
                    if old_index < last_placed_index {
                        tracing::trace!(old_index, index, "child moved");
                        fibers[new_fiber].flags |= Flags::PLACEMENT;
                    } else {
                        last_placed_index = old_index;
                    }
                }
                None => fibers[new_fiber].flags |= Flags::PLACEMENT,
            }
        }

        let mut remaining: Vec<FiberId> = existing.into_values().collect();
        remaining.sort_by_key(|&id| fibers[id].index);
        for id in remaining {
            self.delete_child(fibers, return_fiber, id);
        }

        first_new_fiber
    }

    /// Fiber for `child` at `index`: recycled from `existing` when the slot
    /// and type match, otherwise fresh.
    fn update_from_map<N: Clone>(
        self,
        fibers: &mut FiberArena<N>,
        existing: &mut HashMap<ExistingKey, FiberId>,
        index: usize,
        child: &Node,
    ) -> Option<FiberId> {
        match child {
            Node::Text(content) => {
                let slot = ExistingKey::Index(index);
                if let Some(&before) = existing.get(&slot) {
                    if fibers[before].tag == WorkTag::HostText {
                        existing.remove(&slot);
                        return Some(self.use_fiber(fibers, before, Props::text(content.clone())));
                    }
                }
                Some(fibers.create_fiber_from_text(content))
            }
            Node::Element(element) => {
                let slot = ExistingKey::resolve(element.key.as_ref(), index);
                if let Some(&before) = existing.get(&slot) {
                    if fibers[before].element_type.as_ref() == Some(&element.element_type) {
                        existing.remove(&slot);
                        return Some(self.use_fiber(fibers, before, element.props.clone()));
                    }
                }
                Some(fibers.create_fiber_from_element(element))
            }
            Node::List(_) => {
                dev_warn!(index, "nested child lists are not supported; child skipped");
                None
            }
            Node::Empty => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
