//! Fiber arena - Allocation, work-in-progress cloning, release.
//!
//! Fibers live in a generational slot map. Ids held past a fiber's release
//! (a hook dispatch for an unmounted component, say) resolve to nothing
//! instead of aliasing whatever reuses the slot.
//!
//! Each tree position has at most two fibers alive: the committed one and
//! its alternate. [`FiberArena::create_work_in_progress`] recycles the
//! alternate instead of allocating, and [`FiberArena::release_subtree`]
//! frees both generations of a deleted subtree.
//!
//! Allocations made during a render pass are remembered so an aborted pass
//! can give them back ([`FiberArena::abort_pass`]).

use std::ops::{Index, IndexMut};

use slotmap::SlotMap;

use crate::element::{Element, ElementType, Props};
use crate::fiber::flags::Flags;
use crate::fiber::node::{Fiber, FiberId, WorkTag};

// =============================================================================
// Arena
// =============================================================================

/// Owner of every fiber of one root.
pub struct FiberArena<N> {
    fibers: SlotMap<FiberId, Fiber<N>>,
    created_in_pass: Vec<FiberId>,
}

impl<N> Default for FiberArena<N> {
    fn default() -> Self {
        Self {
            fibers: SlotMap::with_key(),
            created_in_pass: Vec::new(),
        }
    }
}

impl<N> Index<FiberId> for FiberArena<N> {
    type Output = Fiber<N>;

    fn index(&self, id: FiberId) -> &Fiber<N> {
        &self.fibers[id]
    }
}

impl<N> IndexMut<FiberId> for FiberArena<N> {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber<N> {
        &mut self.fibers[id]
    }
}

impl<N: Clone> FiberArena<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.fibers.get(id)
    }

    pub fn contains(&self, id: FiberId) -> bool {
        self.fibers.contains_key(id)
    }

    /// Number of live fibers (both generations).
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    fn insert(&mut self, fiber: Fiber<N>) -> FiberId {
        let id = self.fibers.insert(fiber);
        self.created_in_pass.push(id);
        id
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Allocate the HostRoot fiber of a new container.
    pub fn create_host_root_fiber(&mut self) -> FiberId {
        self.fibers.insert(Fiber::new(WorkTag::HostRoot, Props::new(), None))
    }

    /// Fiber for an element appearing at a position for the first time.
    pub fn create_fiber_from_element(&mut self, element: &Element) -> FiberId {
        let tag = match element.element_type {
            ElementType::Host(_) => WorkTag::HostComponent,
            ElementType::Component(_) => WorkTag::FunctionComponent,
        };
        let mut fiber = Fiber::new(tag, element.props.clone(), element.key.clone());
        fiber.element_type = Some(element.element_type.clone());
        self.insert(fiber)
    }

    /// Fiber for a text child appearing at a position for the first time.
    pub fn create_fiber_from_text(&mut self, content: &str) -> FiberId {
        self.insert(Fiber::new(WorkTag::HostText, Props::text(content.into()), None))
    }

    /// Fiber to mutate during this render for the position `current` occupies.
    ///
    /// Reuses `current.alternate` when there is one (the fiber from two renders
    /// ago), otherwise allocates it and links both directions.
    pub fn create_work_in_progress(&mut self, current: FiberId, pending_props: Props) -> FiberId {
        let wip = match self.fibers[current].alternate {
            Some(wip) => {
                let fiber = &mut self.fibers[wip];
                fiber.pending_props = pending_props;
                fiber.flags = Flags::empty();
                fiber.subtree_flags = Flags::empty();
                fiber.deletions.clear();
                wip
            }
            None => {
                let source = &self.fibers[current];
                let mut fiber = Fiber::new(source.tag, pending_props, source.key.clone());
                fiber.state_node = source.state_node.clone();
                fiber.alternate = Some(current);
                let wip = self.insert(fiber);
                self.fibers[current].alternate = Some(wip);
                wip
            }
        };

        let source = &self.fibers[current];
        let element_type = source.element_type.clone();
        let update_queue = source.update_queue.clone();
        let child = source.child;
        let memoized_props = source.memoized_props.clone();
        let memoized_state = source.memoized_state.clone();

        let fiber = &mut self.fibers[wip];
        fiber.element_type = element_type;
        fiber.update_queue = update_queue;
        fiber.child = child;
        fiber.memoized_props = memoized_props;
        fiber.memoized_state = memoized_state;
        wip
    }

    // =========================================================================
    // Release
    // =========================================================================

    /// Free a deleted subtree: every fiber under `root` and each alternate.
    pub fn release_subtree(&mut self, root: FiberId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(fiber) = self.fibers.remove(id) else {
                continue;
            };
            if let Some(child) = fiber.child {
                stack.push(child);
            }
            if id != root {
                if let Some(sibling) = fiber.sibling {
                    stack.push(sibling);
                }
            }
            if let Some(alternate) = fiber.alternate {
                self.fibers.remove(alternate);
            }
        }
    }

    // =========================================================================
    // Render Pass Bookkeeping
    // =========================================================================

    /// Start tracking allocations for a render pass.
    pub fn begin_pass(&mut self) {
        self.created_in_pass.clear();
    }

    /// Keep everything allocated during the pass.
    pub fn finish_pass(&mut self) {
        self.created_in_pass.clear();
    }

    /// Free everything allocated during an aborted pass.
    ///
    /// Committed fibers that were given a fresh alternate this pass get their
    /// link cleared so the next pass allocates again.
    pub fn abort_pass(&mut self) {
        for id in std::mem::take(&mut self.created_in_pass) {
            let Some(fiber) = self.fibers.remove(id) else {
                continue;
            };
            if let Some(alternate) = fiber.alternate {
                if let Some(current) = self.fibers.get_mut(alternate) {
                    if current.alternate == Some(id) {
                        current.alternate = None;
                    }
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
