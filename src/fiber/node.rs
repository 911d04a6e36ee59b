//! Fiber - One unit of work per tree position.

use std::cell::RefCell;
use std::rc::Rc;

use crate::element::{ElementType, Key, Node, Props};
use crate::hooks::Hook;
use crate::update_queue::UpdateQueue;

use super::flags::Flags;

slotmap::new_key_type! {
    /// Arena id of a fiber.
    pub struct FiberId;
}

/// Shared root update queue (both root fibers hold the same queue).
pub type RootQueue = Rc<RefCell<UpdateQueue<Node>>>;

/// Fiber variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkTag {
    /// Root of a mounted tree; its host parent is the container.
    HostRoot,
    /// Platform node such as a DOM element.
    HostComponent,
    /// Platform text node.
    HostText,
    /// User function rendering more elements.
    FunctionComponent,
}

impl WorkTag {
    /// Whether fibers with this tag own a host instance.
    pub fn is_host(self) -> bool {
        matches!(self, WorkTag::HostComponent | WorkTag::HostText)
    }
}

/// State memoized from the last render of a fiber.
#[derive(Clone, Default)]
pub enum MemoizedState {
    #[default]
    None,
    /// HostRoot: the last processed root element.
    Root(Node),
    /// FunctionComponent: hook records in call order.
    Hooks(Vec<Hook>),
}

impl MemoizedState {
    /// Hook records, if this is a function component's state.
    pub fn hooks(&self) -> Option<&[Hook]> {
        match self {
            MemoizedState::Hooks(hooks) => Some(hooks),
            _ => None,
        }
    }
}

/// A fiber.
///
/// `child`/`sibling` form the tree; `return_fiber` and `alternate` are plain
/// back-references.
pub struct Fiber<N> {
    pub tag: WorkTag,
    pub key: Option<Key>,
    pub element_type: Option<ElementType>,
    pub pending_props: Props,
    pub memoized_props: Option<Props>,

    /// Host instance. Unused for HostRoot and FunctionComponent.
    pub state_node: Option<N>,

    pub return_fiber: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
    pub alternate: Option<FiberId>,
    pub index: usize,

    pub flags: Flags,
    pub subtree_flags: Flags,
    pub deletions: Vec<FiberId>,

    pub update_queue: Option<RootQueue>,
    pub memoized_state: MemoizedState,
}

impl<N> Fiber<N> {
    pub fn new(tag: WorkTag, pending_props: Props, key: Option<Key>) -> Self {
        Self {
            tag,
            key,
            element_type: None,
            pending_props,
            memoized_props: None,
            state_node: None,
            return_fiber: None,
            child: None,
            sibling: None,
            alternate: None,
            index: 0,
            flags: Flags::empty(),
            subtree_flags: Flags::empty(),
            deletions: Vec::new(),
            update_queue: None,
            memoized_state: MemoizedState::None,
        }
    }

    /// Host tag of a HostComponent fiber.
    pub fn host_tag(&self) -> Option<&str> {
        self.element_type.as_ref().and_then(ElementType::host_tag)
    }
}

impl<N: std::fmt::Debug> std::fmt::Debug for Fiber<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fiber")
            .field("tag", &self.tag)
            .field("key", &self.key)
            .field("element_type", &self.element_type)
            .field("state_node", &self.state_node)
            .field("index", &self.index)
            .field("flags", &self.flags)
            .field("subtree_flags", &self.subtree_flags)
            .finish_non_exhaustive()
    }
}
