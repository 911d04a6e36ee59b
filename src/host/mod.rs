//! Host adapter - The platform the reconciler renders into.
//!
//! The reconciler never touches platform nodes directly. During render it
//! creates detached instances and assembles freshly mounted subtrees with
//! [`HostConfig::append_initial_child`]; during commit it inserts, moves,
//! removes, and updates nodes under their host parent.
//!
//! [`MemoryHost`] is an in-memory implementation for tests and headless use.

mod memory;

pub use memory::{HostNode, HostNodeId, HostNodeKind, HostOp, MemoryHost};

use crate::element::Props;

/// Platform primitives used by the reconciler.
///
/// `Node` is a cheap handle to any platform node: element, text node, or
/// container.
pub trait HostConfig {
    type Node: Clone + PartialEq + std::fmt::Debug;

    /// Create a detached element instance for host tag `element_type`.
    fn create_instance(&mut self, element_type: &str, props: &Props) -> Self::Node;

    /// Create a detached text node.
    fn create_text_instance(&mut self, content: &str) -> Self::Node;

    /// Append `child` while assembling a newly created subtree.
    fn append_initial_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Append `child` as the last child of `container`.
    ///
    /// A `child` that is already attached somewhere is moved.
    fn append_child_to_container(&mut self, container: &Self::Node, child: &Self::Node);

    /// Insert `child` before `before` in `container`, moving it if attached.
    fn insert_child_to_container(
        &mut self,
        container: &Self::Node,
        child: &Self::Node,
        before: &Self::Node,
    );

    /// Detach `child` from `container`.
    fn remove_child(&mut self, child: &Self::Node, container: &Self::Node);

    /// Replace a text node's content.
    fn commit_text_update(&mut self, text: &Self::Node, content: &str);

    /// Apply changed attributes of an element instance.
    fn commit_update(
        &mut self,
        instance: &Self::Node,
        element_type: &str,
        old_props: &Props,
        new_props: &Props,
    );

    /// Store `props` on `instance` for the event system to read.
    ///
    /// Called right after creation and on every later render of the instance.
    fn update_fiber_props(&mut self, instance: &Self::Node, props: &Props);
}
