//! In-memory host - A DOM-like node tree with an operation log.
//!
//! Nodes are indices into a flat `Vec`. Nodes are never freed; removal only
//! detaches them, like a DOM node nobody references anymore.
//!
//! Every mutation is recorded as a [`HostOp`] so tests can assert that an
//! update touched exactly the nodes it had to.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::element::Props;
use crate::events::EventTree;

use super::HostConfig;

// =============================================================================
// Types
// =============================================================================

/// Handle to a node of a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostNodeId(pub usize);

/// Node payload.
#[derive(Debug, Clone, PartialEq)]
pub enum HostNodeKind {
    Container,
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

/// One node of the tree.
#[derive(Debug, Clone)]
pub struct HostNode {
    pub kind: HostNodeKind,
    pub parent: Option<HostNodeId>,
    pub children: Vec<HostNodeId>,
    /// Props stored by the reconciler (the event system reads callbacks here).
    pub props: Option<Props>,
}

/// A recorded mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    CreateInstance { node: HostNodeId, tag: String },
    CreateText { node: HostNodeId, content: String },
    AppendInitial { parent: HostNodeId, child: HostNodeId },
    Append { parent: HostNodeId, child: HostNodeId },
    Insert {
        parent: HostNodeId,
        child: HostNodeId,
        before: HostNodeId,
    },
    Remove { parent: HostNodeId, child: HostNodeId },
    SetText { node: HostNodeId, content: String },
    SetAttributes { node: HostNodeId },
}

impl HostOp {
    /// Whether this op changes the attached tree (creation excluded).
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            HostOp::CreateInstance { .. } | HostOp::CreateText { .. } | HostOp::AppendInitial { .. }
        )
    }
}

// =============================================================================
// MemoryHost
// =============================================================================

/// DOM-like in-memory host.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<HostNode>,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, kind: HostNodeKind) -> HostNodeId {
        let id = HostNodeId(self.nodes.len());
        self.nodes.push(HostNode {
            kind,
            parent: None,
            children: Vec::new(),
            props: None,
        });
        id
    }

    /// Create an empty container to mount into.
    pub fn create_container(&mut self) -> HostNodeId {
        self.alloc(HostNodeKind::Container)
    }

    pub fn node(&self, id: HostNodeId) -> Option<&HostNode> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: HostNodeId) -> &[HostNodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    pub fn parent(&self, id: HostNodeId) -> Option<HostNodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Number of nodes ever created (containers included).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Mutation log since creation or the last [`Self::take_ops`].
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: HostNodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: HostNodeId, out: &mut String) {
        let Some(node) = self.node(id) else { return };
        if let HostNodeKind::Text(text) = &node.kind {
            out.push_str(text);
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    /// First element with `tag` under `root` in document order.
    pub fn find_by_tag(&self, root: HostNodeId, tag: &str) -> Option<HostNodeId> {
        let node = self.node(root)?;
        if matches!(&node.kind, HostNodeKind::Element { tag: t, .. } if t == tag) {
            return Some(root);
        }
        node.children.iter().find_map(|&child| self.find_by_tag(child, tag))
    }

    /// Markup of everything under `id` (the node itself included unless it is a container).
    pub fn to_markup(&self, id: HostNodeId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    fn write_markup(&self, id: HostNodeId, out: &mut String) {
        let Some(node) = self.node(id) else { return };
        match &node.kind {
            HostNodeKind::Container => {
                for &child in &node.children {
                    self.write_markup(child, out);
                }
            }
            HostNodeKind::Text(text) => out.push_str(text),
            HostNodeKind::Element { tag, attributes } => {
                let _ = write!(out, "<{tag}");
                for (name, value) in attributes {
                    if value.is_empty() {
                        let _ = write!(out, " {name}");
                    } else {
                        let _ = write!(out, " {name}=\"{value}\"");
                    }
                }
                out.push('>');
                for &child in &node.children {
                    self.write_markup(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    fn detach(&mut self, child: HostNodeId) {
        if let Some(parent) = self.nodes[child.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != child);
        }
    }

    fn attach(&mut self, parent: HostNodeId, child: HostNodeId, before: Option<HostNodeId>) {
        self.detach(child);
        let siblings = &mut self.nodes[parent.0].children;
        let position = before
            .and_then(|b| siblings.iter().position(|&c| c == b))
            .unwrap_or(siblings.len());
        siblings.insert(position, child);
        self.nodes[child.0].parent = Some(parent);
    }
}

impl HostConfig for MemoryHost {
    type Node = HostNodeId;

    fn create_instance(&mut self, element_type: &str, props: &Props) -> HostNodeId {
        let id = self.alloc(HostNodeKind::Element {
            tag: element_type.to_string(),
            attributes: props.attributes(),
        });
        self.ops.push(HostOp::CreateInstance {
            node: id,
            tag: element_type.to_string(),
        });
        id
    }

    fn create_text_instance(&mut self, content: &str) -> HostNodeId {
        let id = self.alloc(HostNodeKind::Text(content.to_string()));
        self.ops.push(HostOp::CreateText {
            node: id,
            content: content.to_string(),
        });
        id
    }

    fn append_initial_child(&mut self, parent: &HostNodeId, child: &HostNodeId) {
        self.attach(*parent, *child, None);
        self.ops.push(HostOp::AppendInitial {
            parent: *parent,
            child: *child,
        });
    }

    fn append_child_to_container(&mut self, container: &HostNodeId, child: &HostNodeId) {
        self.attach(*container, *child, None);
        self.ops.push(HostOp::Append {
            parent: *container,
            child: *child,
        });
    }

    fn insert_child_to_container(
        &mut self,
        container: &HostNodeId,
        child: &HostNodeId,
        before: &HostNodeId,
    ) {
        self.attach(*container, *child, Some(*before));
        self.ops.push(HostOp::Insert {
            parent: *container,
            child: *child,
            before: *before,
        });
    }

    fn remove_child(&mut self, child: &HostNodeId, container: &HostNodeId) {
        if self.parent(*child) == Some(*container) {
            self.detach(*child);
        }
        self.ops.push(HostOp::Remove {
            parent: *container,
            child: *child,
        });
    }

    fn commit_text_update(&mut self, text: &HostNodeId, content: &str) {
        if let HostNodeKind::Text(existing) = &mut self.nodes[text.0].kind {
            *existing = content.to_string();
        }
        self.ops.push(HostOp::SetText {
            node: *text,
            content: content.to_string(),
        });
    }

    fn commit_update(
        &mut self,
        instance: &HostNodeId,
        _element_type: &str,
        _old_props: &Props,
        new_props: &Props,
    ) {
        if let HostNodeKind::Element { attributes, .. } = &mut self.nodes[instance.0].kind {
            *attributes = new_props.attributes();
        }
        self.ops.push(HostOp::SetAttributes { node: *instance });
    }

    fn update_fiber_props(&mut self, instance: &HostNodeId, props: &Props) {
        if let Some(node) = self.nodes.get_mut(instance.0) {
            node.props = Some(props.clone());
        }
    }
}

impl EventTree for MemoryHost {
    type Node = HostNodeId;

    fn stored_props(&self, node: &HostNodeId) -> Option<&Props> {
        self.node(*node).and_then(|n| n.props.as_ref())
    }

    fn parent_of(&self, node: &HostNodeId) -> Option<HostNodeId> {
        self.parent(*node)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup() {
        let mut host = MemoryHost::new();
        let container = host.create_container();
        let div = host.create_instance("div", &Props::new().with("id", "a").with("hidden", true));
        let text = host.create_text_instance("hi");
        host.append_initial_child(&div, &text);
        host.append_child_to_container(&container, &div);

        assert_eq!(host.to_markup(container), "<div hidden id=\"a\">hi</div>");
        assert_eq!(host.text_content(container), "hi");
        assert_eq!(host.find_by_tag(container, "div"), Some(div));
    }

    #[test]
    fn test_insert_moves_attached_node() {
        let mut host = MemoryHost::new();
        let container = host.create_container();
        let a = host.create_text_instance("a");
        let b = host.create_text_instance("b");
        let c = host.create_text_instance("c");
        for n in [a, b, c] {
            host.append_child_to_container(&container, &n);
        }

        host.insert_child_to_container(&container, &c, &a);
        assert_eq!(host.children(container), &[c, a, b]);

        host.append_child_to_container(&container, &c);
        assert_eq!(host.children(container), &[a, b, c]);
    }

    #[test]
    fn test_remove_and_text_update() {
        let mut host = MemoryHost::new();
        let container = host.create_container();
        let a = host.create_text_instance("a");
        host.append_child_to_container(&container, &a);

        host.commit_text_update(&a, "z");
        assert_eq!(host.to_markup(container), "z");

        host.remove_child(&a, &container);
        assert!(host.children(container).is_empty());
        assert_eq!(host.parent(a), None);
    }

    #[test]
    fn test_mutation_ops() {
        let mut host = MemoryHost::new();
        let container = host.create_container();
        let a = host.create_text_instance("a");
        host.append_child_to_container(&container, &a);

        let mutations: Vec<_> = host.ops().iter().filter(|op| op.is_mutation()).collect();
        assert_eq!(
            mutations,
            vec![&HostOp::Append {
                parent: container,
                child: a
            }]
        );
    }
}
