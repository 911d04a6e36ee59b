//! Rendering and updating trees through the public API.
//!
//! Every test mounts into a fresh [`MemoryHost`] and checks the resulting
//! markup plus the host operations each update performed.
//!
//! Run with: cargo test --test reconcile

use spark_fiber::{
    create_container, update_container, Component, Element, HostNodeId, HostOp, MemoryHost, Node,
    Root,
};

// =============================================================================
// Helpers
// =============================================================================

fn setup() -> (Root<MemoryHost>, HostNodeId) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let mut host = MemoryHost::new();
    let container = host.create_container();
    (create_container(host, container), container)
}

fn markup(root: &Root<MemoryHost>) -> String {
    let container = root.container();
    root.with_host(|host| host.to_markup(container))
}

/// Host mutations since the last call (creation and initial assembly excluded).
fn take_mutations(root: &Root<MemoryHost>) -> Vec<HostOp> {
    root.with_host_mut(MemoryHost::take_ops)
        .into_iter()
        .filter(HostOp::is_mutation)
        .collect()
}

fn list(keys: &[&str]) -> Element {
    Element::host("ul").children(keys.iter().map(|k| Element::host("li").key(k).child(*k)))
}

fn pair() -> Component {
    Component::new("Pair", |props| {
        let label = props.get_str("label").unwrap_or_default().to_string();
        Ok(Node::List(vec![
            Element::host("b").child(label.clone()).into(),
            Element::host("i").child(label).into(),
        ]))
    })
}

// =============================================================================
// Mount / Update
// =============================================================================

#[test]
fn test_mount_nested_tree() {
    let (root, _) = setup();

    root.render(
        Element::host("div")
            .prop("id", "app")
            .child(Element::host("h1").child("Title"))
            .child(Element::host("p").child("Body").child(42)),
    )
    .unwrap();

    assert_eq!(
        markup(&root),
        "<div id=\"app\"><h1>Title</h1><p>Body42</p></div>"
    );
}

#[test]
fn test_update_container_returns_element() {
    let (root, _) = setup();

    let rendered = update_container(Element::host("p").key("k"), &root).unwrap();

    match rendered {
        Node::Element(element) => assert_eq!(element.get_key(), Some("k")),
        other => panic!("expected element, got {other:?}"),
    }
}

#[test]
fn test_update_text_and_attributes_in_place() {
    let (root, _) = setup();
    root.render(Element::host("a").prop("href", "/one").child("one")).unwrap();
    take_mutations(&root);

    root.render(Element::host("a").prop("href", "/two").child("two")).unwrap();

    assert_eq!(markup(&root), "<a href=\"/two\">two</a>");
    let mutations = take_mutations(&root);
    assert_eq!(mutations.len(), 2);
    assert!(matches!(mutations[0], HostOp::SetText { .. }));
    assert!(matches!(mutations[1], HostOp::SetAttributes { .. }));
}

#[test]
fn test_same_tree_twice_mutates_nothing() {
    let (root, _) = setup();
    let tree = || Element::host("section").children([list(&["a", "b"]), Element::host("footer")]);
    root.render(tree()).unwrap();
    root.with_host_mut(MemoryHost::take_ops);

    root.render(tree()).unwrap();

    assert!(root.with_host(|host| host.ops().is_empty()));
}

#[test]
fn test_empty_clears_container() {
    let (root, container) = setup();
    root.render(list(&["a", "b"])).unwrap();

    root.render(Node::Empty).unwrap();

    assert_eq!(markup(&root), "");
    assert!(root.with_host(|host| host.children(container).is_empty()));
}

#[test]
fn test_type_change_replaces_node() {
    let (root, _) = setup();
    root.render(Element::host("div").key("x").child("a")).unwrap();
    take_mutations(&root);

    root.render(Element::host("span").key("x").child("a")).unwrap();

    assert_eq!(markup(&root), "<span>a</span>");
    let mutations = take_mutations(&root);
    assert!(mutations.iter().any(|op| matches!(op, HostOp::Append { .. })));
    assert!(mutations.iter().any(|op| matches!(op, HostOp::Remove { .. })));
}

#[test]
fn test_text_replaced_by_element() {
    let (root, _) = setup();
    root.render(Element::host("p").child("plain")).unwrap();

    root.render(Element::host("p").child(Element::host("em").child("rich"))).unwrap();

    assert_eq!(markup(&root), "<p><em>rich</em></p>");
}

// =============================================================================
// Keyed Lists
// =============================================================================

#[test]
fn test_keyed_reorder_reuses_nodes() {
    let (root, _) = setup();
    root.render(list(&["a", "b", "c", "d"])).unwrap();
    let before = root.with_host(MemoryHost::node_count);

    root.render(list(&["d", "a", "b", "c"])).unwrap();

    assert_eq!(markup(&root), "<ul><li>d</li><li>a</li><li>b</li><li>c</li></ul>");
    assert_eq!(root.with_host(MemoryHost::node_count), before);
}

#[test]
fn test_append_to_list_is_one_insertion() {
    let (root, _) = setup();
    root.render(list(&["a", "b"])).unwrap();
    take_mutations(&root);

    root.render(list(&["a", "b", "c"])).unwrap();

    assert_eq!(markup(&root), "<ul><li>a</li><li>b</li><li>c</li></ul>");
    let mutations = take_mutations(&root);
    assert_eq!(mutations.len(), 1);
    assert!(matches!(mutations[0], HostOp::Append { .. }));
}

#[test]
fn test_prepend_inserts_before_first() {
    let (root, _) = setup();
    root.render(list(&["b", "c"])).unwrap();
    take_mutations(&root);

    root.render(list(&["a", "b", "c"])).unwrap();

    assert_eq!(markup(&root), "<ul><li>a</li><li>b</li><li>c</li></ul>");
    let mutations = take_mutations(&root);
    assert_eq!(mutations.len(), 1);
    assert!(matches!(mutations[0], HostOp::Insert { .. }));
}

#[test]
fn test_remove_from_middle_is_one_removal() {
    let (root, _) = setup();
    root.render(list(&["a", "b", "c"])).unwrap();
    take_mutations(&root);

    root.render(list(&["a", "c"])).unwrap();

    assert_eq!(markup(&root), "<ul><li>a</li><li>c</li></ul>");
    let mutations = take_mutations(&root);
    assert_eq!(mutations.len(), 1);
    assert!(matches!(mutations[0], HostOp::Remove { .. }));
}

#[test]
fn test_unkeyed_text_list_updates_by_position() {
    let (root, _) = setup();
    root.render(Element::host("p").children(["x", "y"])).unwrap();
    take_mutations(&root);

    root.render(Element::host("p").children(["x", "z", "w"])).unwrap();

    assert_eq!(markup(&root), "<p>xzw</p>");
    let mutations = take_mutations(&root);
    assert_eq!(mutations.len(), 2);
}

// =============================================================================
// Function Components
// =============================================================================

#[test]
fn test_component_with_fragment_children() {
    let (root, _) = setup();
    let pair = pair();

    root.render(Element::host("div").child(Element::component(&pair).prop("label", "x")))
        .unwrap();

    assert_eq!(markup(&root), "<div><b>x</b><i>x</i></div>");
}

#[test]
fn test_removing_component_removes_all_its_nodes() {
    let (root, _) = setup();
    let pair = pair();
    root.render(Element::component(&pair).prop("label", "x")).unwrap();

    root.render(Node::Empty).unwrap();

    assert_eq!(markup(&root), "");
}

#[test]
fn test_component_inserted_before_existing_sibling() {
    let (root, _) = setup();
    let pair = pair();
    let tree = |keys: &[&str]| {
        Element::host("div").children(
            keys.iter()
                .map(|k| Element::component(&pair).key(k).prop("label", *k)),
        )
    };
    root.render(tree(&["b"])).unwrap();

    root.render(tree(&["a", "b"])).unwrap();

    assert_eq!(markup(&root), "<div><b>a</b><i>a</i><b>b</b><i>b</i></div>");
}

#[test]
fn test_component_moves_all_its_nodes() {
    let (root, _) = setup();
    let pair = pair();
    let tree = |keys: &[&str]| {
        Element::host("div").children(
            keys.iter()
                .map(|k| Element::component(&pair).key(k).prop("label", *k)),
        )
    };
    root.render(tree(&["a", "b", "c"])).unwrap();

    root.render(tree(&["c", "a", "b"])).unwrap();

    assert_eq!(
        markup(&root),
        "<div><b>c</b><i>c</i><b>a</b><i>a</i><b>b</b><i>b</i></div>"
    );
}

#[test]
fn test_component_swap_remounts() {
    let (root, container) = setup();
    let first = Component::new("First", |_| Ok(Element::host("p").child("first").into()));
    let second = Component::new("Second", |_| Ok(Element::host("p").child("second").into()));
    root.render(Element::component(&first)).unwrap();
    let first_p = root.with_host(|host| host.find_by_tag(container, "p"));

    root.render(Element::component(&second)).unwrap();

    assert_eq!(markup(&root), "<p>second</p>");
    let second_p = root.with_host(|host| host.find_by_tag(container, "p"));
    assert_ne!(first_p, second_p);
}

// =============================================================================
// Double Buffering
// =============================================================================

#[test]
fn test_fiber_count_stays_bounded() {
    let (root, _) = setup();
    let tree = || list(&["a", "b", "c"]);

    root.render(tree()).unwrap();
    root.render(tree()).unwrap();
    let settled = root.fiber_count();

    for _ in 0..5 {
        root.render(tree()).unwrap();
    }

    assert_eq!(root.fiber_count(), settled);
}

#[test]
fn test_deleted_fibers_are_released() {
    let (root, _) = setup();
    root.render(Element::host("div")).unwrap();
    root.render(Element::host("div")).unwrap();
    let baseline = root.fiber_count();

    root.render(Element::host("div").child(list(&["a", "b"]))).unwrap();
    root.render(Element::host("div").child(list(&["a", "b"]))).unwrap();
    root.render(Element::host("div")).unwrap();

    assert_eq!(root.fiber_count(), baseline);
}
