//! `use_state` across renders, dispatch scheduling, and hook errors.
//!
//! Run with: cargo test --test hooks

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use spark_fiber::{
    create_container, reset_config, set_config, use_state, use_state_with, Component, Dispatch,
    Element, HostNodeId, MemoryHost, Node, ReconcilerConfig, RenderError, Root,
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

type Slot<S> = Rc<RefCell<Option<Dispatch<S>>>>;

/// Component rendering its state as text and leaking its dispatch handle.
fn counter(slot: &Slot<i32>, renders: &Rc<Cell<u32>>) -> Component {
    let slot = slot.clone();
    let renders = renders.clone();
    Component::new("Counter", move |_| {
        renders.set(renders.get() + 1);
        let (count, set_count) = use_state(0)?;
        *slot.borrow_mut() = Some(set_count);
        Ok(Node::from(count))
    })
}

fn dispatch_of<S>(slot: &Slot<S>) -> Dispatch<S> {
    slot.borrow().clone().unwrap()
}

// =============================================================================
// State
// =============================================================================

#[test]
fn test_state_survives_rerender() {
    let (root, _) = setup();
    let slot: Slot<i32> = Rc::default();
    let renders = Rc::new(Cell::new(0));
    let counter = counter(&slot, &renders);
    root.render(Element::component(&counter)).unwrap();
    assert_eq!(markup(&root), "0");

    dispatch_of(&slot).set(5).unwrap();
    assert_eq!(markup(&root), "5");

    dispatch_of(&slot).update(|n| n + 1).unwrap();
    assert_eq!(markup(&root), "6");
    assert_eq!(renders.get(), 3);

    root.render(Element::component(&counter)).unwrap();
    assert_eq!(markup(&root), "6");
}

#[test]
fn test_dispatch_handles_are_stable() {
    let (root, _) = setup();
    let slot: Slot<i32> = Rc::default();
    let counter = counter(&slot, &Rc::new(Cell::new(0)));
    root.render(Element::component(&counter)).unwrap();
    let first = dispatch_of(&slot);

    first.set(1).unwrap();

    assert_eq!(dispatch_of(&slot), first);
}

#[test]
fn test_use_state_with_runs_producer_once() {
    let (root, _) = setup();
    let calls = Rc::new(Cell::new(0));
    let lazy = {
        let calls = calls.clone();
        Component::new("Lazy", move |_| {
            let (value, _) = use_state_with(|| {
                calls.set(calls.get() + 1);
                String::from("init")
            })?;
            Ok(Node::from(value))
        })
    };

    root.render(Element::component(&lazy)).unwrap();
    root.render(Element::component(&lazy)).unwrap();
    root.render(Element::component(&lazy)).unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(markup(&root), "init");
}

#[test]
fn test_state_follows_keys() {
    let (root, _) = setup();
    let slots: Rc<RefCell<HashMap<String, Dispatch<i32>>>> = Rc::default();
    let item = {
        let slots = slots.clone();
        Component::new("Item", move |props| {
            let label = props.get_str("label").unwrap_or_default().to_string();
            let (count, set_count) = use_state(0)?;
            slots.borrow_mut().insert(label.clone(), set_count);
            Ok(Element::host("li").child(format!("{label}:{count}")).into())
        })
    };
    let tree = |keys: &[&str]| {
        Element::host("ul").children(
            keys.iter()
                .map(|k| Element::component(&item).key(k).prop("label", *k)),
        )
    };
    root.render(tree(&["a", "b"])).unwrap();

    let set_a = slots.borrow()["a"].clone();
    set_a.set(5).unwrap();
    assert_eq!(markup(&root), "<ul><li>a:5</li><li>b:0</li></ul>");

    root.render(tree(&["b", "a"])).unwrap();
    assert_eq!(markup(&root), "<ul><li>b:0</li><li>a:5</li></ul>");
}

#[test]
fn test_remount_resets_state() {
    let (root, _) = setup();
    let slot: Slot<i32> = Rc::default();
    let counter = counter(&slot, &Rc::new(Cell::new(0)));
    root.render(Element::component(&counter).key("one")).unwrap();
    dispatch_of(&slot).set(9).unwrap();

    root.render(Element::component(&counter).key("two")).unwrap();

    assert_eq!(markup(&root), "0");
}

// =============================================================================
// Render-Phase Updates
// =============================================================================

#[test]
fn test_render_phase_update_rerenders_after_commit() {
    let (root, _) = setup();
    let climber = Component::new("Climber", |_| {
        let (n, set_n) = use_state(0)?;
        if n < 3 {
            set_n.set(n + 1)?;
        }
        Ok(Node::from(n))
    });

    root.render(Element::component(&climber)).unwrap();

    assert_eq!(markup(&root), "3");
}

#[test]
fn test_pending_update_last_write_wins() {
    let (root, _) = setup();
    let double = Component::new("Double", |_| {
        let (n, set_n) = use_state(0)?;
        if n == 0 {
            set_n.update(|n| n + 10)?;
            set_n.update(|n| n + 1)?;
        }
        Ok(Node::from(n))
    });

    root.render(Element::component(&double)).unwrap();

    assert_eq!(markup(&root), "1");
}

#[test]
fn test_endless_render_phase_updates_fail() {
    let (root, _) = setup();
    set_config(ReconcilerConfig {
        nested_update_limit: 5,
        ..ReconcilerConfig::default()
    });
    let runaway = Component::new("Runaway", |_| {
        let (n, set_n) = use_state(0)?;
        set_n.set(n + 1)?;
        Ok(Node::from(n))
    });

    let err = root.render(Element::component(&runaway)).unwrap_err();
    reset_config();

    assert_eq!(err, RenderError::TooManyRerenders { limit: 5 });
}

// =============================================================================
// Borrowed Host
// =============================================================================

#[test]
fn test_dispatch_while_host_borrowed_stays_queued() {
    let (root, _) = setup();
    let slot: Slot<i32> = Rc::default();
    let renders = Rc::new(Cell::new(0));
    let counter = counter(&slot, &renders);
    root.render(Element::component(&counter)).unwrap();
    let set_count = dispatch_of(&slot);

    let result = root.with_host(|_| set_count.set(4));

    assert_eq!(result, Err(RenderError::RootBorrowed));
    assert_eq!(markup(&root), "0");
    assert_eq!(renders.get(), 1);

    root.render(Element::component(&counter)).unwrap();
    assert_eq!(markup(&root), "4");
}

#[test]
fn test_is_rendering_only_inside_render() {
    let (root, _) = setup();
    let handle: Rc<RefCell<Option<Root<MemoryHost>>>> = Rc::default();
    let seen = Rc::new(Cell::new(false));
    let watcher = {
        let handle = handle.clone();
        let seen = seen.clone();
        Component::new("Watcher", move |_| {
            if let Some(root) = handle.borrow().as_ref() {
                seen.set(root.is_rendering());
            }
            Ok(Node::Empty)
        })
    };
    *handle.borrow_mut() = Some(root.clone());

    assert!(!root.is_rendering());
    root.render(Element::component(&watcher)).unwrap();

    assert!(seen.get());
    assert!(!root.is_rendering());
    handle.borrow_mut().take();
}

// =============================================================================
// Unmounting
// =============================================================================

#[test]
fn test_dispatch_after_root_dropped() {
    let (root, _) = setup();
    let slot: Slot<i32> = Rc::default();
    let counter = counter(&slot, &Rc::new(Cell::new(0)));
    root.render(Element::component(&counter)).unwrap();
    let set_count = dispatch_of(&slot);

    drop(root);

    assert_eq!(set_count.set(1), Err(RenderError::RootUnmounted));
}

#[test]
fn test_dispatch_to_unmounted_component_is_ignored() {
    let (root, _) = setup();
    let slot: Slot<i32> = Rc::default();
    let renders = Rc::new(Cell::new(0));
    let counter = counter(&slot, &renders);
    root.render(Element::component(&counter)).unwrap();
    let set_count = dispatch_of(&slot);
    root.render(Node::Empty).unwrap();
    root.with_host_mut(MemoryHost::take_ops);

    assert_eq!(set_count.set(3), Ok(()));

    assert_eq!(renders.get(), 1);
    assert!(root.with_host(|host| host.ops().is_empty()));
    assert_eq!(markup(&root), "");
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_hook_outside_render() {
    assert_eq!(use_state(0).unwrap_err(), RenderError::InvalidHookCall);
}

#[test]
fn test_extra_hook_call_fails() {
    let (root, _) = setup();
    let extra = Rc::new(Cell::new(false));
    let flaky = {
        let extra = extra.clone();
        Component::new("Flaky", move |_| {
            let (a, _) = use_state(1)?;
            if extra.get() {
                use_state(2)?;
            }
            Ok(Node::from(a))
        })
    };
    root.render(Element::component(&flaky)).unwrap();

    extra.set(true);
    let err = root.render(Element::component(&flaky)).unwrap_err();

    assert_eq!(
        err,
        RenderError::HookCountMismatch {
            expected: 1,
            rendered: 2
        }
    );
    assert_eq!(markup(&root), "1");
}

#[test]
fn test_missing_hook_call_fails() {
    let (root, _) = setup();
    let skip = Rc::new(Cell::new(false));
    let flaky = {
        let skip = skip.clone();
        Component::new("Flaky", move |_| {
            if skip.get() {
                return Ok(Node::from("skipped"));
            }
            let (a, _) = use_state(1)?;
            Ok(Node::from(a))
        })
    };
    root.render(Element::component(&flaky)).unwrap();

    skip.set(true);
    let err = root.render(Element::component(&flaky)).unwrap_err();

    assert_eq!(
        err,
        RenderError::HookCountMismatch {
            expected: 1,
            rendered: 0
        }
    );
}

#[test]
fn test_hook_type_change_fails() {
    let (root, _) = setup();
    let as_text = Rc::new(Cell::new(false));
    let shifty = {
        let as_text = as_text.clone();
        Component::new("Shifty", move |_| {
            if as_text.get() {
                let (s, _) = use_state(String::new())?;
                return Ok(Node::from(s));
            }
            let (n, _) = use_state(0)?;
            Ok(Node::from(n))
        })
    };
    root.render(Element::component(&shifty)).unwrap();

    as_text.set(true);
    let err = root.render(Element::component(&shifty)).unwrap_err();

    assert_eq!(err, RenderError::HookStateMismatch { index: 0 });
}

#[test]
fn test_failed_render_keeps_committed_state() {
    let (root, _) = setup();
    let fail = Rc::new(Cell::new(false));
    let slot: Slot<i32> = Rc::default();
    let fragile = {
        let fail = fail.clone();
        let slot = slot.clone();
        Component::new("Fragile", move |_| {
            let (n, set_n) = use_state(0)?;
            *slot.borrow_mut() = Some(set_n);
            if fail.get() {
                return Err(RenderError::component("Fragile", "refused"));
            }
            Ok(Node::from(n))
        })
    };
    root.render(Element::component(&fragile)).unwrap();
    let fibers = root.fiber_count();

    fail.set(true);
    let err = dispatch_of(&slot).set(4).unwrap_err();
    assert_eq!(err, RenderError::component("Fragile", "refused"));
    assert_eq!(markup(&root), "0");
    assert_eq!(root.fiber_count(), fibers);

    fail.set(false);
    dispatch_of(&slot).set(7).unwrap();
    assert_eq!(markup(&root), "7");
}

// =============================================================================
// Nested Roots
// =============================================================================

#[test]
fn test_render_other_root_from_component() {
    let (outer, _) = setup();
    let (inner, _) = setup();
    let bridge = {
        let inner = inner.clone();
        Component::new("Bridge", move |_| {
            let (n, _) = use_state(7)?;
            inner.render(Element::host("i").child(n))?;
            let (m, _) = use_state(1)?;
            Ok(Node::from(n + m))
        })
    };

    outer.render(Element::component(&bridge)).unwrap();
    outer.render(Element::component(&bridge)).unwrap();

    assert_eq!(markup(&outer), "8");
    assert_eq!(markup(&inner), "<i>7</i>");
}
