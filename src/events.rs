//! Synthetic events - Capture/bubble dispatch over stored props.
//!
//! The reconciler stores each host component's props on its host instance
//! (see [`HostConfig::update_fiber_props`](crate::host::HostConfig::update_fiber_props)).
//! This module walks from an event target up to the container, reading those
//! props to build two callback chains:
//!
//! - capture: `on<Event>Capture` callbacks, outermost ancestor first
//! - bubble: `on<Event>` callbacks, target first
//!
//! Capture runs before bubble. Calling [`SyntheticEvent::stop_propagation`]
//! stops the chain that is running and skips bubbling.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::element::Props;
use crate::error::EventError;

/// Event callback stored as a prop.
pub type EventCallback = Rc<dyn Fn(&SyntheticEvent)>;

// =============================================================================
// Synthetic Event
// =============================================================================

/// Event passed to callbacks.
#[derive(Debug)]
pub struct SyntheticEvent {
    event_type: String,
    propagation_stopped: Cell<bool>,
}

impl SyntheticEvent {
    /// Create an event of the given type.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Stop running further callbacks for this event.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

// =============================================================================
// Event Tree
// =============================================================================

/// Host tree as seen by the event system.
pub trait EventTree {
    type Node: Clone + PartialEq;

    /// Props stored on `node` by the reconciler, if any.
    fn stored_props(&self, node: &Self::Node) -> Option<&Props>;

    /// Host parent of `node`.
    fn parent_of(&self, node: &Self::Node) -> Option<Self::Node>;
}

/// Callback prop names for an event type: `(capture, bubble)`.
pub fn callback_names(event_type: &str) -> Option<(&'static str, &'static str)> {
    match event_type {
        "click" => Some(("onClickCapture", "onClick")),
        _ => None,
    }
}

// =============================================================================
// Paths
// =============================================================================

/// Collected callback chains for one dispatch.
#[derive(Default, Clone)]
pub struct Paths {
    pub capture: Vec<EventCallback>,
    pub bubble: Vec<EventCallback>,
}

impl Paths {
    /// Run capture callbacks, then bubble callbacks unless propagation was stopped.
    pub fn dispatch(&self, event: &SyntheticEvent) {
        trigger_event_flow(&self.capture, event);
        if !event.is_propagation_stopped() {
            trigger_event_flow(&self.bubble, event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.capture.is_empty() && self.bubble.is_empty()
    }
}

impl fmt::Debug for Paths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paths")
            .field("capture", &self.capture.len())
            .field("bubble", &self.bubble.len())
            .finish()
    }
}

/// Walk from `target` up to (not including) `container`, collecting callbacks.
pub fn collect_paths<T: EventTree>(
    tree: &T,
    container: &T::Node,
    target: &T::Node,
    event_type: &str,
) -> Result<Paths, EventError> {
    let (capture_name, bubble_name) = callback_names(event_type)
        .ok_or_else(|| EventError::UnsupportedEventType(event_type.to_string()))?;

    let mut paths = Paths::default();
    let mut node = Some(target.clone());

    while let Some(current) = node {
        if &current == container {
            break;
        }
        if let Some(props) = tree.stored_props(&current) {
            if let Some(callback) = props.callback(capture_name) {
                paths.capture.insert(0, callback.clone());
            }
            if let Some(callback) = props.callback(bubble_name) {
                paths.bubble.push(callback.clone());
            }
        }
        node = tree.parent_of(&current);
    }

    Ok(paths)
}

fn trigger_event_flow(callbacks: &[EventCallback], event: &SyntheticEvent) {
    for callback in callbacks {
        callback(event);
        if event.is_propagation_stopped() {
            break;
        }
    }
}

/// Collect and run callbacks for an event on `target`.
///
/// Callbacks run while `tree` is still borrowed. To let callbacks update
/// state on a mounted root, go through
/// [`Root::dispatch_event`](crate::reconciler::Root::dispatch_event), which
/// collects the paths first and runs them after releasing the host.
pub fn dispatch_event<T: EventTree>(
    tree: &T,
    container: &T::Node,
    target: &T::Node,
    event_type: &str,
) -> Result<SyntheticEvent, EventError> {
    let paths = collect_paths(tree, container, target, event_type)?;
    let event = SyntheticEvent::new(event_type);
    paths.dispatch(&event);
    Ok(event)
}

// =============================================================================
// Tests
// =============================================================================
