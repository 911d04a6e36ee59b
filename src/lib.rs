//! # spark-fiber
//!
//! Fiber reconciler with hooks for declarative UI trees.
//!
//! ## Architecture
//!
//! Components describe UI as immutable [`Element`] trees. The reconciler
//! keeps a mutable fiber per tree position, diffs each new element tree
//! against the committed fibers, and applies the minimal set of mutations
//! to a host (a DOM, a terminal, the in-memory [`MemoryHost`]):
//!
//! ```text
//! Element tree → render phase (begin/complete, flags) → commit phase → HostConfig
//! ```
//!
//! Every render is synchronous and covers the whole tree. Fibers are
//! double-buffered: each position keeps the committed fiber and its
//! alternate, and a render recycles the alternate.
//!
//! ## Example
//!
//! ```ignore
//! use spark_fiber::{create_container, use_state, Component, Element, MemoryHost};
//!
//! let counter = Component::new("Counter", |_| {
//!     let (count, set_count) = use_state(0)?;
//!     Ok(Element::host("button")
//!         .on("onClick", move |_| {
//!             let _ = set_count.update(|n| n + 1);
//!         })
//!         .child(count)
//!         .into())
//! });
//!
//! let mut host = MemoryHost::new();
//! let container = host.create_container();
//! let root = create_container(host, container);
//! root.render(Element::component(&counter))?;
//! ```
//!
//! ## Modules
//!
//! - [`element`] - Element descriptors, props, components
//! - [`fiber`] - Fiber nodes, flags, the fiber arena
//! - [`hooks`] - `use_state` and the render context
//! - [`reconciler`] - Child diffing, work loop, commit, roots
//! - [`host`] - Host adapter trait and the in-memory host
//! - [`events`] - Synthetic capture/bubble events
//! - [`update_queue`] - Single-slot update queues
//! - [`config`] - Runtime settings

pub mod config;
pub mod element;
pub mod error;
pub mod events;
pub mod fiber;
pub mod hooks;
pub mod host;
pub mod reconciler;
pub mod update_queue;

// Re-export commonly used items
pub use config::{config, reset_config, set_config, ReconcilerConfig};

pub use element::{Component, Element, ElementRef, ElementType, Key, Node, PropValue, Props, RenderResult};

pub use error::{EventError, RenderError};

pub use events::{dispatch_event, EventCallback, EventTree, SyntheticEvent};

pub use hooks::{is_rendering, use_state, use_state_with, Dispatch};

pub use host::{HostConfig, HostNodeId, HostOp, MemoryHost};

pub use reconciler::{create_container, update_container, Root};

pub use update_queue::Action;
