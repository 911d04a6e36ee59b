//! Fibers - The mutable work units mirroring the element tree.
//!
//! # Architecture
//!
//! Fibers are not heap objects pointing at each other. They live in an
//! arena and refer to each other by [`FiberId`]:
//!
//! ```text
//! HostRoot ── child ──> div ── child ──> "hello"
//!    ▲                   │ ▲
//!    └──── return ───────┘ └─ alternate ─> div (previous render)
//! ```
//!
//! - `child` / `sibling`: the tree
//! - `return_fiber`: parent, for upward walks
//! - `alternate`: the same position in the other generation (double buffer)

mod arena;
mod flags;
mod node;

pub use arena::FiberArena;
pub use flags::Flags;
pub use node::{Fiber, FiberId, MemoizedState, RootQueue, WorkTag};
