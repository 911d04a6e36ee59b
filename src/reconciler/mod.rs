//! Reconciler - Render phase, commit phase, and the root that drives them.
//!
//! # Pipeline
//!
//! ```text
//! update_container / Dispatch
//!        │
//!        ▼
//!   RootCell::schedule ──> perform_sync_work_on_root
//!                                │
//!                 ┌──────────────┴──────────────┐
//!                 ▼                             ▼
//!        render_root (render phase)      commit_root (commit phase)
//!   begin_work ──> reconcile children    walk flagged fibers,
//!   complete_work ──> build instances    mutate the host tree
//! ```
//!
//! The render phase only touches fibers and detached host instances. The
//! host tree is mutated during commit, and only after a render pass
//! finished without error.

mod begin_work;
mod child_fibers;
mod commit_work;
mod complete_work;
mod root;
mod work_loop;

pub use root::{create_container, update_container, Root};

use crate::error::RenderError;
use crate::fiber::FiberId;

/// Entry point hooks use to request a re-render of their root.
pub(crate) trait Schedule {
    /// Re-render the root that owns `fiber`, synchronously.
    fn schedule_update_on_fiber(&self, fiber: FiberId) -> Result<(), RenderError>;
}
