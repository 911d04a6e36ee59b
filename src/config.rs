//! Runtime configuration.
//!
//! Settings live in thread-local state, like everything else the reconciler
//! shares between a root and the hooks running inside it.

use std::cell::Cell;

// =============================================================================
// Config
// =============================================================================

/// Reconciler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Emit diagnostic warnings for malformed trees and late state updates.
    pub dev_warnings: bool,
    /// How many times a root may re-render because of updates dispatched
    /// while it was rendering before the update is rejected.
    pub nested_update_limit: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            dev_warnings: cfg!(debug_assertions),
            nested_update_limit: 50,
        }
    }
}

thread_local! {
    static CONFIG: Cell<ReconcilerConfig> = Cell::new(ReconcilerConfig::default());
}

/// Get the current configuration.
pub fn config() -> ReconcilerConfig {
    CONFIG.with(Cell::get)
}

/// Replace the configuration.
pub fn set_config(config: ReconcilerConfig) {
    CONFIG.with(|c| c.set(config));
}

/// Restore the default configuration (for testing).
pub fn reset_config() {
    set_config(ReconcilerConfig::default());
}

/// Whether dev warnings are enabled.
pub fn dev_warnings_enabled() -> bool {
    config().dev_warnings
}

/// `tracing::warn!` that only fires when dev warnings are enabled.
macro_rules! dev_warn {
    ($($arg:tt)*) => {
        if $crate::config::dev_warnings_enabled() {
            ::tracing::warn!($($arg)*);
        }
    };
}

pub(crate) use dev_warn;

// =============================================================================
// Tests
// =============================================================================
