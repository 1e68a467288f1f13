//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Panics if a global logger was already installed; use [`try_init`] where
/// that can happen (tests, tools embedding the crate).
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system, returning `false` if a logger already exists
pub fn try_init() -> bool {
    env_logger::try_init().is_ok()
}
