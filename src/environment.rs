//! Process-wide engine environment.
//!
//! [`init`] runs once per process (or once after each [`shutdown`]) and is
//! called implicitly whenever a canvas is constructed, so calling it yourself
//! is optional. [`shutdown`] releases shared engine state such as the loaded
//! font database; canvases created afterwards re-initialize on demand.

use std::sync::atomic::{AtomicBool, Ordering};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Set up the engine environment. Repeated calls are no-ops.
pub fn init() {
    if INITIALIZED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
    {
        log::debug!(target: "canvas", "engine environment initialized");
    }
}

/// Tear down the engine environment. A no-op unless [`init`] ran.
pub fn shutdown() {
    if INITIALIZED
        .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
    {
        crate::imaging::release_fonts();
        log::debug!(target: "canvas", "engine environment shut down");
    }
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Other tests construct canvases concurrently, which calls `init`, so
    // only assert what holds regardless of interleaving.
    #[test]
    fn init_is_idempotent() {
        init();
        init();
        assert!(is_initialized());
    }

    #[test]
    fn shutdown_then_init_reinitializes() {
        shutdown();
        shutdown();
        init();
        assert!(is_initialized());
    }
}
