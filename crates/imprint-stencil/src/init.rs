//! One-time process-wide initialization.
//!
//! The foreign parser library requires a single global setup call before
//! its first use. The host invokes [`initialize`] once, ahead of the
//! first compilation; repeated calls are harmless. There is no teardown:
//! the state lives for the rest of the process.

use parking_lot::Once;
use tracing::debug;

static INIT: Once = Once::new();

/// Perform one-time global setup for the stencil frontend.
///
/// Safe to call from multiple threads; only the first call runs setup,
/// and every call returns only after setup has completed.
pub fn initialize() {
    INIT.call_once(|| {
        // The foreign parser's own global setup happens behind this
        // call; today the frontend side only needs the marker.
        debug!("stencil frontend initialized");
    });
}

/// Whether [`initialize`] has completed.
pub fn is_initialized() -> bool {
    INIT.state().done()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_idempotent() {
        initialize();
        initialize();
        assert!(is_initialized());
    }
}
