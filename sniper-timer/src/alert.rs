//! Completion alert seam.
//!
//! The engine sounds the alert from its timing thread once per completed
//! countdown. Implementations must return promptly since `stop()` joins that
//! thread.

/// Audible signal emitted when a countdown reaches zero.
pub trait Alert: Send + Sync {
    fn sound(&self);
}

/// Alert that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAlert;

impl Alert for SilentAlert {
    fn sound(&self) {}
}
