//! Error types for the timer core.

use thiserror::Error;

/// Errors raised while running a countdown.
#[derive(Debug, Error)]
pub enum TimerError {
    /// The operating system refused to spawn the timing thread.
    #[error("failed to spawn countdown thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Reasons a parameter field edit is rejected.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("field accepts digits only")]
    NonDigit,
    #[error("field is limited to {max} digits, got {len}")]
    TooLong { len: usize, max: usize },
}
