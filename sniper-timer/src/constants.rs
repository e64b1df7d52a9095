//! Centralized constants for frame timing, polling intervals, and limits.

/// Frame timing of the target handheld.
pub mod frame {
    /// Native refresh rate of the handheld (frames per second).
    pub const FRAMES_PER_SECOND: f64 = 59.7275;

    /// Duration of a single frame (milliseconds).
    pub const FRAME_MS: f64 = 1000.0 / FRAMES_PER_SECOND;
}

/// Countdown engine constants.
pub mod engine {
    /// Interval between elapsed-time polls on the timing thread (milliseconds).
    /// Also bounds how long `stop()` can block on the join.
    pub const POLL_INTERVAL_MS: u64 = 10;

    /// Name given to the background timing thread.
    pub const THREAD_NAME: &str = "countdown";
}

/// Controller debounce and redraw constants.
pub mod controller {
    /// Delay before resetting the display after an explicit stop (milliseconds).
    /// Avoids flicker when stop and start arrive almost together.
    pub const STOP_RESET_DELAY_MS: u64 = 50;

    /// Grace window after a countdown finishes before the display returns to
    /// the nominal duration (milliseconds). A restart inside the window keeps
    /// the readout untouched.
    pub const FINISH_RESET_DELAY_MS: u64 = 2000;

    /// Interval at which the UI thread drains queued engine events (milliseconds).
    pub const DRAIN_INTERVAL_MS: u64 = 100;
}

/// Numeric input field constants.
pub mod input {
    /// Maximum number of digits accepted by any parameter field.
    pub const MAX_FIELD_DIGITS: usize = 7;
}
