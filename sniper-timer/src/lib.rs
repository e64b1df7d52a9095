//! Frame-aligned countdown timer core.
//!
//! This crate holds everything the Sniper window needs that is not UI:
//! frame/millisecond conversion, the user-entered timer parameters, the
//! background countdown engine and the controller that ties them together.
//! It has no dependency on the windowing toolkit so it can be tested on its own.

pub mod alert;
pub mod constants;
pub mod controller;
pub mod display;
pub mod engine;
pub mod error;
pub mod params;

pub use alert::{Alert, SilentAlert};
pub use controller::{Controller, ResetReason, ScheduledReset, Timings};
pub use display::format_seconds;
pub use engine::{CancelToken, CountdownEngine, EngineEvent, QueuedEvent};
pub use error::{FieldError, TimerError};
pub use params::{validate_field, Field, TimerParams};
