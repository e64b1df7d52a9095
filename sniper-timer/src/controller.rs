//! Countdown controller.
//!
//! Owns the timer parameters, the active-session counter and the current
//! engine. All methods run on the UI thread; the only cross-thread traffic is
//! the event queue fed by the engine and emptied by [`Controller::drain`].
//!
//! Delayed display resets are not scheduled here. Methods that need one
//! return a [`ScheduledReset`] for the host to fire later through
//! [`Controller::fire_reset`], which re-checks the session counter at that point.

use crate::alert::Alert;
use crate::constants::controller::{FINISH_RESET_DELAY_MS, STOP_RESET_DELAY_MS};
use crate::display::format_seconds;
use crate::engine::{CountdownEngine, EngineEvent, QueuedEvent};
use crate::error::{FieldError, TimerError};
use crate::params::{Field, TimerParams};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Debounce windows for display resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Delay between an explicit stop and the display reset
    pub stop_reset_delay: Duration,
    /// Grace window between completion and the display reset
    pub finish_reset_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            stop_reset_delay: Duration::from_millis(STOP_RESET_DELAY_MS),
            finish_reset_delay: Duration::from_millis(FINISH_RESET_DELAY_MS),
        }
    }
}

/// Why a display reset was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    Stopped,
    Finished,
}

/// A display reset the host should fire after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledReset {
    pub delay: Duration,
    pub reason: ResetReason,
}

pub struct Controller {
    params: TimerParams,
    timings: Timings,
    alert: Arc<dyn Alert>,
    sender: UnboundedSender<QueuedEvent>,
    receiver: UnboundedReceiver<QueuedEvent>,
    engine: Option<CountdownEngine>,
    /// Started-but-not-finished sessions; gates display resets
    active_sessions: u32,
    running: bool,
    display_ms: f64,
}

impl Controller {
    pub fn new(params: TimerParams, timings: Timings, alert: Arc<dyn Alert>) -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            display_ms: params.duration_ms(),
            params,
            timings,
            alert,
            sender,
            receiver,
            engine: None,
            active_sessions: 0,
            running: false,
        }
    }

    pub fn params(&self) -> &TimerParams {
        &self.params
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    pub fn set_timings(&mut self, timings: Timings) {
        self.timings = timings;
    }

    /// Replace the completion alert. Takes effect from the next start.
    pub fn set_alert(&mut self, alert: Arc<dyn Alert>) {
        self.alert = alert;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn active_sessions(&self) -> u32 {
        self.active_sessions
    }

    /// Remaining time currently shown, in milliseconds.
    pub fn display_ms(&self) -> f64 {
        self.display_ms
    }

    /// Readout text, seconds with one decimal.
    pub fn display_text(&self) -> String {
        format_seconds(self.display_ms)
    }

    /// Countdown length for the current parameters.
    pub fn compute_duration(&self) -> f64 {
        self.params.duration_ms()
    }

    /// Apply a field edit. The readout follows the new nominal duration when idle.
    pub fn set_field(&mut self, field: Field, text: &str) -> Result<(), FieldError> {
        self.params.set(field, text)?;
        if !self.running {
            self.refresh_display();
        }
        Ok(())
    }

    /// Correct the lag offset from the observed hit frame.
    pub fn update_lag(&mut self) -> bool {
        let before = self.params.lag_offset_ms;
        if !self.params.update_lag() {
            tracing::debug!("No frame hit entered, lag unchanged");
            return false;
        }
        tracing::info!(
            "Lag corrected: {}ms -> {}ms (target {}, hit {})",
            before,
            self.params.lag_offset_ms,
            self.params.target_frame,
            self.params.observed_hit_frame
        );
        if !self.running {
            self.refresh_display();
        }
        true
    }

    /// Start a fresh countdown, replacing any run in progress.
    ///
    /// The previous run is cancelled without scheduling a reset so a quick
    /// restart never flashes the nominal duration.
    pub fn start_timer(&mut self) -> Result<(), TimerError> {
        self.cancel_current();
        self.running = true;
        self.active_sessions += 1;

        let duration_ms = self.compute_duration();
        self.display_ms = duration_ms;

        let mut engine = CountdownEngine::new(self.sender.clone(), Arc::clone(&self.alert));
        if let Err(err) = engine.start(duration_ms) {
            self.running = false;
            self.active_sessions = self.active_sessions.saturating_sub(1);
            return Err(err);
        }
        self.engine = Some(engine);

        tracing::info!(
            "Timer started: {:.1}ms ({} active)",
            duration_ms,
            self.active_sessions
        );
        Ok(())
    }

    /// Stop the countdown and request a display reset.
    pub fn stop_timer(&mut self) -> ScheduledReset {
        self.cancel_current();
        self.drain();
        tracing::info!("Timer stopped ({} active)", self.active_sessions);
        ScheduledReset {
            delay: self.timings.stop_reset_delay,
            reason: ResetReason::Stopped,
        }
    }

    /// Spacebar behaviour: start when idle, stop when running.
    pub fn toggle(&mut self) -> Result<Option<ScheduledReset>, TimerError> {
        if self.running {
            Ok(Some(self.stop_timer()))
        } else {
            self.start_timer().map(|()| None)
        }
    }

    /// Execute every queued engine event in order.
    ///
    /// Returns the resets requested by sessions that finished during the drain.
    pub fn drain(&mut self) -> Vec<ScheduledReset> {
        let mut resets = Vec::new();
        while let Ok(queued) = self.receiver.try_recv() {
            let Some(event) = queued.resolve() else {
                continue;
            };
            match event {
                EngineEvent::Tick { time_left_ms } => self.display_ms = time_left_ms,
                EngineEvent::Finished => resets.extend(self.on_finish()),
            }
        }
        resets
    }

    /// Reset the readout to the nominal duration if nothing started meanwhile.
    ///
    /// Returns whether the reset was applied.
    pub fn fire_reset(&mut self, reason: ResetReason) -> bool {
        if self.running || self.active_sessions > 0 {
            tracing::debug!("Skipping {:?} reset, a countdown is active", reason);
            return false;
        }
        self.drain();
        self.refresh_display();
        tracing::debug!("Display reset after {:?}", reason);
        true
    }

    fn on_finish(&mut self) -> Option<ScheduledReset> {
        self.active_sessions = self.active_sessions.saturating_sub(1);
        tracing::info!("Timer finished ({} active)", self.active_sessions);
        if self.active_sessions > 0 {
            return None;
        }
        self.running = false;
        Some(ScheduledReset {
            delay: self.timings.finish_reset_delay,
            reason: ResetReason::Finished,
        })
    }

    fn cancel_current(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.stop();
        }
        self.running = false;
        self.active_sessions = self.active_sessions.saturating_sub(1);
    }

    fn refresh_display(&mut self) {
        self.display_ms = self.compute_duration();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::SilentAlert;
    use crate::constants::frame::FRAME_MS;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Instant;

    #[derive(Default)]
    struct CountingAlert(AtomicUsize);

    impl Alert for CountingAlert {
        fn sound(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn controller_with(target_frame: u32, lag_offset_ms: i64) -> Controller {
        let params = TimerParams {
            lag_offset_ms,
            target_frame,
            observed_hit_frame: 0,
        };
        Controller::new(params, Timings::default(), Arc::new(SilentAlert))
    }

    /// Drain until a session finishes or the deadline passes.
    fn drain_until_finished(controller: &mut Controller, limit: Duration) -> Vec<ScheduledReset> {
        let deadline = Instant::now() + limit;
        let mut resets = Vec::new();
        while Instant::now() < deadline {
            resets.extend(controller.drain());
            if !resets.is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        resets
    }

    #[test]
    fn test_initial_display_is_nominal() {
        let controller = controller_with(60, 0);
        assert!(!controller.is_running());
        assert_eq!(controller.display_text(), "1.0");
    }

    #[test]
    fn test_set_field_refreshes_idle_display() {
        let mut controller = controller_with(0, 0);
        assert_eq!(controller.display_text(), "0.0");
        controller.set_field(Field::TargetFrame, "600").unwrap();
        assert_eq!(controller.display_text(), "10.0");
        assert!(controller.set_field(Field::Lag, "12ms").is_err());
        assert_eq!(controller.params().lag_offset_ms, 0);
    }

    #[test]
    fn test_full_countdown() {
        let alert = Arc::new(CountingAlert::default());
        let params = TimerParams {
            lag_offset_ms: 0,
            target_frame: 60,
            observed_hit_frame: 0,
        };
        let mut controller = Controller::new(params, Timings::default(), alert.clone());

        controller.start_timer().unwrap();
        assert!(controller.is_running());
        assert_eq!(controller.active_sessions(), 1);
        assert!((controller.display_ms() - 60.0 * FRAME_MS).abs() < 1e-9);
        assert_eq!(controller.display_text(), "1.0");

        let resets = drain_until_finished(&mut controller, Duration::from_secs(5));
        assert_eq!(
            resets,
            vec![ScheduledReset {
                delay: Duration::from_millis(FINISH_RESET_DELAY_MS),
                reason: ResetReason::Finished,
            }]
        );
        assert_eq!(controller.display_text(), "0.0");
        assert!(!controller.is_running());
        assert_eq!(controller.active_sessions(), 0);
        assert_eq!(alert.0.load(Ordering::SeqCst), 1);

        // No second finish and no further ticks after completion
        thread::sleep(Duration::from_millis(50));
        let resets = controller.drain();
        assert!(resets.is_empty());
        assert_eq!(controller.display_text(), "0.0");
        assert_eq!(alert.0.load(Ordering::SeqCst), 1);

        // Grace window expires with nothing running
        assert!(controller.fire_reset(ResetReason::Finished));
        assert_eq!(controller.display_text(), "1.0");
    }

    #[test]
    fn test_stop_drops_late_updates() {
        let mut controller = controller_with(600, 0);
        controller.start_timer().unwrap();
        thread::sleep(Duration::from_millis(150));
        controller.drain();
        let shown = controller.display_ms();
        assert!(shown < 600.0 * FRAME_MS);

        let reset = controller.stop_timer();
        assert_eq!(reset.reason, ResetReason::Stopped);
        assert_eq!(reset.delay, Duration::from_millis(STOP_RESET_DELAY_MS));
        let after_stop = controller.display_ms();

        // Ticks queued before the stop must not move the readout
        thread::sleep(Duration::from_millis(50));
        let resets = controller.drain();
        assert!(resets.is_empty());
        assert_eq!(controller.display_ms(), after_stop);
        assert!(!controller.is_running());
        assert_eq!(controller.active_sessions(), 0);

        assert!(controller.fire_reset(ResetReason::Stopped));
        assert!((controller.display_ms() - 600.0 * FRAME_MS).abs() < 1e-9);
    }

    #[test]
    fn test_restart_never_finishes_old_run() {
        let alert = Arc::new(CountingAlert::default());
        let params = TimerParams {
            lag_offset_ms: 0,
            target_frame: 600,
            observed_hit_frame: 0,
        };
        let mut controller = Controller::new(params, Timings::default(), alert.clone());

        controller.start_timer().unwrap();
        thread::sleep(Duration::from_millis(30));
        controller.start_timer().unwrap();
        assert_eq!(controller.active_sessions(), 1);

        // The first run never reports a finish
        thread::sleep(Duration::from_millis(100));
        let resets = controller.drain();
        assert!(resets.is_empty());
        assert!(controller.is_running());
        assert_eq!(controller.active_sessions(), 1);
        assert_eq!(alert.0.load(Ordering::SeqCst), 0);

        controller.stop_timer();
        assert_eq!(controller.active_sessions(), 0);
    }

    #[test]
    fn test_quick_restart_suppresses_resets() {
        let mut controller = controller_with(600, 0);
        controller.start_timer().unwrap();
        thread::sleep(Duration::from_millis(30));

        let stop_reset = controller.stop_timer();
        controller.start_timer().unwrap();
        thread::sleep(Duration::from_millis(120));
        controller.drain();
        let counting = controller.display_ms();
        assert!(counting < 600.0 * FRAME_MS);

        // Both the stop reset and a stale finish reset land mid-countdown
        assert!(!controller.fire_reset(stop_reset.reason));
        assert!(!controller.fire_reset(ResetReason::Finished));
        assert_eq!(controller.display_ms(), counting);

        controller.stop_timer();
    }

    #[test]
    fn test_restart_inside_finish_grace_window() {
        let mut controller = controller_with(3, 0);
        controller.start_timer().unwrap();
        let resets = drain_until_finished(&mut controller, Duration::from_secs(5));
        assert_eq!(resets.len(), 1);

        controller.set_field(Field::TargetFrame, "600").unwrap();
        controller.start_timer().unwrap();
        assert_eq!(controller.active_sessions(), 1);
        assert!(!controller.fire_reset(ResetReason::Finished));
        assert!(controller.is_running());

        controller.stop_timer();
    }

    #[test]
    fn test_stop_inside_finish_grace_window() {
        let mut controller = controller_with(3, 0);
        controller.start_timer().unwrap();
        let resets = drain_until_finished(&mut controller, Duration::from_secs(5));
        assert_eq!(resets.len(), 1);
        assert_eq!(controller.display_text(), "0.0");

        // Stop while idle still schedules the short reset
        let reset = controller.stop_timer();
        assert_eq!(reset.reason, ResetReason::Stopped);
        assert_eq!(controller.active_sessions(), 0);
        assert!(controller.fire_reset(reset.reason));
        assert!((controller.display_ms() - 3.0 * FRAME_MS).abs() < 1e-9);
    }

    #[test]
    fn test_space_typed_into_field_is_rejected() {
        let mut controller = controller_with(100, 0);
        controller.set_field(Field::FrameHit, "90").unwrap();
        assert_eq!(
            controller.set_field(Field::FrameHit, "90 "),
            Err(FieldError::NonDigit)
        );
        assert_eq!(controller.params().observed_hit_frame, 90);
    }

    #[test]
    fn test_edit_while_running_keeps_readout() {
        let mut controller = controller_with(600, 0);
        controller.start_timer().unwrap();
        let shown = controller.display_ms();
        controller.set_field(Field::TargetFrame, "6").unwrap();
        assert_eq!(controller.display_ms(), shown);
        controller.stop_timer();
    }

    #[test]
    fn test_toggle() {
        let mut controller = controller_with(600, 0);
        assert_eq!(controller.toggle().unwrap(), None);
        assert!(controller.is_running());
        let reset = controller.toggle().unwrap();
        assert_eq!(reset.map(|r| r.reason), Some(ResetReason::Stopped));
        assert!(!controller.is_running());
    }

    #[test]
    fn test_double_stop_floors_counter() {
        let mut controller = controller_with(600, 0);
        controller.stop_timer();
        controller.stop_timer();
        assert_eq!(controller.active_sessions(), 0);

        controller.start_timer().unwrap();
        controller.stop_timer();
        controller.stop_timer();
        assert_eq!(controller.active_sessions(), 0);
        assert!(!controller.is_running());
    }

    #[test]
    fn test_update_lag_feeds_duration() {
        let mut controller = controller_with(100, 0);
        controller.set_field(Field::FrameHit, "90").unwrap();
        assert!(controller.update_lag());
        assert_eq!(controller.params().lag_offset_ms, 167);
        assert!((controller.compute_duration() - (100.0 * FRAME_MS + 167.0)).abs() < 1e-9);
        assert!((controller.display_ms() - controller.compute_duration()).abs() < 1e-9);

        controller.set_field(Field::FrameHit, "").unwrap();
        assert!(!controller.update_lag());
        assert_eq!(controller.params().lag_offset_ms, 167);
    }

    #[test]
    fn test_set_alert_applies_to_next_start() {
        let alert = Arc::new(CountingAlert::default());
        let mut controller = controller_with(0, 0);
        controller.set_alert(alert.clone());
        controller.start_timer().unwrap();
        let resets = drain_until_finished(&mut controller, Duration::from_secs(5));
        assert_eq!(resets.len(), 1);
        assert_eq!(alert.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_set_timings() {
        let mut controller = controller_with(600, 0);
        let timings = Timings {
            stop_reset_delay: Duration::from_millis(5),
            finish_reset_delay: Duration::from_millis(500),
        };
        controller.set_timings(timings);
        assert_eq!(controller.timings(), timings);
        assert_eq!(controller.stop_timer().delay, Duration::from_millis(5));
    }
}
