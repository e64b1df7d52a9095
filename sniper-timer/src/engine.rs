//! Background countdown engine.
//!
//! Each run lives on its own named thread that polls elapsed time and posts
//! [`QueuedEvent`]s to the UI thread over an unbounded channel. Every event
//! carries the run's [`CancelToken`], checked when the UI thread executes it
//! rather than when it was queued, so anything still in flight after
//! [`CountdownEngine::stop`] resolves to nothing.

use crate::alert::Alert;
use crate::constants::engine::{POLL_INTERVAL_MS, THREAD_NAME};
use crate::error::TimerError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;

/// Shared cancellation flag for one countdown run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What the timing thread reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// Remaining time in milliseconds (0 on completion)
    Tick { time_left_ms: f64 },
    /// The countdown reached zero without being stopped
    Finished,
}

/// A deferred event, dropped at execution time if its run was cancelled.
#[derive(Debug, Clone)]
pub struct QueuedEvent {
    token: CancelToken,
    event: EngineEvent,
}

impl QueuedEvent {
    fn new(token: &CancelToken, event: EngineEvent) -> Self {
        Self {
            token: token.clone(),
            event,
        }
    }

    /// The event to apply, or `None` if its run has been stopped since.
    pub fn resolve(self) -> Option<EngineEvent> {
        if self.token.is_cancelled() {
            None
        } else {
            Some(self.event)
        }
    }
}

/// Handle of the thread running the current countdown.
struct ActiveRun {
    token: CancelToken,
    handle: JoinHandle<()>,
}

/// Runs at most one countdown at a time on a background thread.
pub struct CountdownEngine {
    sender: UnboundedSender<QueuedEvent>,
    alert: Arc<dyn Alert>,
    poll_interval: Duration,
    run: Option<ActiveRun>,
}

impl CountdownEngine {
    pub fn new(sender: UnboundedSender<QueuedEvent>, alert: Arc<dyn Alert>) -> Self {
        Self {
            sender,
            alert,
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            run: None,
        }
    }

    /// Begin a countdown of `duration_ms` from now.
    ///
    /// A run already in progress is stopped and joined first. Negative
    /// durations are treated as zero.
    pub fn start(&mut self, duration_ms: f64) -> Result<(), TimerError> {
        self.stop();

        let duration_ms = duration_ms.max(0.0);
        let token = CancelToken::new();
        let started = Instant::now();
        let handle = thread::Builder::new()
            .name(String::from(THREAD_NAME))
            .spawn({
                let token = token.clone();
                let sender = self.sender.clone();
                let alert = Arc::clone(&self.alert);
                let poll_interval = self.poll_interval;
                move || run_countdown(started, duration_ms, poll_interval, token, sender, alert)
            })?;

        tracing::debug!("Countdown started: {:.1}ms", duration_ms);
        self.run = Some(ActiveRun { token, handle });
        Ok(())
    }

    /// Cancel the current run and wait for its thread to exit.
    ///
    /// Once this returns no event from the stopped run will resolve. Calling
    /// it with nothing running does nothing.
    pub fn stop(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };
        run.token.cancel();
        if run.handle.join().is_err() {
            tracing::warn!("Countdown thread panicked before it could be joined");
        }
        tracing::debug!("Countdown stopped");
    }

    /// Whether a timing thread is still alive.
    pub fn is_active(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|run| !run.handle.is_finished())
    }
}

impl Drop for CountdownEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_countdown(
    started: Instant,
    duration_ms: f64,
    poll_interval: Duration,
    token: CancelToken,
    sender: UnboundedSender<QueuedEvent>,
    alert: Arc<dyn Alert>,
) {
    while !token.is_cancelled() {
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        if elapsed_ms < duration_ms {
            let time_left_ms = duration_ms - elapsed_ms;
            if sender
                .send(QueuedEvent::new(&token, EngineEvent::Tick { time_left_ms }))
                .is_err()
            {
                return;
            }
        } else {
            if sender
                .send(QueuedEvent::new(
                    &token,
                    EngineEvent::Tick { time_left_ms: 0.0 },
                ))
                .is_err()
            {
                return;
            }
            alert.sound();
            break;
        }
        thread::sleep(poll_interval);
    }

    if !token.is_cancelled() {
        // Receiver gone means nobody is left to notify.
        let _ = sender.send(QueuedEvent::new(&token, EngineEvent::Finished));
    }
}
