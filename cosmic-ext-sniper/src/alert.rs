//! Desktop completion alert.
//!
//! Sends a freedesktop notification with a sound hint when a countdown
//! reaches zero. Delivery happens on a short-lived worker thread so the
//! timing thread returns immediately.

use crate::fl;
use anyhow::Context;
use sniper_timer::Alert;
use std::io::Write;
use std::thread;

/// How long the notification stays on screen (milliseconds).
const NOTIFICATION_TIMEOUT_MS: u32 = 2000;

/// Alert backed by the desktop notification daemon.
#[derive(Debug, Clone)]
pub struct DesktopAlert {
    sound_name: String,
}

impl DesktopAlert {
    pub fn new(sound_name: impl Into<String>) -> Self {
        Self {
            sound_name: sound_name.into(),
        }
    }

    fn notify(&self) -> anyhow::Result<()> {
        notify_rust::Notification::new()
            .summary(&fl!("alert-summary"))
            .body(&fl!("alert-body"))
            .icon("alarm-symbolic")
            .appname("COSMIC Sniper")
            .sound_name(&self.sound_name)
            .timeout(notify_rust::Timeout::Milliseconds(NOTIFICATION_TIMEOUT_MS))
            .show()
            .context("notification daemon rejected the alert")?;
        Ok(())
    }
}

impl Alert for DesktopAlert {
    fn sound(&self) {
        let alert = self.clone();
        let spawned = thread::Builder::new()
            .name(String::from("alert"))
            .spawn(move || {
                if let Err(e) = alert.notify() {
                    tracing::warn!("Failed to show completion alert: {:#}", e);
                    ring_terminal_bell();
                }
            });
        if let Err(e) = spawned {
            tracing::warn!("Failed to spawn alert thread: {}", e);
            ring_terminal_bell();
        }
    }
}

fn ring_terminal_bell() {
    let mut stderr = std::io::stderr();
    let _ = stderr.write_all(b"\x07");
    let _ = stderr.flush();
}
