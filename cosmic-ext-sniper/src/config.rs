//! Configuration management for COSMIC Sniper.

use cosmic::cosmic_config::{self, cosmic_config_derive::CosmicConfigEntry, CosmicConfigEntry};
use serde::{Deserialize, Serialize};
use sniper_timer::constants::controller::{
    DRAIN_INTERVAL_MS, FINISH_RESET_DELAY_MS, STOP_RESET_DELAY_MS,
};
use sniper_timer::Timings;
use std::time::Duration;

/// Application ID for configuration storage.
pub const APP_ID: &str = "com.github.cosmic-ext-sniper";

/// Timer tunables stored in COSMIC's config system.
#[derive(Debug, Clone, Serialize, Deserialize, CosmicConfigEntry, PartialEq, Eq)]
#[version = 1]
pub struct Config {
    /// Delay before the readout resets after Stop (milliseconds)
    pub stop_reset_delay_ms: u64,
    /// Grace window after completion before the readout resets (milliseconds)
    pub finish_reset_delay_ms: u64,
    /// Interval between queue drains while counting down (milliseconds)
    pub drain_interval_ms: u64,
    /// Sound the completion alert
    pub alert_enabled: bool,
    /// Freedesktop sound theme name played with the alert
    pub alert_sound: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stop_reset_delay_ms: STOP_RESET_DELAY_MS,
            finish_reset_delay_ms: FINISH_RESET_DELAY_MS,
            drain_interval_ms: DRAIN_INTERVAL_MS,
            alert_enabled: true,
            alert_sound: "alarm-clock-elapsed".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from disk, falling back to defaults if not found.
    pub fn load() -> Self {
        match cosmic_config::Config::new(APP_ID, Self::VERSION) {
            Ok(config_handler) => {
                let config = Self::get_entry(&config_handler).unwrap_or_else(|err| {
                    tracing::error!(?err, "Failed to load config, using defaults");
                    Self::default()
                });
                tracing::info!("Loaded config: {:?}", config);
                config
            }
            Err(err) => {
                tracing::error!(?err, "Failed to create config handler, using defaults");
                Self::default()
            }
        }
    }

    /// Reset debounce windows for the controller.
    pub fn timings(&self) -> Timings {
        Timings {
            stop_reset_delay: Duration::from_millis(self.stop_reset_delay_ms),
            finish_reset_delay: Duration::from_millis(self.finish_reset_delay_ms),
        }
    }

    /// Queue drain interval, never below the engine poll interval.
    pub fn drain_interval(&self) -> Duration {
        Duration::from_millis(
            self.drain_interval_ms
                .max(sniper_timer::constants::engine::POLL_INTERVAL_MS),
        )
    }
}
