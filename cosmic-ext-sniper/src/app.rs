//! Main application state and logic for COSMIC Sniper.

use crate::alert::DesktopAlert;
use crate::config::Config;
use crate::fl;
use crate::ui::timer_page::{self, TimerPageParams};
use cosmic::app::Core;
use cosmic::iced::keyboard::{self, key::Named, Key};
use cosmic::iced::{event, Event, Subscription};
use cosmic::{Application, Element};
use sniper_timer::{
    Alert, Controller, Field, ResetReason, ScheduledReset, SilentAlert, TimerError, TimerParams,
};
use std::sync::Arc;

/// Messages that drive the application's state changes.
#[derive(Debug, Clone)]
pub enum Message {
    /// Text edited in one of the parameter fields
    FieldInput(Field, String),
    /// Recompute lag from the frame-hit feedback
    UpdateLag,
    /// Start (or restart) the countdown
    Start,
    /// Stop the countdown
    Stop,
    /// Spacebar: start when idle, stop when running
    Toggle,
    /// Execute queued countdown updates
    DrainQueue,
    /// A debounced display reset is due
    DelayedReset(ResetReason),
    /// Configuration changed (from file watcher or external source)
    ConfigChanged(Config),
}

/// Rendered text of the parameter fields.
#[derive(Debug, Clone, Default)]
pub struct FieldTexts {
    pub lag: String,
    pub target_frame: String,
    pub frame_hit: String,
}

impl FieldTexts {
    fn from_params(params: &TimerParams) -> Self {
        Self {
            lag: params.value(Field::Lag).to_string(),
            target_frame: params.value(Field::TargetFrame).to_string(),
            frame_hit: params.value(Field::FrameHit).to_string(),
        }
    }
}

/// The main application state.
pub struct SniperApp {
    core: Core,
    config: Config,
    controller: Controller,
    field_texts: FieldTexts,
    /// Last start failure, shown under the readout
    error: Option<String>,
}

/// Build the completion alert described by the config.
fn alert_for(config: &Config) -> Arc<dyn Alert> {
    if config.alert_enabled {
        Arc::new(DesktopAlert::new(config.alert_sound.clone()))
    } else {
        Arc::new(SilentAlert)
    }
}

/// Turn controller reset requests into delayed tasks.
fn schedule_resets(resets: Vec<ScheduledReset>) -> cosmic::app::Task<Message> {
    cosmic::app::Task::batch(resets.into_iter().map(|reset| {
        cosmic::app::Task::perform(
            async move {
                tokio::time::sleep(reset.delay).await;
                reset.reason
            },
            |reason| cosmic::Action::App(Message::DelayedReset(reason)),
        )
    }))
}

/// Whether a key press is the start/stop hotkey.
fn is_toggle_key(key: &Key) -> bool {
    matches!(key, Key::Named(Named::Space))
}

/// Map window events to the hotkey, including presses a focused field captured.
fn hotkey_listener(
    event: Event,
    _status: event::Status,
    _id: cosmic::iced::window::Id,
) -> Option<Message> {
    match event {
        Event::Keyboard(keyboard::Event::KeyPressed { key, .. }) if is_toggle_key(&key) => {
            Some(Message::Toggle)
        }
        _ => None,
    }
}

impl SniperApp {
    fn sync_field_texts(&mut self) {
        self.field_texts = FieldTexts::from_params(self.controller.params());
    }

    fn report_start_error(&mut self, e: TimerError) {
        tracing::error!("Failed to start countdown: {}", e);
        self.error = Some(format!("{}: {}", fl!("start-failed"), e));
    }
}

impl Application for SniperApp {
    type Executor = cosmic::executor::Default;
    type Flags = ();
    type Message = Message;

    const APP_ID: &'static str = crate::config::APP_ID;

    fn core(&self) -> &Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    fn init(core: Core, _flags: Self::Flags) -> (Self, cosmic::app::Task<Self::Message>) {
        // Load config from disk or use defaults
        let config = Config::load();
        let controller = Controller::new(
            TimerParams::default(),
            config.timings(),
            alert_for(&config),
        );

        let app = SniperApp {
            field_texts: FieldTexts::from_params(controller.params()),
            core,
            config,
            controller,
            error: None,
        };

        (app, cosmic::app::Task::none())
    }

    fn update(&mut self, message: Self::Message) -> cosmic::app::Task<Self::Message> {
        match message {
            Message::FieldInput(field, text) => {
                if let Err(e) = self.controller.set_field(field, &text) {
                    tracing::debug!("Rejected {:?} input {:?}: {}", field, text, e);
                }
                self.sync_field_texts();
            }
            Message::UpdateLag => {
                if self.controller.update_lag() {
                    self.sync_field_texts();
                }
            }
            Message::Start => match self.controller.start_timer() {
                Ok(()) => self.error = None,
                Err(e) => self.report_start_error(e),
            },
            Message::Stop => {
                let reset = self.controller.stop_timer();
                return schedule_resets(vec![reset]);
            }
            Message::Toggle => match self.controller.toggle() {
                Ok(Some(reset)) => return schedule_resets(vec![reset]),
                Ok(None) => self.error = None,
                Err(e) => self.report_start_error(e),
            },
            Message::DrainQueue => {
                let resets = self.controller.drain();
                if !resets.is_empty() {
                    return schedule_resets(resets);
                }
            }
            Message::DelayedReset(reason) => {
                self.controller.fire_reset(reason);
            }
            Message::ConfigChanged(config) => {
                tracing::info!("Config changed: {:?}", config);
                self.controller.set_timings(config.timings());
                self.controller.set_alert(alert_for(&config));
                self.config = config;
            }
        }

        cosmic::app::Task::none()
    }

    fn view(&self) -> Element<'_, Self::Message> {
        timer_page::view(TimerPageParams {
            fields: &self.field_texts,
            readout: self.controller.display_text(),
            error: self.error.as_deref(),
        })
    }

    fn subscription(&self) -> Subscription<Self::Message> {
        let mut subscriptions = vec![
            // Spacebar toggles start/stop even while a field has focus; the
            // field itself rejects the space
            event::listen_with(hotkey_listener),
            // Watch for config changes from external sources
            self.core
                .watch_config::<Config>(crate::config::APP_ID)
                .map(|update| {
                    for err in update.errors {
                        tracing::error!(?err, "Error watching config");
                    }
                    Message::ConfigChanged(update.config)
                }),
        ];

        // Drain countdown updates only while a countdown is running
        if self.controller.is_running() {
            subscriptions.push(
                cosmic::iced::time::every(self.config.drain_interval())
                    .map(|_| Message::DrainQueue),
            );
        }

        Subscription::batch(subscriptions)
    }
}
