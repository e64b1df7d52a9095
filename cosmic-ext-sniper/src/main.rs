//! COSMIC Sniper entry point.
//!
//! A frame-aligned countdown timer: enter a target frame and a lag offset,
//! start the countdown, and feed back the frame actually hit to correct the
//! lag for the next attempt.

mod alert;
mod app;
mod config;
mod i18n;
mod ui;

use app::SniperApp;

fn main() -> cosmic::iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cosmic_ext_sniper=debug".parse().unwrap())
                .add_directive("sniper_timer=debug".parse().unwrap()),
        )
        .init();

    // Initialize localization
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();
    i18n::init(&requested_languages);

    let settings = cosmic::app::Settings::default()
        .size(cosmic::iced::Size::new(520.0, 420.0))
        .size_limits(
            cosmic::iced_core::layout::Limits::NONE
                .min_width(420.0)
                .min_height(360.0),
        );

    tracing::info!("Starting COSMIC Sniper");
    cosmic::app::run::<SniperApp>(settings, ())
}
