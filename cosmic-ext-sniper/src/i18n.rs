//! Fluent localization for COSMIC Sniper.

use i18n_embed::{
    fluent::{fluent_language_loader, FluentLanguageLoader},
    unic_langid::LanguageIdentifier,
    DefaultLocalizer, LanguageLoader, Localizer,
};
use rust_embed::RustEmbed;
use std::sync::LazyLock;

/// Fluent bundles compiled into the binary.
#[derive(RustEmbed)]
#[folder = "i18n/"]
struct Translations;

/// Loader shared by every `fl!` lookup; English is always loaded as fallback.
pub static LANGUAGE_LOADER: LazyLock<FluentLanguageLoader> = LazyLock::new(|| {
    let loader: FluentLanguageLoader = fluent_language_loader!();
    loader
        .load_fallback_language(&Translations)
        .expect("embedded English translations must load");
    loader
});

/// Select the best available translation for the desktop's languages.
pub fn init(requested: &[LanguageIdentifier]) {
    let localizer = DefaultLocalizer::new(&*LANGUAGE_LOADER, &Translations);
    match localizer.select(requested) {
        Ok(selected) => tracing::debug!("Selected languages: {:?}", selected),
        Err(why) => tracing::error!("Error while loading fluent localizations: {why}"),
    }
}

/// Look up a localized message by ID.
#[macro_export]
macro_rules! fl {
    ($message_id:literal) => {{
        i18n_embed_fl::fl!($crate::i18n::LANGUAGE_LOADER, $message_id)
    }};

    ($message_id:literal, $($args:expr),*) => {{
        i18n_embed_fl::fl!($crate::i18n::LANGUAGE_LOADER, $message_id, $($args), *)
    }};
}
