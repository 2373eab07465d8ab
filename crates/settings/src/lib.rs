pub mod config;
pub mod font;
pub mod languages;
pub mod preferences;
pub mod store;

pub use config::{ConfigError, PanelConfig};
pub use font::{
    clamp_font_size, parse_font_size, DEFAULT_FONT_SIZE, MAX_FONT_SIZE, MIN_FONT_SIZE,
};
pub use languages::{CatalogError, LanguageCatalog, LanguageProfile};
pub use preferences::Preferences;
pub use store::{PreferenceChange, PreferenceStore, SubscriptionId};
