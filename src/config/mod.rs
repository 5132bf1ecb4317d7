//! Configuration Module
//!
//! - Blend shape store: per-channel overrides and the two category rules
//! - Plugin settings: flat boolean toggles

mod settings;
mod store;

pub use settings::{PluginSettings, SETTINGS_FILE_NAME};
pub use store::{
    CategoryConfig, ChannelOverride, ConfigDocument, ConfigStore, DEFAULT_CONFIG_FILE_NAME,
};
