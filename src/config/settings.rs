//! Plugin settings
//!
//! Flat `KEY=value` file toggling optional features. Lines starting with `#`
//! and blank lines are ignored; `true` and `1` (any case) enable a flag.

use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::error::{FaceLinkError, Result};

/// File name of the plugin settings
pub const SETTINGS_FILE_NAME: &str = "config.txt";

const KEY_ENABLE_GLASSES: &str = "ENABLE_GLASSES";
const KEY_ENABLE_DEBUGGER: &str = "ENABLE_DEBUGGER";

const DEFAULT_SETTINGS_TEXT: &str = "# FaceLink Configuration\n\
# Enable glasses (true=show, false=hide)\n\
ENABLE_GLASSES=false\n\
\n\
# Enable the blend shape debugger (true=enable, false=disable)\n\
ENABLE_DEBUGGER=true\n";

/// Boolean feature toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginSettings {
    pub enable_glasses: bool,
    pub enable_debugger: bool,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            enable_glasses: false,
            enable_debugger: true,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    value == "true" || value == "1"
}

impl PluginSettings {
    /// Parse settings text; unknown keys are ignored
    pub fn parse(text: &str) -> Self {
        let mut settings = Self::default();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                continue;
            };
            match key.trim() {
                KEY_ENABLE_GLASSES => settings.enable_glasses = parse_flag(value),
                KEY_ENABLE_DEBUGGER => settings.enable_debugger = parse_flag(value),
                _ => {}
            }
        }
        settings
    }

    /// Load settings, writing the default file when none exists
    ///
    /// Read or write failures fall back to defaults.
    pub fn load_or_create(path: &Path) -> Self {
        if !path.exists() {
            if let Err(e) = Self::write_default(path) {
                warn!("[CONFIG] Failed to write default settings: {}", e);
            }
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(text) => {
                let settings = Self::parse(&text);
                info!(
                    "[CONFIG] Glasses enabled: {}, debugger enabled: {}",
                    settings.enable_glasses, settings.enable_debugger
                );
                settings
            }
            Err(e) => {
                warn!("[CONFIG] Failed to load settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    fn write_default(path: &Path) -> Result<()> {
        fs::write(path, DEFAULT_SETTINGS_TEXT).map_err(|e| FaceLinkError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        info!("[CONFIG] Created default settings at: {}", path.display());
        Ok(())
    }
}
