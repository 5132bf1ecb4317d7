//! Blend shape configuration store
//!
//! JSON document with two category sections and a list of per-channel
//! overrides:
//!
//! ```json
//! {
//!   "mouthGlobal": { "enabled": true, "multiplier": 0.4, "lowerThreshold": 40 },
//!   "eyeGlobal": { "enabled": false },
//!   "config": [ { "sourceName": "Mouth_A", "multiplier": 0.8 } ]
//! }
//! ```
//!
//! Missing fields take their documented defaults. A missing, empty or
//! malformed file never aborts: `ConfigStore::load` falls back to full
//! passthrough.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{FaceLinkError, Result};
use crate::sync::{Category, TransformParams};

/// File name of the blend shape configuration next to the plugin
pub const DEFAULT_CONFIG_FILE_NAME: &str = "blendshape_config.json";

fn clamp_threshold(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

fn clamp_multiplier(value: f32) -> f32 {
    if value.is_nan() {
        return 1.0;
    }
    value.max(0.0)
}

/// Treat an explicit `null` section like a missing one
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Per-channel override, keyed by the substitute channel name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelOverride {
    pub source_name: String,
    pub multiplier: f32,
    pub upper_threshold: f32,
    pub lower_threshold: f32,
    pub is_inverted: bool,
    pub is_disabled: bool,
}

impl Default for ChannelOverride {
    fn default() -> Self {
        Self {
            source_name: String::new(),
            multiplier: 1.0,
            upper_threshold: 100.0,
            lower_threshold: 0.0,
            is_inverted: false,
            is_disabled: false,
        }
    }
}

impl ChannelOverride {
    /// Default (identity) override for a channel
    pub fn new(source_name: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            ..Self::default()
        }
    }

    /// Copy with multiplier and thresholds clamped to their valid ranges
    pub fn clamped(&self) -> Self {
        Self {
            multiplier: clamp_multiplier(self.multiplier),
            upper_threshold: clamp_threshold(self.upper_threshold),
            lower_threshold: clamp_threshold(self.lower_threshold),
            ..self.clone()
        }
    }

    pub fn params(&self) -> TransformParams {
        TransformParams {
            lower: self.lower_threshold,
            upper: self.upper_threshold,
            multiplier: self.multiplier,
            inverted: self.is_inverted,
        }
    }
}

/// Rule applied to every channel of a name-matched category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryConfig {
    pub enabled: bool,
    pub multiplier: f32,
    pub upper_threshold: f32,
    pub lower_threshold: f32,
    pub is_inverted: bool,
    pub is_disabled: bool,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            multiplier: 1.0,
            upper_threshold: 100.0,
            lower_threshold: 0.0,
            is_inverted: false,
            is_disabled: false,
        }
    }
}

impl CategoryConfig {
    pub fn clamped(&self) -> Self {
        Self {
            multiplier: clamp_multiplier(self.multiplier),
            upper_threshold: clamp_threshold(self.upper_threshold),
            lower_threshold: clamp_threshold(self.lower_threshold),
            ..self.clone()
        }
    }

    pub fn params(&self) -> TransformParams {
        TransformParams {
            lower: self.lower_threshold,
            upper: self.upper_threshold,
            multiplier: self.multiplier,
            inverted: self.is_inverted,
        }
    }
}

/// On-disk shape of the configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigDocument {
    #[serde(deserialize_with = "null_as_default")]
    pub mouth_global: CategoryConfig,
    #[serde(deserialize_with = "null_as_default")]
    pub eye_global: CategoryConfig,
    #[serde(deserialize_with = "null_as_default")]
    pub config: Vec<ChannelOverride>,
}

/// In-memory configuration consulted by the weight transform engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    overrides: HashMap<String, ChannelOverride>,
    mouth_global: CategoryConfig,
    eye_global: CategoryConfig,
}

impl ConfigStore {
    /// Empty override list, both categories disabled
    pub fn passthrough() -> Self {
        Self::default()
    }

    /// Build a store from a parsed document
    ///
    /// Entries without a name are dropped; for duplicate names the last
    /// entry wins.
    pub fn from_document(document: ConfigDocument) -> Self {
        let mut overrides = HashMap::with_capacity(document.config.len());
        for item in document.config {
            if item.source_name.is_empty() {
                continue;
            }
            overrides.insert(item.source_name.clone(), item.clamped());
        }
        Self {
            overrides,
            mouth_global: document.mouth_global.clamped(),
            eye_global: document.eye_global.clamped(),
        }
    }

    /// Parse configuration text strictly
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(FaceLinkError::ConfigParse {
                reason: "config file is empty".to_string(),
            });
        }
        let document: ConfigDocument =
            serde_json::from_str(text).map_err(|e| FaceLinkError::ConfigParse {
                reason: e.to_string(),
            })?;
        Ok(Self::from_document(document))
    }

    /// Read and parse a configuration file
    pub fn try_load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| FaceLinkError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&text)
    }

    /// Load a configuration file, degrading to passthrough on any failure
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            warn!("[CONFIG] Config file not found at {}", path.display());
            info!("[CONFIG] Using passthrough mode (1:1 mapping)");
            return Self::passthrough();
        }

        debug!("[CONFIG] Loading config from {}", path.display());
        match Self::try_load(path) {
            Ok(store) => {
                info!(
                    "[CONFIG] Loaded {} blend shape configurations from {}",
                    store.override_count(),
                    path.display()
                );
                info!(
                    "[CONFIG] Mouth global: {}, eye global: {}",
                    enabled_label(store.mouth_global.enabled),
                    enabled_label(store.eye_global.enabled)
                );
                store
            }
            Err(e) => {
                warn!("[CONFIG] Failed to load config ({}), using passthrough", e);
                Self::passthrough()
            }
        }
    }

    /// Snapshot in file shape, overrides sorted by name
    pub fn to_document(&self) -> ConfigDocument {
        let mut config: Vec<ChannelOverride> = self.overrides.values().cloned().collect();
        config.sort_by(|a, b| a.source_name.cmp(&b.source_name));
        ConfigDocument {
            mouth_global: self.mouth_global.clone(),
            eye_global: self.eye_global.clone(),
            config,
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Write the configuration, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| FaceLinkError::DirectoryCreateError {
                    path: dir.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let content = self.to_json_string()?;
        fs::write(path, content).map_err(|e| FaceLinkError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(
            "[CONFIG] Saved {} configurations + 2 global categories to {}",
            self.override_count(),
            path.display()
        );
        Ok(())
    }

    pub fn override_for(&self, name: &str) -> Option<&ChannelOverride> {
        self.overrides.get(name)
    }

    /// Insert or replace an override; nameless entries are rejected
    pub fn set_override(&mut self, entry: ChannelOverride) -> Option<ChannelOverride> {
        if entry.source_name.is_empty() {
            return None;
        }
        self.overrides
            .insert(entry.source_name.clone(), entry.clamped())
    }

    pub fn remove_override(&mut self, name: &str) -> Option<ChannelOverride> {
        self.overrides.remove(name)
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    pub fn overrides(&self) -> impl Iterator<Item = &ChannelOverride> {
        self.overrides.values()
    }

    pub fn mouth_global(&self) -> &CategoryConfig {
        &self.mouth_global
    }

    pub fn eye_global(&self) -> &CategoryConfig {
        &self.eye_global
    }

    pub fn set_mouth_global(&mut self, config: CategoryConfig) {
        self.mouth_global = config.clamped();
    }

    pub fn set_eye_global(&mut self, config: CategoryConfig) {
        self.eye_global = config.clamped();
    }

    /// Rule for a category
    pub fn category(&self, category: Category) -> &CategoryConfig {
        match category {
            Category::Mouth => &self.mouth_global,
            Category::Eye => &self.eye_global,
        }
    }
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled {
        "ENABLED"
    } else {
        "DISABLED"
    }
}
