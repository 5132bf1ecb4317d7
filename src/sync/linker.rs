//! Weight transform engine
//!
//! Every frame, after the host has evaluated animation, each mapped channel
//! of the substitute renderer receives a weight derived from the original
//! renderer's matching channel. Rule resolution is strictly ordered:
//!
//! 1. Per-channel override keyed by the substitute channel name
//! 2. Enabled category rule (mouth / eye) matched from the name
//! 3. Passthrough
//!
//! A disabled override or category forces the channel to zero.

use std::path::Path;

use log::{error, info};

use super::freeze::{AnimationDriver, FreezeController};
use super::mapping::ChannelMap;
use super::transform::{transform_weight, Category};
use crate::config::{CategoryConfig, ChannelOverride, ConfigStore};
use crate::error::Result;
use crate::scene::{RendererId, Scene, MIN_WEIGHT};

/// Which configuration decided a channel's output
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightRule<'a> {
    Override(&'a ChannelOverride),
    Category(Category, &'a CategoryConfig),
    Passthrough,
}

impl<'a> WeightRule<'a> {
    /// Resolve the rule for a substitute channel name
    pub fn resolve(channel_name: &str, config: &'a ConfigStore) -> Self {
        if let Some(item) = config.override_for(channel_name) {
            return WeightRule::Override(item);
        }
        if let Some(category) = Category::of(channel_name) {
            let rule = config.category(category);
            if rule.enabled {
                return WeightRule::Category(category, rule);
            }
        }
        WeightRule::Passthrough
    }

    /// Output weight for a source weight under this rule
    pub fn apply(&self, source: f32) -> f32 {
        match self {
            WeightRule::Override(item) if item.is_disabled => MIN_WEIGHT,
            WeightRule::Override(item) => transform_weight(source, &item.params()),
            WeightRule::Category(_, rule) if rule.is_disabled => MIN_WEIGHT,
            WeightRule::Category(_, rule) => transform_weight(source, &rule.params()),
            WeightRule::Passthrough => source,
        }
    }

    pub fn label(&self) -> String {
        match self {
            WeightRule::Override(_) => "override".to_string(),
            WeightRule::Category(category, _) => format!("{} global", category),
            WeightRule::Passthrough => "passthrough".to_string(),
        }
    }
}

/// Introspection row for one mapped channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRow {
    pub original_index: usize,
    pub substitute_index: usize,
    pub name: String,
    pub source_weight: f32,
    pub output_weight: f32,
    pub rule: String,
    pub config: Option<ChannelOverride>,
}

/// Keeps substitute channel weights in sync with the original renderer
#[derive(Debug, Clone)]
pub struct WeightTransformEngine {
    original: RendererId,
    substitute: RendererId,
    map: ChannelMap,
    config: ConfigStore,
    freeze: FreezeController,
}

impl WeightTransformEngine {
    /// Bind to a renderer pair and build the channel map
    ///
    /// Unknown renderers or missing meshes leave the map empty, which makes
    /// every tick a no-op.
    pub fn new(
        scene: &Scene,
        original: RendererId,
        substitute: RendererId,
        config: ConfigStore,
    ) -> Self {
        let original_mesh = scene.renderer(original).and_then(|r| r.mesh.clone());
        let substitute_mesh = scene.renderer(substitute).and_then(|r| r.mesh.clone());

        let map = match (original_mesh, substitute_mesh) {
            (Some(original_mesh), Some(substitute_mesh)) => {
                let map = ChannelMap::build(&original_mesh, &substitute_mesh);
                info!(
                    "[LINKER] Mapped {}/{} blend shapes",
                    map.len(),
                    map.original_count()
                );
                map
            }
            _ => {
                error!("[LINKER] Renderer or mesh references are missing, nothing mapped");
                ChannelMap::default()
            }
        };

        Self {
            original,
            substitute,
            map,
            config,
            freeze: FreezeController::new(),
        }
    }

    /// Run one frame: refresh source weights, then write every mapped channel
    pub fn tick(&mut self, scene: &mut Scene, driver: Option<&dyn AnimationDriver>) {
        if self.map.is_empty() {
            return;
        }

        let Some(original) = scene.renderer(self.original) else {
            return;
        };
        self.freeze.tick(driver, &self.map, original);

        let Some(mesh) = scene.renderer(self.substitute).and_then(|r| r.mesh.clone()) else {
            return;
        };
        let Some(target) = scene.renderer_mut(self.substitute) else {
            return;
        };

        for (_, substitute_index) in self.map.iter() {
            let Some(name) = mesh.channel_name(substitute_index) else {
                continue;
            };
            let source = self.freeze.source_weight(substitute_index);
            let output = WeightRule::resolve(name, &self.config).apply(source);
            target.set_weight(substitute_index, output);
        }

        tracing::trace!(
            channels = self.map.len(),
            frozen = self.freeze.is_frozen(),
            "blend shapes synchronized"
        );
    }

    pub fn original_renderer(&self) -> RendererId {
        self.original
    }

    pub fn substitute_renderer(&self) -> RendererId {
        self.substitute
    }

    /// Channel correspondence, read-only
    pub fn index_map(&self) -> &ChannelMap {
        &self.map
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn freeze(&self) -> &FreezeController {
        &self.freeze
    }

    pub fn override_for(&self, name: &str) -> Option<&ChannelOverride> {
        self.config.override_for(name)
    }

    /// Insert or replace an override; visible on the next tick
    pub fn set_override(&mut self, entry: ChannelOverride) {
        self.config.set_override(entry);
    }

    pub fn remove_override(&mut self, name: &str) -> Option<ChannelOverride> {
        self.config.remove_override(name)
    }

    /// Replace an override with identity parameters
    pub fn reset_override(&mut self, name: &str) {
        self.config.set_override(ChannelOverride::new(name));
    }

    /// Source weight read for a substitute channel during the last tick
    pub fn cached_source_weight(&self, substitute_index: usize) -> f32 {
        self.freeze.source_weight(substitute_index)
    }

    pub fn mouth_global(&self) -> &CategoryConfig {
        self.config.mouth_global()
    }

    pub fn eye_global(&self) -> &CategoryConfig {
        self.config.eye_global()
    }

    pub fn set_mouth_global(&mut self, config: CategoryConfig) {
        self.config.set_mouth_global(config);
    }

    pub fn set_eye_global(&mut self, config: CategoryConfig) {
        self.config.set_eye_global(config);
    }

    /// Persist the live configuration
    pub fn save_config(&self, path: &Path) -> Result<()> {
        self.config.save(path)
    }

    /// One row per mapped channel, sorted by name
    pub fn debug_rows(&self, scene: &Scene) -> Vec<ChannelRow> {
        let Some(renderer) = scene.renderer(self.substitute) else {
            return Vec::new();
        };
        let Some(mesh) = renderer.mesh.as_ref() else {
            return Vec::new();
        };

        let mut rows: Vec<ChannelRow> = self
            .map
            .iter()
            .filter_map(|(original_index, substitute_index)| {
                let name = mesh.channel_name(substitute_index)?;
                Some(ChannelRow {
                    original_index,
                    substitute_index,
                    name: name.to_string(),
                    source_weight: self.cached_source_weight(substitute_index),
                    output_weight: renderer.weight(substitute_index),
                    rule: WeightRule::resolve(name, &self.config).label(),
                    config: self.config.override_for(name).cloned(),
                })
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }
}
