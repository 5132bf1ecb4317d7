//! Substitution session
//!
//! Owns the state that lives for one host session: the replacement
//! template, configuration, the "model loaded" flag and the weight transform
//! engine attached after a successful substitution.
//!
//! The host drives it through two entry points:
//! - `on_scene_initialized`: fired once when the host scene manager is ready
//! - `poll`: called every frame as a fallback until the model is loaded

use log::{error, info};

use super::accessory::{AccessoryConfigurator, AccessoryToggles};
use super::substitute::{
    replace_renderers, SubstitutionReport, FORCED_SHADER_NAME, ROOT_JOINT_NAME,
};
use crate::config::{ConfigStore, PluginSettings};
use crate::error::{FaceLinkError, Result};
use crate::scene::{NodeId, Scene, ShaderCatalog, ShaderLibrary};
use crate::sync::{AnimationDriver, WeightTransformEngine};

/// Name of the host node holding the rendered character
pub const CHARACTER_ROOT_NAME: &str = "Character";

/// Why an attempt did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The model was already substituted this session
    AlreadyLoaded,
    /// The replacement asset failed to load upstream
    AssetUnavailable,
    /// No character root (or no skeleton under it) is present yet
    CharacterNotFound,
}

/// Result of one substitution attempt
#[derive(Debug)]
pub enum SubstitutionOutcome {
    Substituted,
    Skipped(SkipReason),
    /// Attempt aborted; the host may retry on a later frame
    Failed(FaceLinkError),
}

impl SubstitutionOutcome {
    pub fn is_substituted(&self) -> bool {
        matches!(self, SubstitutionOutcome::Substituted)
    }
}

/// Per-session substitution context
pub struct SwapSession {
    template: Option<Scene>,
    config: ConfigStore,
    settings: PluginSettings,
    shaders: Box<dyn ShaderLibrary>,
    accessories: Box<dyn AccessoryConfigurator>,
    model_loaded: bool,
    engine: Option<WeightTransformEngine>,
    report: Option<SubstitutionReport>,
}

impl SwapSession {
    /// Create a session
    ///
    /// `template` is the loaded replacement asset, or `None` if loading
    /// failed, in which case every attempt is skipped.
    pub fn new(template: Option<Scene>, config: ConfigStore) -> Self {
        let settings = PluginSettings::default();
        Self {
            template,
            config,
            settings,
            shaders: Box::new(ShaderCatalog::new([FORCED_SHADER_NAME])),
            accessories: Box::new(AccessoryToggles::from(&settings)),
            model_loaded: false,
            engine: None,
            report: None,
        }
    }

    /// Apply plugin settings; also resets accessory toggles to match
    pub fn with_settings(mut self, settings: PluginSettings) -> Self {
        self.settings = settings;
        self.accessories = Box::new(AccessoryToggles::from(&settings));
        self
    }

    pub fn with_shader_library(mut self, shaders: Box<dyn ShaderLibrary>) -> Self {
        self.shaders = shaders;
        self
    }

    pub fn with_accessory_configurator(
        mut self,
        accessories: Box<dyn AccessoryConfigurator>,
    ) -> Self {
        self.accessories = accessories;
        self
    }

    /// Substitute the replacement model under `character_root`
    ///
    /// No-op once the model is loaded or when no replacement asset exists.
    /// Errors abort only this attempt.
    pub fn substitute(
        &mut self,
        scene: &mut Scene,
        character_root: NodeId,
    ) -> Result<SubstitutionOutcome> {
        if self.model_loaded {
            return Ok(SubstitutionOutcome::Skipped(SkipReason::AlreadyLoaded));
        }
        let Some(template) = self.template.as_ref() else {
            return Ok(SubstitutionOutcome::Skipped(SkipReason::AssetUnavailable));
        };

        let _span = tracing::info_span!("substitute", root = character_root.0).entered();
        info!("[SWAP] Starting character model replacement");

        let instance = template.clone();
        let report = replace_renderers(scene, character_root, instance, self.shaders.as_ref())?;

        self.accessories.configure(scene, character_root);

        if let Some(face) = report.face_renderer {
            self.engine = Some(WeightTransformEngine::new(
                scene,
                face,
                face,
                self.config.clone(),
            ));
            info!("[SWAP] Weight transform engine attached");
        }

        self.report = Some(report);
        self.model_loaded = true;
        info!("[SWAP] Character model replacement completed");
        Ok(SubstitutionOutcome::Substituted)
    }

    fn attempt(&mut self, scene: &mut Scene, character_root: NodeId) -> SubstitutionOutcome {
        match self.substitute(scene, character_root) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("[SWAP] Substitution attempt failed: {}", e);
                SubstitutionOutcome::Failed(e)
            }
        }
    }

    fn find_character(scene: &Scene) -> Option<NodeId> {
        scene
            .roots()
            .find_map(|root| scene.find_descendant_by_name(root, CHARACTER_ROOT_NAME))
    }

    /// Host scene initialization callback
    ///
    /// Uses the supplied character root if any, otherwise looks the
    /// character up by name.
    pub fn on_scene_initialized(
        &mut self,
        scene: &mut Scene,
        character_root: Option<NodeId>,
    ) -> SubstitutionOutcome {
        if self.model_loaded {
            return SubstitutionOutcome::Skipped(SkipReason::AlreadyLoaded);
        }
        info!("[SWAP] Scene initialized");

        match character_root.or_else(|| Self::find_character(scene)) {
            Some(root) => self.attempt(scene, root),
            None => SubstitutionOutcome::Skipped(SkipReason::CharacterNotFound),
        }
    }

    /// Per-frame fallback; attempts only once the skeleton is present
    pub fn poll(&mut self, scene: &mut Scene) -> SubstitutionOutcome {
        if self.model_loaded {
            return SubstitutionOutcome::Skipped(SkipReason::AlreadyLoaded);
        }
        let Some(root) = Self::find_character(scene) else {
            return SubstitutionOutcome::Skipped(SkipReason::CharacterNotFound);
        };
        if scene.find_descendant_by_name(root, ROOT_JOINT_NAME).is_none() {
            return SubstitutionOutcome::Skipped(SkipReason::CharacterNotFound);
        }
        self.attempt(scene, root)
    }

    /// Per-frame synchronization, after the host has evaluated animation
    pub fn frame(&mut self, scene: &mut Scene, driver: Option<&dyn AnimationDriver>) {
        if let Some(engine) = self.engine.as_mut() {
            engine.tick(scene, driver);
        }
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model_loaded
    }

    pub fn engine(&self) -> Option<&WeightTransformEngine> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut WeightTransformEngine> {
        self.engine.as_mut()
    }

    /// Engine handle for the interactive editor, if the debugger is enabled
    pub fn inspector(&mut self) -> Option<&mut WeightTransformEngine> {
        if !self.settings.enable_debugger {
            info!("[SWAP] Blend shape debugger is disabled in config");
            return None;
        }
        self.engine.as_mut()
    }

    pub fn report(&self) -> Option<&SubstitutionReport> {
        self.report.as_ref()
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }
}
