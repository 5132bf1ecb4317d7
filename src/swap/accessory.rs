//! Accessory configuration
//!
//! Runs once after the replacement geometry is in place. Optional props that
//! ship with the host character are shown, hidden or repositioned from the
//! plugin settings.

use log::debug;

use crate::config::PluginSettings;
use crate::scene::{NodeId, Scene};

pub const GLASSES_NODE_NAME: &str = "m_Glasses";
pub const HEADPHONES_NODE_NAME: &str = "m_Headphone_cat";

/// Local offset that fits the host glasses onto the replacement head
pub const GLASSES_POSITION: [f32; 3] = [-0.008, 0.008, 0.012];
pub const GLASSES_SCALE: f32 = 1.29;

/// Far-away offset used to park hidden props
pub const HIDDEN_POSITION: [f32; 3] = [99.0, 99.0, 99.0];

/// Adjusts host props after a substitution
pub trait AccessoryConfigurator {
    fn configure(&self, scene: &mut Scene, character_root: NodeId);
}

/// Leaves every prop untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAccessories;

impl AccessoryConfigurator for NoAccessories {
    fn configure(&self, _scene: &mut Scene, _character_root: NodeId) {}
}

/// Glasses and headphone toggles driven by plugin settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessoryToggles {
    pub glasses_enabled: bool,
}

impl From<&PluginSettings> for AccessoryToggles {
    fn from(settings: &PluginSettings) -> Self {
        Self {
            glasses_enabled: settings.enable_glasses,
        }
    }
}

impl AccessoryToggles {
    fn configure_glasses(&self, scene: &mut Scene, character_root: NodeId) {
        let Some(id) = scene.find_descendant_by_name(character_root, GLASSES_NODE_NAME) else {
            return;
        };
        let Some(glasses) = scene.node_mut(id) else {
            return;
        };

        glasses.active = self.glasses_enabled;
        if self.glasses_enabled {
            glasses.local_position = GLASSES_POSITION;
            glasses.local_scale = [GLASSES_SCALE; 3];
        } else {
            glasses.local_position = HIDDEN_POSITION;
        }
        debug!("[SWAP] Glasses active: {}", self.glasses_enabled);
    }

    // TODO: place headphones on the replacement head instead of hiding them
    fn configure_headphones(&self, scene: &mut Scene, character_root: NodeId) {
        let Some(id) = scene.find_descendant_by_name(character_root, HEADPHONES_NODE_NAME) else {
            return;
        };
        if let Some(headphones) = scene.node_mut(id) {
            headphones.active = false;
            headphones.local_position = HIDDEN_POSITION;
        }
    }
}

impl AccessoryConfigurator for AccessoryToggles {
    fn configure(&self, scene: &mut Scene, character_root: NodeId) {
        self.configure_glasses(scene, character_root);
        self.configure_headphones(scene, character_root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with_props() -> (Scene, NodeId, NodeId, NodeId) {
        let mut scene = Scene::new();
        let root = scene.add_node("Character", None);
        let head = scene.add_node("Head", Some(root));
        let glasses = scene.add_node(GLASSES_NODE_NAME, Some(head));
        let headphones = scene.add_node(HEADPHONES_NODE_NAME, Some(head));
        (scene, root, glasses, headphones)
    }

    #[test]
    fn test_glasses_enabled_repositioned() {
        let (mut scene, root, glasses, _) = scene_with_props();
        AccessoryToggles {
            glasses_enabled: true,
        }
        .configure(&mut scene, root);

        let node = scene.node(glasses).unwrap();
        assert!(node.active);
        assert_eq!(node.local_position, GLASSES_POSITION);
        assert_eq!(node.local_scale, [GLASSES_SCALE; 3]);
    }

    #[test]
    fn test_glasses_disabled_parked() {
        let (mut scene, root, glasses, headphones) = scene_with_props();
        AccessoryToggles::default().configure(&mut scene, root);

        let node = scene.node(glasses).unwrap();
        assert!(!node.active);
        assert_eq!(node.local_position, HIDDEN_POSITION);

        let node = scene.node(headphones).unwrap();
        assert!(!node.active);
        assert_eq!(node.local_position, HIDDEN_POSITION);
    }

    #[test]
    fn test_missing_props_ignored() {
        let mut scene = Scene::new();
        let root = scene.add_node("Character", None);
        AccessoryToggles {
            glasses_enabled: true,
        }
        .configure(&mut scene, root);
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn test_from_settings() {
        let settings = PluginSettings {
            enable_glasses: true,
            enable_debugger: false,
        };
        assert!(AccessoryToggles::from(&settings).glasses_enabled);
    }
}
