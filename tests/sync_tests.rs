//! Blend Shape Sync Tests
//!
//! Drives the weight transform engine across frames against a pair of
//! renderers and a configuration loaded from disk.

use std::fs;
use std::sync::Arc;

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use facelink::config::{CategoryConfig, ChannelOverride, ConfigStore};
use facelink::scene::{Mesh, RendererId, Scene, SkinnedRenderer};
use facelink::sync::{DriverState, ManualDriver, WeightTransformEngine};

const ORIGINAL: [&str; 5] = ["Mouth_A", "Eye_Wide", "Eye_Blink", "Brow_Up", "Tongue_Out"];
const SUBSTITUTE: [&str; 5] = ["Eye_Blink", "Cheek", "Mouth_A", "Eye_Wide", "Brow_Up"];

struct Rig {
    scene: Scene,
    original: RendererId,
    substitute: RendererId,
}

fn rig() -> Rig {
    let mut scene = Scene::new();
    let root = scene.add_node("Character", None);
    let a = scene.add_node("Face", Some(root));
    let b = scene.add_node("Face_Mod", Some(root));
    let original = scene
        .attach_renderer(
            a,
            SkinnedRenderer::new(Some(Arc::new(Mesh::new("original", &ORIGINAL)))),
        )
        .unwrap();
    let substitute = scene
        .attach_renderer(
            b,
            SkinnedRenderer::new(Some(Arc::new(Mesh::new("substitute", &SUBSTITUTE)))),
        )
        .unwrap();
    Rig {
        scene,
        original,
        substitute,
    }
}

fn index_of(names: &[&str], name: &str) -> usize {
    names.iter().position(|n| *n == name).unwrap()
}

fn set_source(rig: &mut Rig, name: &str, weight: f32) {
    rig.scene
        .renderer_mut(rig.original)
        .unwrap()
        .set_weight(index_of(&ORIGINAL, name), weight);
}

fn output(rig: &Rig, name: &str) -> f32 {
    rig.scene
        .renderer(rig.substitute)
        .unwrap()
        .weight(index_of(&SUBSTITUTE, name))
}

// === Mapping ===

#[test]
fn test_only_shared_names_are_mapped() {
    let rig = rig();
    let engine = WeightTransformEngine::new(
        &rig.scene,
        rig.original,
        rig.substitute,
        ConfigStore::passthrough(),
    );

    let map = engine.index_map();
    assert_eq!(map.len(), 4);
    assert_eq!(map.original_count(), 5);
    assert_eq!(map.get(index_of(&ORIGINAL, "Mouth_A")), Some(2));
    assert_eq!(map.get(index_of(&ORIGINAL, "Tongue_Out")), None);
}

#[test]
fn test_unmapped_substitute_channel_untouched() {
    let mut rig = rig();
    let cheek = index_of(&SUBSTITUTE, "Cheek");
    rig.scene
        .renderer_mut(rig.substitute)
        .unwrap()
        .set_weight(cheek, 42.0);

    let mut engine = WeightTransformEngine::new(
        &rig.scene,
        rig.original,
        rig.substitute,
        ConfigStore::passthrough(),
    );
    set_source(&mut rig, "Mouth_A", 80.0);
    engine.tick(&mut rig.scene, Some(&ManualDriver::running()));

    assert_eq!(output(&rig, "Cheek"), 42.0);
    assert_eq!(output(&rig, "Mouth_A"), 80.0);
}

// === Rule Priority ===

#[test]
fn test_override_beats_category_beats_passthrough() {
    let mut rig = rig();
    let mut config = ConfigStore::passthrough();
    config.set_mouth_global(CategoryConfig {
        enabled: true,
        multiplier: 0.5,
        ..CategoryConfig::default()
    });
    config.set_eye_global(CategoryConfig {
        enabled: true,
        is_inverted: true,
        ..CategoryConfig::default()
    });
    config.set_override(ChannelOverride {
        multiplier: 2.0,
        ..ChannelOverride::new("Eye_Wide")
    });

    let mut engine =
        WeightTransformEngine::new(&rig.scene, rig.original, rig.substitute, config);
    for name in ["Mouth_A", "Eye_Wide", "Eye_Blink", "Brow_Up"] {
        set_source(&mut rig, name, 40.0);
    }
    engine.tick(&mut rig.scene, Some(&ManualDriver::running()));

    // mouth category halves
    assert_relative_eq!(output(&rig, "Mouth_A"), 20.0, epsilon = 1e-4);
    // override wins over the inverting eye category
    assert_relative_eq!(output(&rig, "Eye_Wide"), 80.0, epsilon = 1e-4);
    // blink channels are not eye channels
    assert_relative_eq!(output(&rig, "Eye_Blink"), 40.0, epsilon = 1e-4);
    assert_relative_eq!(output(&rig, "Brow_Up"), 40.0, epsilon = 1e-4);
}

#[test]
fn test_disabled_rules_force_zero() {
    let mut rig = rig();
    let mut config = ConfigStore::passthrough();
    config.set_mouth_global(CategoryConfig {
        enabled: true,
        is_disabled: true,
        ..CategoryConfig::default()
    });
    config.set_override(ChannelOverride {
        is_disabled: true,
        ..ChannelOverride::new("Brow_Up")
    });

    let mut engine =
        WeightTransformEngine::new(&rig.scene, rig.original, rig.substitute, config);
    set_source(&mut rig, "Mouth_A", 90.0);
    set_source(&mut rig, "Brow_Up", 90.0);
    engine.tick(&mut rig.scene, Some(&ManualDriver::running()));

    assert_eq!(output(&rig, "Mouth_A"), 0.0);
    assert_eq!(output(&rig, "Brow_Up"), 0.0);
}

#[test]
fn test_live_edit_applies_on_next_tick() {
    let mut rig = rig();
    let mut engine = WeightTransformEngine::new(
        &rig.scene,
        rig.original,
        rig.substitute,
        ConfigStore::passthrough(),
    );
    let driver = ManualDriver::running();
    set_source(&mut rig, "Brow_Up", 60.0);

    engine.tick(&mut rig.scene, Some(&driver));
    assert_eq!(output(&rig, "Brow_Up"), 60.0);

    engine.set_override(ChannelOverride {
        lower_threshold: 50.0,
        upper_threshold: 70.0,
        ..ChannelOverride::new("Brow_Up")
    });
    engine.tick(&mut rig.scene, Some(&driver));
    assert_relative_eq!(output(&rig, "Brow_Up"), 50.0, epsilon = 1e-4);

    engine.reset_override("Brow_Up");
    engine.tick(&mut rig.scene, Some(&driver));
    assert_relative_eq!(output(&rig, "Brow_Up"), 60.0, epsilon = 1e-4);
}

// === Freeze ===

#[test]
fn test_pause_freezes_source_weights() {
    let mut rig = rig();
    let mut engine = WeightTransformEngine::new(
        &rig.scene,
        rig.original,
        rig.substitute,
        ConfigStore::passthrough(),
    );

    set_source(&mut rig, "Mouth_A", 70.0);
    engine.tick(&mut rig.scene, Some(&ManualDriver::running()));

    // animation stops; the host zeroes the live weights
    set_source(&mut rig, "Mouth_A", 70.0);
    engine.tick(&mut rig.scene, Some(&ManualDriver::paused()));
    set_source(&mut rig, "Mouth_A", 0.0);
    engine.tick(&mut rig.scene, Some(&ManualDriver::paused()));
    assert_eq!(engine.freeze().state(), DriverState::Paused);
    assert_eq!(output(&rig, "Mouth_A"), 70.0);

    // a missing driver counts as paused
    engine.tick(&mut rig.scene, None);
    assert_eq!(output(&rig, "Mouth_A"), 70.0);

    engine.tick(&mut rig.scene, Some(&ManualDriver::running()));
    assert_eq!(engine.freeze().state(), DriverState::Running);
    assert_eq!(output(&rig, "Mouth_A"), 0.0);
}

// === Configuration Files ===

#[test]
fn test_config_file_drives_engine_and_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blendshape_config.json");
    fs::write(
        &path,
        r#"{
            "mouthGlobal": { "enabled": true, "multiplier": 25.0 },
            "config": [
                { "sourceName": "Brow_Up", "isInverted": true },
                { "sourceName": "", "multiplier": 3.0 }
            ]
        }"#,
    )
    .unwrap();

    let config = ConfigStore::load(&path);
    assert_eq!(config.override_count(), 1);
    assert_relative_eq!(config.mouth_global().multiplier, 25.0);
    assert!(!config.eye_global().enabled);

    let mut rig = rig();
    let mut engine =
        WeightTransformEngine::new(&rig.scene, rig.original, rig.substitute, config);
    set_source(&mut rig, "Mouth_A", 2.0);
    set_source(&mut rig, "Brow_Up", 30.0);
    engine.tick(&mut rig.scene, Some(&ManualDriver::running()));
    assert_relative_eq!(output(&rig, "Mouth_A"), 50.0, epsilon = 1e-4);

    set_source(&mut rig, "Mouth_A", 5.0);
    engine.tick(&mut rig.scene, Some(&ManualDriver::running()));
    assert_relative_eq!(output(&rig, "Mouth_A"), 100.0, epsilon = 1e-4);
    assert_relative_eq!(output(&rig, "Brow_Up"), 70.0, epsilon = 1e-4);

    let saved = dir.path().join("nested").join("saved.json");
    engine.save_config(&saved).unwrap();
    let reloaded = ConfigStore::load(&saved);
    assert_eq!(&reloaded, engine.config());
}

#[test]
fn test_broken_config_file_falls_back_to_passthrough() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blendshape_config.json");
    fs::write(&path, "{ \"config\": [ oops").unwrap();

    let config = ConfigStore::load(&path);
    assert_eq!(config, ConfigStore::passthrough());

    let mut rig = rig();
    let mut engine =
        WeightTransformEngine::new(&rig.scene, rig.original, rig.substitute, config);
    set_source(&mut rig, "Eye_Wide", 33.0);
    engine.tick(&mut rig.scene, Some(&ManualDriver::running()));
    assert_eq!(output(&rig, "Eye_Wide"), 33.0);
}

// === Introspection ===

#[test]
fn test_debug_rows_sorted_with_rule_labels() {
    let mut rig = rig();
    let mut config = ConfigStore::passthrough();
    config.set_override(ChannelOverride::new("Mouth_A"));
    config.set_eye_global(CategoryConfig {
        enabled: true,
        ..CategoryConfig::default()
    });

    let mut engine =
        WeightTransformEngine::new(&rig.scene, rig.original, rig.substitute, config);
    engine.tick(&mut rig.scene, Some(&ManualDriver::running()));

    let rows = engine.debug_rows(&rig.scene);
    let summary: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (r.name.as_str(), r.rule.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Brow_Up", "passthrough"),
            ("Eye_Blink", "passthrough"),
            ("Eye_Wide", "eye global"),
            ("Mouth_A", "override"),
        ]
    );
    assert!(rows[3].config.is_some());
}
