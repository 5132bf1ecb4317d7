//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;

use log::info;

use crate::config::{CategoryConfig, ConfigStore};
use crate::error::{FaceLinkError, Result};
use crate::scene::Scene;
use crate::swap::{SubstitutionOutcome, SwapSession};
use crate::sync::ManualDriver;

fn read_scene(path: &Path) -> Result<Scene> {
    let text = fs::read_to_string(path).map_err(|e| FaceLinkError::FileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Scene::from_json_str(&text)
}

fn describe_category(label: &str, config: &CategoryConfig) {
    println!(
        "{:<6} {} (M={:.2} L={:.0} U={:.0}{}{})",
        label,
        if config.enabled { "enabled " } else { "disabled" },
        config.multiplier,
        config.lower_threshold,
        config.upper_threshold,
        if config.is_inverted { " inverted" } else { "" },
        if config.is_disabled { " zeroed" } else { "" },
    );
}

/// Write the passthrough configuration.
pub fn init_config(path: &Path) -> Result<()> {
    info!("Writing default config to: {}", path.display());
    ConfigStore::passthrough().save(path)?;
    println!("Config written: {}", path.display());
    Ok(())
}

/// Parse a configuration strictly and summarize it.
pub fn check_config(path: &Path) -> Result<()> {
    info!("Checking config: {}", path.display());
    let store = ConfigStore::try_load(path)?;

    println!("Config OK: {}", path.display());
    println!("{:-<60}", "");
    describe_category("mouth", store.mouth_global());
    describe_category("eye", store.eye_global());

    let mut overrides: Vec<_> = store.overrides().collect();
    overrides.sort_by(|a, b| a.source_name.cmp(&b.source_name));
    println!("{} channel overrides", overrides.len());
    for item in overrides {
        println!(
            "    {:<32} M={:.2} L={:.0} U={:.0}{}{}",
            item.source_name,
            item.multiplier,
            item.lower_threshold,
            item.upper_threshold,
            if item.is_inverted { " inverted" } else { "" },
            if item.is_disabled { " disabled" } else { "" },
        );
    }
    Ok(())
}

/// Run a substitution and a number of synchronization frames.
pub fn substitute(
    host_path: &Path,
    replacement_path: &Path,
    config_path: Option<&Path>,
    frames: usize,
) -> Result<()> {
    info!(
        "Substituting {} into {}",
        replacement_path.display(),
        host_path.display()
    );

    let mut host = read_scene(host_path)?;
    let replacement = read_scene(replacement_path)?;
    let config = config_path
        .map(ConfigStore::load)
        .unwrap_or_else(ConfigStore::passthrough);

    let mut session = SwapSession::new(Some(replacement), config);
    match session.on_scene_initialized(&mut host, None) {
        SubstitutionOutcome::Substituted => {}
        SubstitutionOutcome::Skipped(reason) => {
            println!("Substitution skipped: {:?}", reason);
            return Ok(());
        }
        SubstitutionOutcome::Failed(e) => return Err(e),
    }

    let driver = ManualDriver::running();
    for _ in 0..frames {
        session.frame(&mut host, Some(&driver));
    }

    if let Some(report) = session.report() {
        println!("Substitution complete");
        println!("{:-<60}", "");
        println!("Injected principal part: {}", report.injected);
        println!("Hidden renderers: {}", report.disabled.len());
        println!("Joints bound to fallback: {}", report.fallback_joints);
        for node in &report.spawned {
            println!("Spawned: {}", host.name_of(*node).unwrap_or("?"));
        }
        for warning in &report.warnings {
            println!("Warning: {}", warning);
        }
    }

    if let Some(engine) = session.engine() {
        let rows = engine.debug_rows(&host);
        println!("{:-<60}", "");
        println!("{} mapped blend shapes after {} frames", rows.len(), frames);
        for row in rows {
            println!(
                "    {:<32} {:>6.1} -> {:>6.1}  [{}]",
                row.name, row.source_weight, row.output_weight, row.rule
            );
        }
    }

    Ok(())
}
