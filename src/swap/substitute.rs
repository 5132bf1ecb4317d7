//! Model substitution
//!
//! Moves the skinned geometry of a replacement instance onto the host
//! character's existing skeleton:
//!
//! 1. Hide every host renderer except the facial one
//! 2. Find the host root joint
//! 3. For each replacement part: remap joints by name, force the host shader,
//!    then either inject the principal part into the facial renderer in place
//!    or spawn a new `<part>_Mod` node for an accessory part
//!
//! The replacement instance is consumed; only its data survives.

use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::error::{FaceLinkError, Result, SubstitutionWarning};
use crate::scene::{Material, Mesh, NodeId, RendererId, Scene, ShaderLibrary, SkinnedRenderer};

/// Node name of the host renderer that receives the principal part
pub const FACE_RENDERER_NAME: &str = "Face";

/// Name of the replacement part injected in place
pub const PRINCIPAL_PART_NAME: &str = "Face";

/// Host skeleton root, also the fallback for unmatched joints
pub const ROOT_JOINT_NAME: &str = "Character_Hips";

/// Shader every replacement material is forced onto
pub const FORCED_SHADER_NAME: &str = "Universal Render Pipeline/Lit";

/// Suffix of nodes spawned for accessory parts
pub const ACCESSORY_SUFFIX: &str = "_Mod";

/// What a successful substitution changed in the host scene
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubstitutionReport {
    /// Host renderer now carrying the principal part
    pub face_renderer: Option<RendererId>,
    pub root_joint: Option<NodeId>,
    /// Whether a principal part was found and injected
    pub injected: bool,
    /// Nodes created for accessory parts
    pub spawned: Vec<NodeId>,
    /// Host renderers that were hidden
    pub disabled: Vec<RendererId>,
    /// Joints bound to the root joint because no host joint matched
    pub fallback_joints: usize,
    pub warnings: Vec<SubstitutionWarning>,
}

/// Replacement part data after remapping onto the host skeleton
struct PreparedPart {
    name: String,
    mesh: Option<Arc<Mesh>>,
    materials: Vec<Material>,
    bones: Vec<NodeId>,
}

/// Hide non-facial host renderers and return the facial one
///
/// Nothing is modified when the facial renderer is missing.
fn isolate_face_renderer(
    host: &mut Scene,
    character_root: NodeId,
) -> Result<(RendererId, Vec<RendererId>)> {
    let renderers = host.renderers_under(character_root);
    let face = renderers
        .iter()
        .copied()
        .find(|&id| host.renderer_name(id) == Some(FACE_RENDERER_NAME))
        .ok_or_else(|| FaceLinkError::MissingTargetRenderer {
            name: FACE_RENDERER_NAME.to_string(),
        })?;

    let mut disabled = Vec::new();
    for id in renderers {
        if let Some(renderer) = host.renderer_mut(id) {
            if id == face {
                renderer.enabled = true;
            } else {
                renderer.enabled = false;
                disabled.push(id);
            }
        }
    }
    debug!(
        "[SWAP] Found original {} renderer, hid {} others",
        FACE_RENDERER_NAME,
        disabled.len()
    );
    Ok((face, disabled))
}

/// Host joints matching each replacement joint by name
///
/// Unmatched joints bind to `fallback` so their vertices follow the skeleton
/// instead of collapsing to the world origin.
fn remap_bones(
    host: &Scene,
    character_root: NodeId,
    replacement: &Scene,
    part: &SkinnedRenderer,
    fallback: NodeId,
    fallback_count: &mut usize,
) -> Vec<NodeId> {
    part.bones
        .iter()
        .map(|&bone| {
            replacement
                .name_of(bone)
                .and_then(|name| host.find_descendant_by_name(character_root, name))
                .unwrap_or_else(|| {
                    *fallback_count += 1;
                    fallback
                })
        })
        .collect()
}

/// Materials re-targeted to the forced shader
///
/// If the shader cannot be resolved the materials are returned unchanged and
/// a warning is recorded.
fn prepare_materials(
    part_name: &str,
    part: &SkinnedRenderer,
    shaders: &dyn ShaderLibrary,
    warnings: &mut Vec<SubstitutionWarning>,
) -> Vec<Material> {
    let mut materials = part.materials.clone();
    match shaders.resolve(FORCED_SHADER_NAME) {
        Some(shader) => {
            for material in &mut materials {
                material.shader = shader.clone();
            }
        }
        None => {
            let warning = SubstitutionWarning::ShaderResolution {
                part: part_name.to_string(),
                shader: FORCED_SHADER_NAME.to_string(),
            };
            warn!("[SWAP] {}", warning);
            warnings.push(warning);
        }
    }
    materials
}

fn inject_face(host: &mut Scene, face: RendererId, part: PreparedPart, root_joint: NodeId) {
    info!("[SWAP] Injecting custom mesh into {} renderer", FACE_RENDERER_NAME);
    if let Some(target) = host.renderer_mut(face) {
        target.set_mesh(part.mesh);
        target.materials = part.materials;
        target.bones = part.bones;
        target.root_bone = Some(root_joint);
    }
}

fn spawn_accessory(
    host: &mut Scene,
    character_root: NodeId,
    part: PreparedPart,
    root_joint: NodeId,
) -> Result<NodeId> {
    let name = format!("{}{}", part.name, ACCESSORY_SUFFIX);
    let node = host.add_node(&name, Some(character_root));
    let renderer = SkinnedRenderer::new(part.mesh)
        .with_materials(part.materials)
        .with_bones(part.bones, Some(root_joint));
    host.attach_renderer(node, renderer)?;
    debug!("[SWAP] Created mesh part: {}", name);
    Ok(node)
}

/// Replace the host character's geometry with the replacement's parts
///
/// `replacement` is a freshly instantiated copy and is dropped on return,
/// whether or not the substitution succeeded.
pub fn replace_renderers(
    host: &mut Scene,
    character_root: NodeId,
    replacement: Scene,
    shaders: &dyn ShaderLibrary,
) -> Result<SubstitutionReport> {
    let (face, disabled) = isolate_face_renderer(host, character_root).map_err(|e| {
        error!("[SWAP] Failed to find original {} component", FACE_RENDERER_NAME);
        e
    })?;

    let root_joint = host
        .find_descendant_by_name(character_root, ROOT_JOINT_NAME)
        .ok_or_else(|| {
            error!("[SWAP] {} not found", ROOT_JOINT_NAME);
            FaceLinkError::MissingRootJoint {
                name: ROOT_JOINT_NAME.to_string(),
            }
        })?;

    let mut report = SubstitutionReport {
        face_renderer: Some(face),
        root_joint: Some(root_joint),
        disabled,
        ..SubstitutionReport::default()
    };

    let parts: Vec<RendererId> = replacement
        .roots()
        .flat_map(|root| replacement.renderers_under(root))
        .collect();

    for id in parts {
        let Some(part) = replacement.renderer(id) else {
            continue;
        };
        let name = replacement.name_of(part.node).unwrap_or_default().to_string();

        let bones = remap_bones(
            host,
            character_root,
            &replacement,
            part,
            root_joint,
            &mut report.fallback_joints,
        );
        let materials = prepare_materials(&name, part, shaders, &mut report.warnings);
        let prepared = PreparedPart {
            name,
            mesh: part.mesh.clone(),
            materials,
            bones,
        };

        if prepared.name == PRINCIPAL_PART_NAME && !report.injected {
            inject_face(host, face, prepared, root_joint);
            report.injected = true;
        } else {
            let node = spawn_accessory(host, character_root, prepared, root_joint)?;
            report.spawned.push(node);
        }
    }

    if !report.injected {
        warn!(
            "[SWAP] Replacement has no '{}' part, facial mesh left unchanged",
            PRINCIPAL_PART_NAME
        );
    }
    if report.fallback_joints > 0 {
        debug!(
            "[SWAP] {} joints bound to {} fallback",
            report.fallback_joints, ROOT_JOINT_NAME
        );
    }

    Ok(report)
}
