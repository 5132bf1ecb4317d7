//! Mesh resources, materials and skinned renderers

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::graph::NodeId;

/// Lowest deformation channel weight
pub const MIN_WEIGHT: f32 = 0.0;

/// Highest deformation channel weight
pub const MAX_WEIGHT: f32 = 100.0;

/// Shared mesh resource
///
/// Only the deformation channel names matter here; channel indices are local
/// to the mesh and matched across meshes purely by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    #[serde(default)]
    pub channels: Vec<String>,
}

impl Mesh {
    pub fn new(name: &str, channels: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            channels: channels.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel_name(&self, index: usize) -> Option<&str> {
        self.channels.get(index).map(String::as_str)
    }

    /// Index of the first channel with exactly this name
    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.channels.iter().position(|c| c == name)
    }
}

/// Material bound to a renderer slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub shader: String,
}

impl Material {
    pub fn new(name: &str, shader: &str) -> Self {
        Self {
            name: name.to_string(),
            shader: shader.to_string(),
        }
    }
}

/// Resolves shader names available to the host renderer
pub trait ShaderLibrary {
    /// Return the canonical shader name if the host can render it
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Fixed set of known shader names
#[derive(Debug, Clone, Default)]
pub struct ShaderCatalog {
    names: HashSet<String>,
}

impl ShaderCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl ShaderLibrary for ShaderCatalog {
    fn resolve(&self, name: &str) -> Option<String> {
        self.names.get(name).cloned()
    }
}

fn default_true() -> bool {
    true
}

/// Renderer binding a mesh, materials and a joint array to a node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkinnedRenderer {
    /// Owning node; set by `Scene::attach_renderer`
    pub node: NodeId,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub mesh: Option<Arc<Mesh>>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub bones: Vec<NodeId>,
    #[serde(default)]
    pub root_bone: Option<NodeId>,
    #[serde(default)]
    weights: Vec<f32>,
}

impl SkinnedRenderer {
    /// Create an enabled renderer with all channel weights at zero
    pub fn new(mesh: Option<Arc<Mesh>>) -> Self {
        let weights = vec![MIN_WEIGHT; mesh.as_ref().map_or(0, |m| m.channel_count())];
        Self {
            node: NodeId::default(),
            enabled: true,
            mesh,
            materials: Vec::new(),
            bones: Vec::new(),
            root_bone: None,
            weights,
        }
    }

    pub fn with_materials(mut self, materials: Vec<Material>) -> Self {
        self.materials = materials;
        self
    }

    pub fn with_bones(mut self, bones: Vec<NodeId>, root_bone: Option<NodeId>) -> Self {
        self.bones = bones;
        self.root_bone = root_bone;
        self
    }

    /// Swap the mesh resource; channel weights restart at zero
    pub fn set_mesh(&mut self, mesh: Option<Arc<Mesh>>) {
        self.weights = vec![MIN_WEIGHT; mesh.as_ref().map_or(0, |m| m.channel_count())];
        self.mesh = mesh;
    }

    /// Current weight of a channel (0 for out-of-range indices)
    pub fn weight(&self, index: usize) -> f32 {
        self.weights.get(index).copied().unwrap_or(MIN_WEIGHT)
    }

    /// Set a channel weight; ignored for channels the mesh does not have
    pub fn set_weight(&mut self, index: usize, weight: f32) {
        let count = self.mesh.as_ref().map_or(0, |m| m.channel_count());
        if index >= count {
            return;
        }
        if self.weights.len() < count {
            self.weights.resize(count, MIN_WEIGHT);
        }
        self.weights[index] = weight;
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_lookup() {
        let mesh = Mesh::new("face", &["Mouth_A", "Eye_Wide", "Eye_Blink"]);
        assert_eq!(mesh.channel_index("Eye_Wide"), Some(1));
        assert_eq!(mesh.channel_index("eye_wide"), None);
        assert_eq!(mesh.channel_name(2), Some("Eye_Blink"));
        assert_eq!(mesh.channel_name(3), None);
    }

    #[test]
    fn test_weights_follow_mesh() {
        let mut renderer = SkinnedRenderer::new(Some(Arc::new(Mesh::new("a", &["x", "y"]))));
        renderer.set_weight(1, 40.0);
        renderer.set_weight(5, 90.0);
        assert_eq!(renderer.weight(1), 40.0);
        assert_eq!(renderer.weight(5), 0.0);

        renderer.set_mesh(Some(Arc::new(Mesh::new("b", &["x", "y", "z"]))));
        assert_eq!(renderer.weights(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_deserialized_renderer_accepts_weights() {
        let mut renderer: SkinnedRenderer = serde_json::from_str(
            r#"{ "node": 0, "mesh": { "name": "m", "channels": ["a", "b"] } }"#,
        )
        .unwrap();
        renderer.set_weight(1, 12.5);
        assert_eq!(renderer.weight(1), 12.5);
        assert!(renderer.enabled);
    }

    #[test]
    fn test_shader_catalog() {
        let catalog = ShaderCatalog::new(["Lit"]);
        assert_eq!(catalog.resolve("Lit").as_deref(), Some("Lit"));
        assert!(catalog.resolve("Toon").is_none());
    }
}
