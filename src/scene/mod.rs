//! Scene Module
//!
//! Host-agnostic model of a rendered character:
//! - Named node tree (skeleton joints and mesh holders)
//! - Mesh resources with named deformation channels
//! - Skinned renderers binding meshes to joints

mod graph;
mod mesh;

pub use graph::{Node, NodeId, RendererId, Scene};
pub use mesh::{
    Material, Mesh, ShaderCatalog, ShaderLibrary, SkinnedRenderer, MAX_WEIGHT, MIN_WEIGHT,
};
