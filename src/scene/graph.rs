//! Scene graph
//!
//! Arena of named nodes with parent/child links. Nodes are addressed by
//! `NodeId` and identified for matching purposes by name only; two nodes may
//! share a name, in which case searches return the first in depth-first
//! pre-order.

use serde::{Deserialize, Serialize};

use super::mesh::SkinnedRenderer;
use crate::error::{FaceLinkError, Result};

/// Index of a node inside a `Scene`
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// Index of a skinned renderer inside a `Scene`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RendererId(pub usize);

fn default_true() -> bool {
    true
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// A named node (joint, mesh holder, or grouping object)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub parent: Option<NodeId>,
    /// Rebuilt from `parent` links by `Scene::relink`
    #[serde(skip)]
    pub children: Vec<NodeId>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub local_position: [f32; 3],
    #[serde(default = "default_scale")]
    pub local_scale: [f32; 3],
    #[serde(default)]
    pub renderer: Option<RendererId>,
}

impl Node {
    fn new(name: &str, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            active: true,
            local_position: [0.0; 3],
            local_scale: default_scale(),
            renderer: None,
        }
    }
}

/// Tree-shaped ownership structure holding nodes and their renderers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    nodes: Vec<Node>,
    #[serde(default)]
    renderers: Vec<SkinnedRenderer>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a scene description and rebuild its child links
    pub fn from_json_str(text: &str) -> Result<Self> {
        let mut scene: Scene = serde_json::from_str(text)?;
        scene.relink()?;
        Ok(scene)
    }

    /// Serialize the scene description
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rebuild `children` lists from `parent` links and validate references
    pub fn relink(&mut self) -> Result<()> {
        for node in &mut self.nodes {
            node.children.clear();
        }
        for index in 0..self.nodes.len() {
            if let Some(parent) = self.nodes[index].parent {
                if parent.0 >= self.nodes.len() {
                    return Err(FaceLinkError::UnknownNode { index: parent.0 });
                }
                self.nodes[parent.0].children.push(NodeId(index));
            }
            if let Some(renderer) = self.nodes[index].renderer {
                if renderer.0 >= self.renderers.len() {
                    return Err(FaceLinkError::UnknownRenderer { index: renderer.0 });
                }
            }
        }
        self.check_acyclic()?;
        for renderer in &self.renderers {
            for bone in renderer.bones.iter().chain(renderer.root_bone.iter()) {
                if bone.0 >= self.nodes.len() {
                    return Err(FaceLinkError::UnknownNode { index: bone.0 });
                }
            }
            if renderer.node.0 >= self.nodes.len() {
                return Err(FaceLinkError::UnknownNode {
                    index: renderer.node.0,
                });
            }
        }
        Ok(())
    }

    /// Reject parent chains that loop back on themselves
    fn check_acyclic(&self) -> Result<()> {
        for start in 0..self.nodes.len() {
            let mut current = self.nodes[start].parent;
            let mut steps = 0;
            while let Some(parent) = current {
                steps += 1;
                if parent.0 == start || steps > self.nodes.len() {
                    return Err(FaceLinkError::CyclicHierarchy { index: start });
                }
                current = self.nodes.get(parent.0).and_then(|n| n.parent);
            }
        }
        Ok(())
    }

    /// Add a node under `parent` (or as a root) and return its id
    ///
    /// The node is attached with an identity local transform.
    pub fn add_node(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name, parent));
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p.0)) {
            parent.children.push(id);
        }
        id
    }

    /// Attach a renderer to an existing node
    pub fn attach_renderer(
        &mut self,
        node: NodeId,
        mut renderer: SkinnedRenderer,
    ) -> Result<RendererId> {
        let id = RendererId(self.renderers.len());
        let slot = self
            .nodes
            .get_mut(node.0)
            .ok_or(FaceLinkError::UnknownNode { index: node.0 })?;
        slot.renderer = Some(id);
        renderer.node = node;
        self.renderers.push(renderer);
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn renderer(&self, id: RendererId) -> Option<&SkinnedRenderer> {
        self.renderers.get(id.0)
    }

    pub fn renderer_mut(&mut self, id: RendererId) -> Option<&mut SkinnedRenderer> {
        self.renderers.get_mut(id.0)
    }

    /// Name of a node, if it exists
    pub fn name_of(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.name.as_str())
    }

    /// Name of the node owning a renderer
    pub fn renderer_name(&self, id: RendererId) -> Option<&str> {
        self.renderer(id).and_then(|r| self.name_of(r.node))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn renderer_count(&self) -> usize {
        self.renderers.len()
    }

    /// Nodes without a parent
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(i, _)| NodeId(i))
    }

    /// First root node with the given name
    pub fn find_root(&self, name: &str) -> Option<NodeId> {
        self.roots().find(|&id| self.name_of(id) == Some(name))
    }

    /// Depth-first search for `name` starting at (and including) `from`
    ///
    /// Pure and total: unknown start nodes and missing names both yield `None`.
    pub fn find_descendant_by_name(&self, from: NodeId, name: &str) -> Option<NodeId> {
        self.walk(from).find(|&id| self.name_of(id) == Some(name))
    }

    /// All nodes in the subtree rooted at `from`, pre-order
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        self.walk(from).collect()
    }

    /// Pre-order traversal that visits each node at most once
    fn walk(&self, from: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![from];
        std::iter::from_fn(move || {
            while let Some(id) = stack.pop() {
                let Some(node) = self.nodes.get(id.0) else {
                    continue;
                };
                if std::mem::replace(&mut seen[id.0], true) {
                    continue;
                }
                stack.extend(node.children.iter().rev().copied());
                return Some(id);
            }
            None
        })
    }

    /// All renderers attached to nodes in the subtree rooted at `from`
    pub fn renderers_under(&self, from: NodeId) -> Vec<RendererId> {
        self.descendants(from)
            .into_iter()
            .filter_map(|id| self.node(id).and_then(|n| n.renderer))
            .collect()
    }

    /// Children of a node (empty for unknown ids)
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let root = scene.add_node("Character", None);
        let hips = scene.add_node("Character_Hips", Some(root));
        let spine = scene.add_node("Spine", Some(hips));
        scene.add_node("Head", Some(spine));
        scene.add_node("LeftLeg", Some(hips));
        (scene, root)
    }

    #[test]
    fn test_find_descendant_includes_start() {
        let (scene, root) = rig();
        assert_eq!(scene.find_descendant_by_name(root, "Character"), Some(root));
    }

    #[test]
    fn test_find_descendant_deep() {
        let (scene, root) = rig();
        let head = scene.find_descendant_by_name(root, "Head").unwrap();
        assert_eq!(scene.name_of(head), Some("Head"));
    }

    #[test]
    fn test_find_descendant_missing_is_none() {
        let (scene, root) = rig();
        assert_eq!(scene.find_descendant_by_name(root, "Tail"), None);
        assert_eq!(scene.find_descendant_by_name(NodeId(999), "Head"), None);
    }

    #[test]
    fn test_find_descendant_does_not_search_upwards() {
        let (scene, root) = rig();
        let spine = scene.find_descendant_by_name(root, "Spine").unwrap();
        assert_eq!(scene.find_descendant_by_name(spine, "LeftLeg"), None);
    }

    #[test]
    fn test_descendants_preorder() {
        let (scene, root) = rig();
        let names: Vec<_> = scene
            .descendants(root)
            .into_iter()
            .map(|id| scene.name_of(id).unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["Character", "Character_Hips", "Spine", "Head", "LeftLeg"]
        );
    }

    #[test]
    fn test_json_relinks_children() {
        let text = r#"{
            "nodes": [
                { "name": "Character" },
                { "name": "Character_Hips", "parent": 0 }
            ]
        }"#;
        let scene = Scene::from_json_str(text).unwrap();
        assert_eq!(scene.children_of(NodeId(0)), &[NodeId(1)]);
        assert!(scene.node(NodeId(1)).unwrap().active);
    }

    #[test]
    fn test_json_rejects_parent_cycles() {
        let text = r#"{ "nodes": [ { "name": "Character", "parent": 0 } ] }"#;
        let err = Scene::from_json_str(text).unwrap_err();
        assert_eq!(err.error_code(), "CYCLIC_HIERARCHY");

        let text = r#"{
            "nodes": [
                { "name": "World" },
                { "name": "Character", "parent": 2 },
                { "name": "Character_Hips", "parent": 1 }
            ]
        }"#;
        let err = Scene::from_json_str(text).unwrap_err();
        assert_eq!(err.error_code(), "CYCLIC_HIERARCHY");
    }

    #[test]
    fn test_search_terminates_on_looped_children() {
        let (mut scene, root) = rig();
        let head = scene.find_descendant_by_name(root, "Head").unwrap();
        scene.node_mut(head).unwrap().children.push(root);

        assert_eq!(scene.find_descendant_by_name(root, "Tail"), None);
        assert_eq!(scene.descendants(root).len(), 5);
    }

    #[test]
    fn test_json_rejects_dangling_parent() {
        let text = r#"{ "nodes": [ { "name": "A", "parent": 4 } ] }"#;
        let err = Scene::from_json_str(text).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_NODE");
    }
}
