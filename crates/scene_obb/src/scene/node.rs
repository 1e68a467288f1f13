//! Scene node storage record

use crate::foundation::math::{Mat4, Transform};
use crate::spatial::NodeHandle;

/// A node in the [`super::SceneGraph`]
///
/// Spatial nodes carry a local [`Transform`]; logic nodes do not and act as
/// identity pass-throughs for their children.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub(super) name: String,
    pub(super) local: Option<Transform>,
    pub(super) parent: Option<NodeHandle>,
    pub(super) children: Vec<NodeHandle>,
    pub(super) world: Mat4,
    pub(super) world_dirty: bool,
}

impl SceneNode {
    pub(super) fn new(name: String, local: Option<Transform>) -> Self {
        Self {
            name,
            local,
            parent: None,
            children: Vec::new(),
            world: Mat4::identity(),
            world_dirty: true,
        }
    }

    /// Debug name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local transform, `None` for logic nodes
    pub fn local_transform(&self) -> Option<&Transform> {
        self.local.as_ref()
    }

    /// Whether this node carries a transform
    pub fn is_spatial(&self) -> bool {
        self.local.is_some()
    }

    /// Parent handle
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Child handles in insertion order
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Cached world matrix; only meaningful when not dirty
    pub fn cached_world(&self) -> &Mat4 {
        &self.world
    }

    /// Whether the cached world matrix needs recomputing
    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty
    }

    /// Recompute the world matrix from the parent's
    pub(super) fn recompute_world(&mut self, parent_world: &Mat4) {
        self.world = match &self.local {
            Some(local) => parent_world * local.to_matrix(),
            None => *parent_world,
        };
        self.world_dirty = false;
    }
}
