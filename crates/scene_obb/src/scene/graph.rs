//! Slot-map backed node hierarchy with lazily refreshed world transforms

use slotmap::SlotMap;

use crate::foundation::math::{Mat4, Transform};
use crate::spatial::{NodeHandle, SpatialProvider};

use super::node::SceneNode;

/// Errors from structural scene edits
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The handle does not refer to a live node
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeHandle),

    /// Re-parenting would make a node its own ancestor
    #[error("Attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected {
        /// Node being attached
        child: NodeHandle,
        /// Requested parent
        parent: NodeHandle,
    },

    /// The node is a logic node and has no transform to edit
    #[error("Node {0:?} has no spatial transform")]
    NotSpatial(NodeHandle),
}

/// Hierarchy of scene nodes
///
/// World matrices are cached per node and recomputed on demand. Editing a
/// local transform or re-parenting marks the affected subtree dirty; the
/// cache is brought up to date by [`SpatialProvider::update_world`], which
/// bounding-volume queries call themselves when they meet a dirty node.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeHandle, SceneNode>,
}

impl SceneGraph {
    /// Create a new empty scene graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root node with a local transform
    pub fn add_node(&mut self, name: impl Into<String>, transform: Transform) -> NodeHandle {
        self.nodes.insert(SceneNode::new(name.into(), Some(transform)))
    }

    /// Add a root node without spatial capability
    pub fn add_logic_node(&mut self, name: impl Into<String>) -> NodeHandle {
        self.nodes.insert(SceneNode::new(name.into(), None))
    }

    /// Add a spatial node directly under `parent`
    pub fn add_child(
        &mut self,
        parent: NodeHandle,
        name: impl Into<String>,
        transform: Transform,
    ) -> Result<NodeHandle, SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        let child = self.add_node(name, transform);
        self.attach(child, parent)?;
        Ok(child)
    }

    /// Re-parent `child` under `parent`, detaching it from any previous parent
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) -> Result<(), SceneError> {
        for handle in [child, parent] {
            if !self.nodes.contains_key(handle) {
                log::warn!("attach: dead handle {:?}", handle);
                return Err(SceneError::NodeNotFound(handle));
            }
        }

        let mut cursor = Some(parent);
        while let Some(handle) = cursor {
            if handle == child {
                return Err(SceneError::CycleDetected { child, parent });
            }
            cursor = self.nodes.get(handle).and_then(|n| n.parent);
        }

        self.unlink_from_parent(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
        self.mark_subtree_dirty(child);
        Ok(())
    }

    /// Make `child` a root node
    pub fn detach(&mut self, child: NodeHandle) -> Result<(), SceneError> {
        if !self.nodes.contains_key(child) {
            return Err(SceneError::NodeNotFound(child));
        }
        self.unlink_from_parent(child);
        self.mark_subtree_dirty(child);
        Ok(())
    }

    /// Remove a node together with its whole subtree; returns the number removed
    ///
    /// Handles to removed nodes stay valid values but resolve to nothing, so
    /// boxes still pointing at them degrade instead of reading a reused slot.
    pub fn remove_node(&mut self, node: NodeHandle) -> Result<usize, SceneError> {
        if !self.nodes.contains_key(node) {
            return Err(SceneError::NodeNotFound(node));
        }
        self.unlink_from_parent(node);

        let mut removed = 0;
        let mut stack = vec![node];
        while let Some(handle) = stack.pop() {
            if let Some(n) = self.nodes.remove(handle) {
                stack.extend(n.children);
                removed += 1;
            }
        }
        log::debug!("Removed {} node(s) rooted at {:?}", removed, node);
        Ok(removed)
    }

    /// Replace a spatial node's local transform and mark its subtree dirty
    pub fn set_local_transform(&mut self, node: NodeHandle, transform: Transform) -> Result<(), SceneError> {
        let n = self.nodes.get_mut(node).ok_or(SceneError::NodeNotFound(node))?;
        match n.local.as_mut() {
            Some(local) => *local = transform,
            None => return Err(SceneError::NotSpatial(node)),
        }
        self.mark_subtree_dirty(node);
        Ok(())
    }

    /// Look up a node
    pub fn node(&self, node: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(node)
    }

    /// Whether the handle refers to a live node
    pub fn contains(&self, node: NodeHandle) -> bool {
        self.nodes.contains_key(node)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Recompute world matrices; see [`SpatialProvider::update_world`]
    ///
    /// Dirty ancestors are recomputed first so the node sees its parents'
    /// current transforms. Returns the number of nodes recomputed.
    pub fn refresh_world(&mut self, node: NodeHandle, force: bool, recursive: bool) -> usize {
        if !self.nodes.contains_key(node) {
            log::warn!("update_world: dead handle {:?}", node);
            return 0;
        }

        let chain = self.ancestors_root_first(node);
        let last = chain.len() - 1;
        let mut parent_world = Mat4::identity();
        let mut upstream_changed = false;
        let mut recomputed = 0;

        for (depth, handle) in chain.into_iter().enumerate() {
            let Some(n) = self.nodes.get_mut(handle) else {
                return recomputed;
            };
            if n.world_dirty || upstream_changed || (force && depth == last) {
                n.recompute_world(&parent_world);
                upstream_changed = true;
                recomputed += 1;
            }
            parent_world = n.world;
        }

        if recursive {
            recomputed += self.refresh_descendants(node, force || upstream_changed);
        }

        if recomputed > 0 {
            log::debug!("Refreshed {} world transform(s) at node {:?}", recomputed, node);
        }
        recomputed
    }

    fn refresh_descendants(&mut self, root: NodeHandle, force: bool) -> usize {
        let Some(root_node) = self.nodes.get(root) else {
            return 0;
        };
        let root_world = root_node.world;
        let mut stack: Vec<(NodeHandle, Mat4)> =
            root_node.children.iter().map(|&c| (c, root_world)).collect();

        let mut recomputed = 0;
        while let Some((handle, parent_world)) = stack.pop() {
            let Some(n) = self.nodes.get_mut(handle) else {
                continue;
            };
            if force || n.world_dirty {
                n.recompute_world(&parent_world);
                recomputed += 1;
            }
            let world = n.world;
            stack.extend(n.children.iter().map(|&c| (c, world)));
        }
        recomputed
    }

    /// `node` and its ancestors, outermost first
    fn ancestors_root_first(&self, node: NodeHandle) -> Vec<NodeHandle> {
        let mut chain = Vec::new();
        let mut cursor = Some(node);
        while let Some(handle) = cursor {
            chain.push(handle);
            cursor = self.nodes.get(handle).and_then(|n| n.parent);
        }
        chain.reverse();
        chain
    }

    fn unlink_from_parent(&mut self, child: NodeHandle) {
        let Some(parent) = self.nodes.get_mut(child).and_then(|c| c.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|&c| c != child);
        }
    }

    fn mark_subtree_dirty(&mut self, root: NodeHandle) {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            if let Some(n) = self.nodes.get_mut(handle) {
                n.world_dirty = true;
                stack.extend(n.children.iter().copied());
            }
        }
    }
}

impl SpatialProvider for SceneGraph {
    fn world_matrix(&self, node: NodeHandle) -> Option<Mat4> {
        self.nodes
            .get(node)
            .filter(|n| n.is_spatial())
            .map(|n| n.world)
    }

    fn is_world_stale(&self, node: NodeHandle) -> bool {
        self.nodes.get(node).is_some_and(|n| n.world_dirty)
    }

    fn update_world(&mut self, node: NodeHandle, force: bool, recursive: bool) {
        self.refresh_world(node, force, recursive);
    }
}
