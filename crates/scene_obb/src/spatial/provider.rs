//! The consumed side of the scene: world transforms per node

use crate::foundation::math::{matrix_axes, matrix_scale, Mat4, Point3, Vec3};

use super::NodeHandle;

/// Read access to node world transforms, plus an on-demand refresh
///
/// Implementors keep a cached world matrix per node and a staleness flag. All
/// accessors return `None` for nodes that no longer exist or that have no
/// spatial capability; callers degrade instead of failing.
///
/// The provider is single-writer: transform edits and refreshes must not
/// overlap a query. Queries take the provider by `&mut` because they may
/// perform the lazy refresh themselves.
pub trait SpatialProvider {
    /// Cached world matrix (`parent_world * local`) of a spatial node
    fn world_matrix(&self, node: NodeHandle) -> Option<Mat4>;

    /// Whether the cached world matrix lags behind a local transform edit
    fn is_world_stale(&self, node: NodeHandle) -> bool;

    /// Recompute the cached world matrix from the parent chain.
    ///
    /// Without `force`, clean nodes are left untouched. With `recursive`, every
    /// descendant is brought up to date as well.
    fn update_world(&mut self, node: NodeHandle, force: bool, recursive: bool);

    /// Whether the node exists and carries a transform
    fn has_spatial(&self, node: NodeHandle) -> bool {
        self.world_matrix(node).is_some()
    }

    /// Map a point from the node's local space into world space
    fn world_position(&self, node: NodeHandle, local: &Point3) -> Option<Point3> {
        self.world_matrix(node).map(|m| m.transform_point(local))
    }

    /// World-space unit vectors of the node's local x, y and z axes
    fn local_axes(&self, node: NodeHandle) -> Option<[Vec3; 3]> {
        self.world_matrix(node).map(|m| matrix_axes(&m))
    }

    /// Accumulated world scale along the node's local axes
    fn world_scale(&self, node: NodeHandle) -> Option<Vec3> {
        self.world_matrix(node).map(|m| matrix_scale(&m))
    }
}

/// What to do when a node's world transform is stale at query time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Refresh the node and its subtree before sampling
    #[default]
    Refresh,
    /// Sample the cached matrix as-is; the caller refreshes once per frame
    SampleAsIs,
}

/// Snapshot of a node's world transform taken for one query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldSample {
    /// Full affine world matrix
    pub matrix: Mat4,
    /// Unit world axes (normalised matrix columns)
    pub axes: [Vec3; 3],
    /// World scale (matrix column lengths)
    pub scale: Vec3,
}

/// Bring a node up to date according to `policy` and snapshot its transform
///
/// Returns `None` when the node is gone or has no spatial capability. Runs
/// once per box per query, so it only logs at `debug`; batch callers report
/// unresolved boxes themselves.
pub fn sample_world<P>(provider: &mut P, node: NodeHandle, policy: StalePolicy) -> Option<WorldSample>
where
    P: SpatialProvider + ?Sized,
{
    if !provider.has_spatial(node) {
        log::debug!("Node {:?} has no spatial capability; using degenerate bounds", node);
        return None;
    }

    if provider.is_world_stale(node) {
        match policy {
            StalePolicy::Refresh => provider.update_world(node, false, true),
            StalePolicy::SampleAsIs => {
                log::debug!("Sampling stale world transform of node {:?}", node);
            }
        }
    }

    let matrix = provider.world_matrix(node)?;
    Some(WorldSample {
        matrix,
        axes: provider.local_axes(node)?,
        scale: provider.world_scale(node)?,
    })
}
