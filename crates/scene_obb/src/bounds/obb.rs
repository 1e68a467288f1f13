//! Oriented bounding box attached to a scene node
//!
//! The box stores its bounds in the node's local space and is never mutated.
//! Every world-space quantity (center, half-size, axes, bounding sphere) is
//! derived on demand from the node's current world transform, so the box
//! follows the node from frame to frame without being touched.

use std::hash::{Hash, Hasher};

use crate::foundation::math::{component_max, component_min, Point3, Vec3};
use crate::spatial::{sample_world, NodeHandle, SpatialProvider, StalePolicy, WorldSample};

use super::sat::{find_separating_axis, OrientedBox};
use super::sphere::BoundingSphere;

/// Number of scalars in the interleaved bounds layout
pub const INTERLEAVED_LEN: usize = 6;

/// Errors from building boxes out of untyped data
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoundsError {
    /// The interleaved bounds slice has the wrong length
    #[error("Expected {expected} interleaved bounds values, got {actual}")]
    InvalidLength {
        /// Required length
        expected: usize,
        /// Supplied length
        actual: usize,
    },
}

/// Local-space box bound to a scene node
///
/// `min <= max` component-wise is the caller's responsibility and is not
/// checked.
///
/// Equality and hashing compare the node handle and the bit patterns of
/// `min`/`max` (with `-0.0` folded into `0.0`): identical bounds on two
/// different nodes are different boxes. Use
/// [`OrientedBoundingBox::same_bounds`] to compare bounds alone.
#[derive(Debug, Clone, Copy)]
pub struct OrientedBoundingBox {
    min: Vec3,
    max: Vec3,
    node: NodeHandle,
}

impl OrientedBoundingBox {
    /// Creates a box from its local-space corners
    pub fn new(min: Vec3, max: Vec3, node: NodeHandle) -> Self {
        Self { min, max, node }
    }

    /// Creates a box from six scalars laid out as
    /// `[x_min, x_max, y_min, y_max, z_min, z_max]`.
    ///
    /// Note the interleaving: this is *not* `[min.xyz, max.xyz]`. Passing the
    /// latter silently yields wrong bounds.
    pub fn from_interleaved(bounds: [f32; INTERLEAVED_LEN], node: NodeHandle) -> Self {
        let [x_min, x_max, y_min, y_max, z_min, z_max] = bounds;
        Self::new(
            Vec3::new(x_min, y_min, z_min),
            Vec3::new(x_max, y_max, z_max),
            node,
        )
    }

    /// Like [`OrientedBoundingBox::from_interleaved`], validating the slice length
    pub fn try_from_slice(bounds: &[f32], node: NodeHandle) -> Result<Self, BoundsError> {
        let bounds: [f32; INTERLEAVED_LEN] = bounds.try_into().map_err(|_| BoundsError::InvalidLength {
            expected: INTERLEAVED_LEN,
            actual: bounds.len(),
        })?;
        Ok(Self::from_interleaved(bounds, node))
    }

    /// Local-space minimum corner
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Local-space maximum corner
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Handle of the node this box follows
    pub fn node(&self) -> NodeHandle {
        self.node
    }

    /// Local-space center
    pub fn local_center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Local-space half extents, before any node scale
    pub fn local_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Whether both boxes have the same local bounds, whatever their nodes
    ///
    /// Uses the same comparison as `==`: `-0.0` matches `0.0`, and a NaN
    /// bound matches only the identical NaN.
    pub fn same_bounds(&self, other: &Self) -> bool {
        self.bound_bits() == other.bound_bits()
    }

    /// The eight local-space corners; bit `i` of the index selects `max` on axis `i`
    pub fn local_corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|k| Vec3::from_fn(|i, _| if k & (1 << i) != 0 { self.max[i] } else { self.min[i] }))
    }

    /// Strict local-space containment: points on a face are outside
    pub fn is_inside(&self, point: &Vec3) -> bool {
        (0..3).all(|i| self.min[i] < point[i] && point[i] < self.max[i])
    }

    /// Axis-aligned union of both boxes' local bounds
    ///
    /// Keeps `self`'s node. The bounds are combined as plain numbers; if
    /// `other` sits on a node with a different transform the result is not
    /// meaningful.
    pub fn expand(&self, other: &Self) -> Self {
        Self::new(
            component_min(&self.min, &other.min),
            component_max(&self.max, &other.max),
            self.node,
        )
    }

    /// The same box shifted by `offset` in local space
    pub fn translate(&self, offset: &Vec3) -> Self {
        Self::new(self.min + offset, self.max + offset, self.node)
    }

    /// Box whose `min`/`max` are the world positions of this box's corners
    ///
    /// The node handle is kept even though the bounds are now in world space;
    /// further local-space operations on the result mix frames. Under
    /// rotation the returned `min` may exceed `max` on some axes. Without a
    /// usable node transform the box is returned unchanged.
    pub fn as_world<P>(&self, provider: &mut P) -> Self
    where
        P: SpatialProvider + ?Sized,
    {
        match sample_world(provider, self.node, StalePolicy::Refresh) {
            Some(sample) => {
                let (world_min, world_max) = self.world_min_max(&sample);
                Self::new(world_min.coords, world_max.coords, self.node)
            }
            None => *self,
        }
    }

    /// Conservative world-space sphere around the box
    ///
    /// Refreshes the node's world transform first if it is stale. Boxes on
    /// removed nodes or nodes without a transform get
    /// [`BoundingSphere::degenerate`].
    pub fn bounding_sphere<P>(&self, provider: &mut P) -> BoundingSphere
    where
        P: SpatialProvider + ?Sized,
    {
        self.bounding_sphere_with(provider, StalePolicy::Refresh)
    }

    /// [`OrientedBoundingBox::bounding_sphere`] with an explicit staleness policy
    pub fn bounding_sphere_with<P>(&self, provider: &mut P, policy: StalePolicy) -> BoundingSphere
    where
        P: SpatialProvider + ?Sized,
    {
        sample_world(provider, self.node, policy)
            .map_or_else(BoundingSphere::degenerate, |sample| self.sphere_in(&sample))
    }

    /// World-space center: midpoint of the transformed corners
    pub fn center<P>(&self, provider: &mut P) -> Option<Vec3>
    where
        P: SpatialProvider + ?Sized,
    {
        sample_world(provider, self.node, StalePolicy::Refresh).map(|sample| self.center_in(&sample))
    }

    /// World-space half extents along the node's axes
    ///
    /// The local half extents scaled by the node's world scale. Together with
    /// [`OrientedBoundingBox::axes`] they reproduce the transformed box
    /// exactly. When a rotated child sits under a non-uniformly scaled parent
    /// the axes are no longer orthogonal and the box is a parallelepiped.
    pub fn half_size<P>(&self, provider: &mut P) -> Option<Vec3>
    where
        P: SpatialProvider + ?Sized,
    {
        sample_world(provider, self.node, StalePolicy::Refresh).map(|sample| self.half_size_in(&sample))
    }

    /// World-space unit axes of the box (the node's local axes)
    pub fn axes<P>(&self, provider: &mut P) -> Option<[Vec3; 3]>
    where
        P: SpatialProvider + ?Sized,
    {
        sample_world(provider, self.node, StalePolicy::Refresh).map(|sample| sample.axes)
    }

    /// World-space snapshot fed to the separating-axis test
    pub fn to_oriented_box<P>(&self, provider: &mut P) -> Option<OrientedBox>
    where
        P: SpatialProvider + ?Sized,
    {
        sample_world(provider, self.node, StalePolicy::Refresh).map(|sample| self.oriented_box_in(&sample))
    }

    /// The eight world-space corners of the oriented box
    pub fn world_corners<P>(&self, provider: &mut P) -> Option<[Vec3; 8]>
    where
        P: SpatialProvider + ?Sized,
    {
        self.to_oriented_box(provider).map(|obb| obb.corners())
    }

    /// Whether this box overlaps `other` in world space
    ///
    /// Both bounding spheres are recomputed. Without `precise` the sphere
    /// test is the answer: it can report overlap for boxes that only come
    /// close, but never misses a real one. With `precise` a passing sphere
    /// test is confirmed by the separating-axis test.
    ///
    /// Boxes whose node is gone or has no transform never intersect anything.
    pub fn intersects<P>(&self, other: &Self, provider: &mut P, precise: bool) -> bool
    where
        P: SpatialProvider + ?Sized,
    {
        self.intersects_with(other, provider, precise, StalePolicy::Refresh)
    }

    /// [`OrientedBoundingBox::intersects`] with an explicit staleness policy
    pub fn intersects_with<P>(&self, other: &Self, provider: &mut P, precise: bool, policy: StalePolicy) -> bool
    where
        P: SpatialProvider + ?Sized,
    {
        let (Some(sample_a), Some(sample_b)) = (
            sample_world(provider, self.node, policy),
            sample_world(provider, other.node, policy),
        ) else {
            return false;
        };

        let sphere_a = self.sphere_in(&sample_a);
        let sphere_b = other.sphere_in(&sample_b);
        if !sphere_a.overlaps(&sphere_b) {
            log::trace!("Broad phase rejected {:?} / {:?}", self.node, other.node);
            return false;
        }
        if !precise {
            return true;
        }

        let box_a = self.oriented_box_in(&sample_a);
        let box_b = other.oriented_box_in(&sample_b);
        match find_separating_axis(&box_a, &box_b) {
            Some(axis) => {
                log::trace!("Narrow phase separated {:?} / {:?} on {:?}", self.node, other.node, axis);
                false
            }
            None => true,
        }
    }

    fn world_min_max(&self, sample: &WorldSample) -> (Point3, Point3) {
        (
            sample.matrix.transform_point(&Point3::from(self.min)),
            sample.matrix.transform_point(&Point3::from(self.max)),
        )
    }

    fn sphere_in(&self, sample: &WorldSample) -> BoundingSphere {
        let corners = self
            .local_corners()
            .map(|corner| sample.matrix.transform_point(&Point3::from(corner)));
        BoundingSphere::from_box_corners(&corners)
    }

    fn bound_bits(&self) -> [u32; 6] {
        // `+ 0.0` turns -0.0 into 0.0 and leaves every other value alone
        let bits = |v: f32| (v + 0.0).to_bits();
        [
            bits(self.min.x),
            bits(self.min.y),
            bits(self.min.z),
            bits(self.max.x),
            bits(self.max.y),
            bits(self.max.z),
        ]
    }

    fn center_in(&self, sample: &WorldSample) -> Vec3 {
        let (world_min, world_max) = self.world_min_max(sample);
        nalgebra::center(&world_min, &world_max).coords
    }

    fn half_size_in(&self, sample: &WorldSample) -> Vec3 {
        self.local_extents().component_mul(&sample.scale)
    }

    fn oriented_box_in(&self, sample: &WorldSample) -> OrientedBox {
        OrientedBox::new(self.center_in(sample), sample.axes, self.half_size_in(sample))
    }
}

impl PartialEq for OrientedBoundingBox {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.same_bounds(other)
    }
}

impl Eq for OrientedBoundingBox {}

impl Hash for OrientedBoundingBox {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bound_bits().hash(state);
        self.node.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Transform;
    use crate::scene::SceneGraph;
    use approx::assert_relative_eq;
    use std::collections::HashSet;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn unit_bounds(node: NodeHandle) -> OrientedBoundingBox {
        OrientedBoundingBox::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0), node)
    }

    #[test]
    fn test_interleaved_layout() {
        let mut graph = SceneGraph::new();
        let node = graph.add_node("n", Transform::identity());
        let obb = OrientedBoundingBox::from_interleaved([-1.0, 1.0, -2.0, 2.0, -3.0, 3.0], node);
        assert_eq!(obb.min(), Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(obb.max(), Vec3::new(1.0, 2.0, 3.0));

        let from_slice = OrientedBoundingBox::try_from_slice(&[-1.0, 1.0, -2.0, 2.0, -3.0, 3.0], node);
        assert_eq!(from_slice, Ok(obb));
        assert_eq!(
            OrientedBoundingBox::try_from_slice(&[0.0; 5], node),
            Err(BoundsError::InvalidLength { expected: 6, actual: 5 })
        );
    }

    #[test]
    fn test_is_inside_is_strict() {
        let mut graph = SceneGraph::new();
        let obb = unit_bounds(graph.add_node("n", Transform::identity()));
        assert!(obb.is_inside(&Vec3::zeros()));
        assert!(obb.is_inside(&Vec3::new(0.99, -0.99, 0.5)));
        assert!(!obb.is_inside(&Vec3::new(1.0, 0.0, 0.0)));
        assert!(!obb.is_inside(&Vec3::new(0.0, -1.0, 0.0)));
        assert!(!obb.is_inside(&Vec3::new(0.0, 0.0, 2.0)));
    }

    #[test]
    fn test_expand_and_translate_keep_first_node() {
        let mut graph = SceneGraph::new();
        let a_node = graph.add_node("a", Transform::identity());
        let b_node = graph.add_node("b", Transform::identity());
        let a = unit_bounds(a_node);
        let b = unit_bounds(b_node).translate(&Vec3::new(3.0, 0.0, -0.5));

        assert_eq!(b.min(), Vec3::new(2.0, -1.0, -1.5));
        assert_eq!(b.node(), b_node);

        let union = a.expand(&b);
        assert_eq!(union.min(), Vec3::new(-1.0, -1.0, -1.5));
        assert_eq!(union.max(), Vec3::new(4.0, 1.0, 1.0));
        assert_eq!(union.node(), a_node);
    }

    #[test]
    fn test_equality_includes_node() {
        let mut graph = SceneGraph::new();
        let a = unit_bounds(graph.add_node("a", Transform::identity()));
        let b = unit_bounds(graph.add_node("b", Transform::identity()));

        assert!(a.same_bounds(&b));
        assert_ne!(a, b);
        assert_eq!(a, unit_bounds(a.node()));

        let set: HashSet<_> = [a, b, unit_bounds(a.node())].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_signed_zero_bounds_are_equal() {
        let mut graph = SceneGraph::new();
        let node = graph.add_node("n", Transform::identity());
        let positive = OrientedBoundingBox::new(Vec3::new(0.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 0.0), node);
        let negative = OrientedBoundingBox::new(Vec3::new(-0.0, -1.0, -1.0), Vec3::new(1.0, 1.0, -0.0), node);

        assert!(positive.same_bounds(&negative));
        assert_eq!(positive, negative);

        let set: HashSet<_> = [positive, negative].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_sheared_child_still_intersects() {
        let mut graph = SceneGraph::new();
        let parent = graph.add_node("parent", Transform::identity().with_scale(Vec3::new(4.0, 0.25, 1.0)));
        let child = graph
            .add_child(parent, "child", Transform::identity().with_rotation_axis_angle(Vec3::z(), FRAC_PI_4))
            .unwrap();
        let sheared = unit_bounds(child);
        let small = OrientedBoundingBox::new(
            Vec3::new(-0.5, -0.5, -0.5),
            Vec3::new(0.5, 0.5, 0.5),
            graph.add_node("small", Transform::from_position(Vec3::new(5.3, 0.0, 0.0))),
        );

        // World (5, 0, 0) lies inside both boxes
        assert!(sheared.is_inside(&Vec3::new(0.884, -0.884, 0.0)));
        assert!(small.is_inside(&Vec3::new(-0.3, 0.0, 0.0)));

        assert!(sheared.intersects(&small, &mut graph, false));
        assert!(sheared.intersects(&small, &mut graph, true));
        assert!(small.intersects(&sheared, &mut graph, true));

        let sphere = sheared.bounding_sphere(&mut graph);
        for corner in sheared.world_corners(&mut graph).unwrap() {
            assert!((corner - sphere.origin).norm() <= sphere.radius + 1e-4);
        }
        assert!(!sheared.to_oriented_box(&mut graph).unwrap().is_orthogonal());
    }

    #[test]
    fn test_bounding_sphere_follows_node() {
        let mut graph = SceneGraph::new();
        let node = graph.add_node("n", Transform::from_position(Vec3::new(5.0, 0.0, 0.0)));
        let obb = OrientedBoundingBox::new(Vec3::new(-1.0, -2.0, -2.0), Vec3::new(1.0, 2.0, 2.0), node);

        let sphere = obb.bounding_sphere(&mut graph);
        assert_relative_eq!(sphere.origin, Vec3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(sphere.radius, 3.0);

        graph
            .set_local_transform(node, Transform::from_position(Vec3::new(0.0, 7.0, 0.0)).with_scale(Vec3::new(2.0, 2.0, 2.0)))
            .unwrap();
        let sphere = obb.bounding_sphere(&mut graph);
        assert_relative_eq!(sphere.origin, Vec3::new(0.0, 7.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(sphere.radius, 6.0, epsilon = 1e-5);
        assert!(!graph.is_world_stale(node));
    }

    #[test]
    fn test_sample_as_is_does_not_refresh() {
        let mut graph = SceneGraph::new();
        let node = graph.add_node("n", Transform::identity());
        let obb = unit_bounds(node);
        graph.update_world(node, false, false);

        graph
            .set_local_transform(node, Transform::from_position(Vec3::new(10.0, 0.0, 0.0)))
            .unwrap();
        let stale = obb.bounding_sphere_with(&mut graph, StalePolicy::SampleAsIs);
        assert_relative_eq!(stale.origin, Vec3::zeros());
        assert!(graph.is_world_stale(node));

        let fresh = obb.bounding_sphere_with(&mut graph, StalePolicy::Refresh);
        assert_relative_eq!(fresh.origin, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_missing_spatial_capability_degrades() {
        let mut graph = SceneGraph::new();
        let logic = graph.add_logic_node("logic");
        let spatial = graph.add_node("spatial", Transform::identity());
        let doomed = graph.add_node("doomed", Transform::identity());
        graph.remove_node(doomed).unwrap();

        let on_logic = unit_bounds(logic);
        let on_spatial = unit_bounds(spatial);
        let on_removed = unit_bounds(doomed);

        assert_eq!(on_logic.bounding_sphere(&mut graph), BoundingSphere::degenerate());
        assert_eq!(on_removed.bounding_sphere(&mut graph), BoundingSphere::degenerate());
        assert_eq!(on_logic.center(&mut graph), None);
        assert_eq!(on_removed.world_corners(&mut graph), None);
        assert_eq!(on_logic.as_world(&mut graph), on_logic);

        for precise in [false, true] {
            assert!(!on_logic.intersects(&on_spatial, &mut graph, precise));
            assert!(!on_spatial.intersects(&on_logic, &mut graph, precise));
            assert!(!on_logic.intersects(&on_logic, &mut graph, precise));
            assert!(!on_removed.intersects(&on_spatial, &mut graph, precise));
        }
    }

    #[test]
    fn test_half_size_scales_per_axis() {
        let mut graph = SceneGraph::new();
        let node = graph.add_node(
            "n",
            Transform::from_position(Vec3::new(1.0, 1.0, 1.0))
                .with_rotation_axis_angle(Vec3::z(), FRAC_PI_2)
                .with_scale(Vec3::new(2.0, 3.0, 4.0)),
        );
        let obb = OrientedBoundingBox::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 2.0), node);

        assert_relative_eq!(obb.half_size(&mut graph).unwrap(), Vec3::new(2.0, 3.0, 4.0), epsilon = 1e-5);

        // local center (1,1,1) -> scaled (2,3,4) -> rotated (-3,2,4) -> translated
        assert_relative_eq!(obb.center(&mut graph).unwrap(), Vec3::new(-2.0, 3.0, 5.0), epsilon = 1e-5);

        let axes = obb.axes(&mut graph).unwrap();
        assert_relative_eq!(axes[0], Vec3::y(), epsilon = 1e-5);
        assert_relative_eq!(axes[1], -Vec3::x(), epsilon = 1e-5);
    }

    #[test]
    fn test_as_world_transforms_corners() {
        let mut graph = SceneGraph::new();
        let node = graph.add_node(
            "n",
            Transform::from_position(Vec3::new(0.0, 0.0, 10.0)).with_rotation_axis_angle(Vec3::z(), FRAC_PI_2),
        );
        let obb = OrientedBoundingBox::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0), node);

        let world = obb.as_world(&mut graph);
        assert_relative_eq!(world.min(), Vec3::new(0.0, 0.0, 10.0), epsilon = 1e-5);
        // (1,2,3) rotated a quarter turn about z lands at (-2,1,3)
        assert_relative_eq!(world.max(), Vec3::new(-2.0, 1.0, 13.0), epsilon = 1e-5);
        assert_eq!(world.node(), node);
    }

    #[test]
    fn test_world_corners_bracket_sphere() {
        let mut graph = SceneGraph::new();
        let node = graph.add_node(
            "n",
            Transform::from_position(Vec3::new(3.0, -2.0, 1.0))
                .with_rotation_axis_angle(Vec3::new(1.0, 2.0, 3.0), 0.9)
                .with_scale(Vec3::new(1.0, 0.5, 2.0)),
        );
        let obb = OrientedBoundingBox::new(Vec3::new(-1.0, -2.0, 0.0), Vec3::new(3.0, 2.0, 1.0), node);

        let sphere = obb.bounding_sphere(&mut graph);
        for corner in obb.world_corners(&mut graph).unwrap() {
            assert_relative_eq!((corner - sphere.origin).norm(), sphere.radius, epsilon = 1e-4);
        }
    }
}
