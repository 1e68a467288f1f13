//! Bounding sphere used for the broad phase

use crate::foundation::math::{Point3, Vec3};

/// A world-space bounding sphere
///
/// Computed fresh for every query and never cached on the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center of the sphere in world space
    pub origin: Vec3,
    /// The radius of the sphere, never negative
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given origin and radius
    pub fn new(origin: Vec3, radius: f32) -> Self {
        Self { origin, radius }
    }

    /// Zero-radius sphere at the world origin
    ///
    /// Stands in for boxes whose node is gone or has no transform. Two
    /// degenerate spheres never overlap each other.
    pub fn degenerate() -> Self {
        Self::new(Vec3::zeros(), 0.0)
    }

    /// Sphere around the eight world-space corners of a transformed box
    ///
    /// Corners are indexed like [`crate::bounds::OrientedBox::corners`], so
    /// `corners[0]` is the transformed `min` and `corners[7]` the transformed
    /// `max`. The origin is their midpoint and the radius the distance to the
    /// farthest corner. Without shear every corner is equally far and the
    /// radius is the half-diagonal; under shear the sphere still encloses the
    /// whole parallelepiped.
    pub fn from_box_corners(corners: &[Point3; 8]) -> Self {
        let origin = nalgebra::center(&corners[0], &corners[7]);
        let radius = corners
            .iter()
            .map(|corner| nalgebra::distance(&origin, corner))
            .fold(0.0, f32::max);
        Self::new(origin.coords, radius)
    }

    /// Whether this sphere may overlap another
    ///
    /// Strict: spheres touching at exactly `r1 + r2` do not overlap.
    pub fn overlaps(&self, other: &BoundingSphere) -> bool {
        self.radius + other.radius > (self.origin - other.origin).norm()
    }

    /// Get the penetration depth if overlapping (0.0 if not)
    pub fn penetration_depth(&self, other: &BoundingSphere) -> f32 {
        let distance = (self.origin - other.origin).norm();
        let radius_sum = self.radius + other.radius;
        if distance < radius_sum {
            radius_sum - distance
        } else {
            0.0
        }
    }

    /// Whether a world-space point lies within or on the sphere
    pub fn contains_point(&self, point: &Vec3) -> bool {
        (point - self.origin).norm_squared() <= self.radius * self.radius
    }
}
