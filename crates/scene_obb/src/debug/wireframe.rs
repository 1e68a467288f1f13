//! Line data for visualising boxes and their query results
//!
//! Nothing here renders; an external renderer consumes [`LineVertex`] lists.

use bytemuck::{Pod, Zeroable};

use crate::bounds::{BoundingSphere, OrientedBoundingBox, OrientedBox};
use crate::foundation::math::{Vec3, Vec4};
use crate::spatial::SpatialProvider;

/// Corner index pairs forming the twelve box edges (see [`OrientedBox::corners`])
const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1), (2, 3), (4, 5), (6, 7),
    (0, 2), (1, 3), (4, 6), (5, 7),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

/// Color scheme for query visualization
#[derive(Clone, Debug, PartialEq)]
pub struct DebugColors {
    /// Boxes whose spheres do not overlap
    pub separated: Vec4,

    /// Boxes whose spheres overlap but whose exact shapes do not
    pub broad_phase: Vec4,

    /// Boxes that overlap exactly
    pub colliding: Vec4,
}

impl Default for DebugColors {
    fn default() -> Self {
        Self {
            separated: Vec4::new(0.0, 1.0, 0.0, 0.3),   // Green, semi-transparent
            broad_phase: Vec4::new(1.0, 0.8, 0.0, 0.5), // Amber
            colliding: Vec4::new(1.0, 0.0, 0.0, 0.5),   // Red, semi-transparent
        }
    }
}

/// How far a pair got through the two test phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactState {
    /// Rejected by the sphere test
    Separated,
    /// Passed the sphere test, rejected by the separating-axis test
    BroadPhaseOnly,
    /// Passed both tests
    Colliding,
}

impl ContactState {
    /// Run both phases on a pair
    pub fn classify<P>(a: &OrientedBoundingBox, b: &OrientedBoundingBox, provider: &mut P) -> Self
    where
        P: SpatialProvider + ?Sized,
    {
        if !a.intersects(b, provider, false) {
            Self::Separated
        } else if a.intersects(b, provider, true) {
            Self::Colliding
        } else {
            Self::BroadPhaseOnly
        }
    }

    /// Colour used for this state
    pub fn color(self, colors: &DebugColors) -> Vec4 {
        match self {
            Self::Separated => colors.separated,
            Self::BroadPhaseOnly => colors.broad_phase,
            Self::Colliding => colors.colliding,
        }
    }
}

/// Vertex layout for line-list debug buffers
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    /// World-space position
    pub position: [f32; 3],
    /// RGBA colour
    pub color: [f32; 4],
}

impl LineVertex {
    fn new(position: &Vec3, color: &Vec4) -> Self {
        Self {
            position: [position.x, position.y, position.z],
            color: [color.x, color.y, color.z, color.w],
        }
    }
}

/// Twelve world-space edges of an oriented box
#[derive(Debug, Clone, PartialEq)]
pub struct BoxWireframe {
    /// Edge segments as `(start, end)`
    pub segments: [(Vec3, Vec3); 12],
    /// Line colour
    pub color: Vec4,
}

impl BoxWireframe {
    /// Wireframe of a world-space box snapshot
    pub fn from_oriented_box(obb: &OrientedBox, color: Vec4) -> Self {
        let corners = obb.corners();
        Self {
            segments: BOX_EDGES.map(|(a, b)| (corners[a], corners[b])),
            color,
        }
    }

    /// Wireframe of a box at its node's current transform
    ///
    /// `None` when the node is gone or has no transform.
    pub fn from_box<P>(obb: &OrientedBoundingBox, provider: &mut P, color: Vec4) -> Option<Self>
    where
        P: SpatialProvider + ?Sized,
    {
        obb.to_oriented_box(provider)
            .map(|snapshot| Self::from_oriented_box(&snapshot, color))
    }

    /// Append this wireframe as a line list
    pub fn append_vertices(&self, out: &mut Vec<LineVertex>) {
        out.extend(self.segments.iter().flat_map(|(start, end)| {
            [LineVertex::new(start, &self.color), LineVertex::new(end, &self.color)]
        }));
    }
}

/// Three orthogonal great circles approximating a sphere, as a line list
pub fn sphere_outline(sphere: &BoundingSphere, color: &Vec4, segments: usize) -> Vec<LineVertex> {
    let segments = segments.max(3);
    let step = std::f32::consts::TAU / segments as f32;
    let planes = [(Vec3::x(), Vec3::y()), (Vec3::y(), Vec3::z()), (Vec3::z(), Vec3::x())];

    let mut vertices = Vec::with_capacity(planes.len() * segments * 2);
    for (u, v) in planes {
        let point = |k: usize| {
            let angle = step * k as f32;
            sphere.origin + (u * angle.cos() + v * angle.sin()) * sphere.radius
        };
        for k in 0..segments {
            vertices.push(LineVertex::new(&point(k), color));
            vertices.push(LineVertex::new(&point(k + 1), color));
        }
    }
    vertices
}
