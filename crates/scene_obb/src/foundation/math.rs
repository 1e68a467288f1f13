//! Math utilities and types
//!
//! Thin aliases over `nalgebra` plus the TRS [`Transform`] used for scene nodes.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Local transform of a scene node: translation, rotation and non-uniform scale
///
/// Composed as `T * R * S`, so scale is applied first in the node's own frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Translation relative to the parent node
    pub position: Vec3,

    /// Rotation relative to the parent node
    pub rotation: Quat,

    /// Per-axis scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Create a transform from all three components
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Builder: rotate about `axis` by `angle` radians
    pub fn with_rotation_axis_angle(mut self, axis: Vec3, angle: f32) -> Self {
        self.rotation = Quat::from_axis_angle(&Unit::new_normalize(axis), angle);
        self
    }

    /// Builder: replace the scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: &Point3) -> Point3 {
        self.to_matrix().transform_point(point)
    }

    /// The rotated unit axes of this transform (scale is not applied)
    pub fn axes(&self) -> [Vec3; 3] {
        [
            self.rotation * Vec3::x(),
            self.rotation * Vec3::y(),
            self.rotation * Vec3::z(),
        ]
    }
}

/// Unit axes encoded in the linear part of an affine matrix
///
/// Column `i` of the upper 3x3 block is normalised; a collapsed column
/// (zero scale on that axis) falls back to the matching basis vector.
pub fn matrix_axes(matrix: &Mat4) -> [Vec3; 3] {
    let basis = [Vec3::x(), Vec3::y(), Vec3::z()];
    let linear = matrix.fixed_view::<3, 3>(0, 0);
    std::array::from_fn(|i| {
        linear
            .column(i)
            .into_owned()
            .try_normalize(0.0)
            .unwrap_or(basis[i])
    })
}

/// Per-axis scale encoded in the linear part of an affine matrix (column lengths)
pub fn matrix_scale(matrix: &Mat4) -> Vec3 {
    let linear = matrix.fixed_view::<3, 3>(0, 0);
    Vec3::new(
        linear.column(0).norm(),
        linear.column(1).norm(),
        linear.column(2).norm(),
    )
}

/// Component-wise minimum of two vectors
pub fn component_min(a: &Vec3, b: &Vec3) -> Vec3 {
    a.inf(b)
}

/// Component-wise maximum of two vectors
pub fn component_max(a: &Vec3, b: &Vec3) -> Vec3 {
    a.sup(b)
}
