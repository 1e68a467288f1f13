//! Separating-axis test between two oriented boxes
//!
//! Two boxes are disjoint iff their projections onto some axis do not overlap.
//! For box pairs fifteen candidates suffice: three face normals per box and
//! the nine cross products of one box's axes with the other's. Everything is
//! evaluated in the first box's frame.
//!
//! Boxes sampled from sheared world matrices (a rotated child under a
//! non-uniformly scaled parent) are parallelepipeds whose axes are not
//! orthogonal. Those pairs are tested on explicit face normals and edge cross
//! products instead of the rotation-matrix closed forms.

use crate::foundation::math::{Mat3, Vec3};

/// Bias added to every entry of the absolute rotation matrix.
///
/// When an axis of one box is (anti)parallel to an axis of the other, their
/// cross product is near zero and the edge tests degenerate to `0 > 0`
/// comparisons polluted by rounding. The bias keeps those tests from
/// reporting false separations. It is never applied to half-size sums.
pub const ABS_ROTATION_EPSILON: f32 = 1.0e-6;

/// Largest `|a_i . a_j|` for which a box's axes still count as orthogonal
pub const ORTHOGONALITY_TOLERANCE: f32 = 1.0e-5;

/// A box in world space: center, orthonormal axes, and extents along them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    /// World-space center
    pub center: Vec3,
    /// World-space unit axes, orthogonal unless the source transform shears
    pub axes: [Vec3; 3],
    /// Non-negative half extents along `axes`; zero flattens the box
    pub half_size: Vec3,
}

impl OrientedBox {
    /// Creates a box from its world-space center, axes and half extents
    pub fn new(center: Vec3, axes: [Vec3; 3], half_size: Vec3) -> Self {
        Self {
            center,
            axes,
            half_size,
        }
    }

    /// Box aligned with the world axes
    pub fn axis_aligned(center: Vec3, half_size: Vec3) -> Self {
        Self::new(center, [Vec3::x(), Vec3::y(), Vec3::z()], half_size)
    }

    /// The eight corners; bit `i` of the index selects the `+` side of axis `i`
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|k| {
            (0..3).fold(self.center, |corner, i| {
                let sign = if k & (1 << i) != 0 { 1.0 } else { -1.0 };
                corner + self.axes[i] * (sign * self.half_size[i])
            })
        })
    }

    /// Exact overlap test; touching boxes count as overlapping
    pub fn intersects(&self, other: &OrientedBox) -> bool {
        find_separating_axis(self, other).is_none()
    }

    /// Whether the axes are mutually orthogonal (no shear)
    pub fn is_orthogonal(&self) -> bool {
        (0..3).all(|i| self.axes[i].dot(&self.axes[(i + 1) % 3]).abs() <= ORTHOGONALITY_TOLERANCE)
    }

    /// Unit normal of the pair of faces that `axes[i]` passes through
    ///
    /// Equal to `axes[i]` for orthogonal boxes; the cross product of the
    /// other two axes otherwise.
    pub fn face_normal(&self, i: usize) -> Vec3 {
        if self.is_orthogonal() {
            return self.axes[i];
        }
        self.axes[(i + 1) % 3]
            .cross(&self.axes[(i + 2) % 3])
            .try_normalize(0.0)
            .unwrap_or(self.axes[i])
    }

    /// Half-length of the box's shadow on a unit `direction`
    fn projected_radius(&self, direction: &Vec3) -> f32 {
        (0..3)
            .map(|i| (self.axes[i] * self.half_size[i]).dot(direction).abs())
            .sum()
    }
}

/// Which of the fifteen candidate axes separated a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeparatingAxis {
    /// Face normal `i` of the first box (see [`OrientedBox::face_normal`])
    FaceA(usize),
    /// Face normal `j` of the second box
    FaceB(usize),
    /// Cross product of the first box's axis `a` with the second box's axis `b`
    Edge {
        /// Axis index on the first box
        a: usize,
        /// Axis index on the second box
        b: usize,
    },
}

impl SeparatingAxis {
    /// World-space direction of this axis for the pair it was found on
    ///
    /// Edge axes are returned unnormalised.
    pub fn direction(&self, first: &OrientedBox, second: &OrientedBox) -> Vec3 {
        match *self {
            Self::FaceA(i) => first.face_normal(i),
            Self::FaceB(j) => second.face_normal(j),
            Self::Edge { a, b } => first.axes[a].cross(&second.axes[b]),
        }
    }
}

/// Find an axis separating `a` and `b`, or `None` if they intersect
///
/// Returns the first separating axis in the order: faces of `a`, faces of
/// `b`, then edge pairs. The order affects only which axis is reported,
/// never whether one is found.
pub fn find_separating_axis(a: &OrientedBox, b: &OrientedBox) -> Option<SeparatingAxis> {
    if !(a.is_orthogonal() && b.is_orthogonal()) {
        return find_separating_axis_sheared(a, b);
    }

    let ea = &a.half_size;
    let eb = &b.half_size;

    // b's axes expressed in a's frame
    let r = Mat3::from_fn(|i, j| a.axes[i].dot(&b.axes[j]));
    let abs_r = r.map(|v| v.abs() + ABS_ROTATION_EPSILON);

    // Translation in a's frame
    let d = b.center - a.center;
    let t = Vec3::from_fn(|i, _| d.dot(&a.axes[i]));

    for i in 0..3 {
        let ra = ea[i];
        let rb = abs_r.row(i).transpose().dot(eb);
        if t[i].abs() > ra + rb {
            return Some(SeparatingAxis::FaceA(i));
        }
    }

    for j in 0..3 {
        let ra = abs_r.column(j).dot(ea);
        let rb = eb[j];
        if r.column(j).dot(&t).abs() > ra + rb {
            return Some(SeparatingAxis::FaceB(j));
        }
    }

    // L = a_i x b_j. With (i, i1, i2) and (j, j1, j2) cyclic, L . a_k and
    // L . b_k reduce to single entries of R, giving the usual closed forms.
    for i in 0..3 {
        let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
        for j in 0..3 {
            let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
            let ra = ea[i1] * abs_r[(i2, j)] + ea[i2] * abs_r[(i1, j)];
            let rb = eb[j1] * abs_r[(i, j2)] + eb[j2] * abs_r[(i, j1)];
            let dist = (t[i2] * r[(i1, j)] - t[i1] * r[(i2, j)]).abs();
            if dist > ra + rb {
                return Some(SeparatingAxis::Edge { a: i, b: j });
            }
        }
    }

    None
}

/// Same candidates and order as [`find_separating_axis`], projected explicitly
fn find_separating_axis_sheared(a: &OrientedBox, b: &OrientedBox) -> Option<SeparatingAxis> {
    let d = b.center - a.center;
    let separates = |axis: &Vec3| d.dot(axis).abs() > a.projected_radius(axis) + b.projected_radius(axis);

    if let Some(i) = (0..3).find(|&i| separates(&a.face_normal(i))) {
        return Some(SeparatingAxis::FaceA(i));
    }
    if let Some(j) = (0..3).find(|&j| separates(&b.face_normal(j))) {
        return Some(SeparatingAxis::FaceB(j));
    }

    for i in 0..3 {
        for j in 0..3 {
            // Near-parallel edges give no usable direction
            let Some(axis) = a.axes[i].cross(&b.axes[j]).try_normalize(1.0e-6) else {
                continue;
            };
            if separates(&axis) {
                return Some(SeparatingAxis::Edge { a: i, b: j });
            }
        }
    }

    None
}
