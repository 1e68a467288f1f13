//! Bounding volumes and overlap tests
//!
//! Two-tier testing: a cheap, conservative sphere test (broad phase) and an
//! exact separating-axis test between oriented boxes (narrow phase).
//!
//! # Module Organization
//!
//! - [`obb`] - [`OrientedBoundingBox`], a local-space box following a scene node
//! - [`sphere`] - [`BoundingSphere`] and the strict sphere overlap test
//! - [`sat`] - [`OrientedBox`] world snapshots and the 15-axis test

pub mod obb;
pub mod sat;
pub mod sphere;

pub use obb::{BoundsError, OrientedBoundingBox, INTERLEAVED_LEN};
pub use sat::{find_separating_axis, OrientedBox, SeparatingAxis, ABS_ROTATION_EPSILON, ORTHOGONALITY_TOLERANCE};
pub use sphere::BoundingSphere;
