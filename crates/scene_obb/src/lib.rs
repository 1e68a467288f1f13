//! # Scene OBB
//!
//! Oriented bounding boxes that follow nodes of a live scene graph, and the
//! overlap tests between them.
//!
//! ## Features
//!
//! - **Node-bound boxes**: bounds are stored in a node's local space and
//!   re-derived from its world transform on every query
//! - **Broad phase**: conservative bounding-sphere test with strict overlap
//! - **Narrow phase**: exact 15-axis separating-axis test
//! - **Box algebra**: containment, union, translation, world snapshots
//! - **Reference scene store**: slot-map hierarchy with lazily refreshed
//!   world transforms
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_obb::prelude::*;
//!
//! let mut scene = SceneGraph::new();
//! let a = scene.add_node("a", Transform::identity());
//! let b = scene.add_node("b", Transform::from_position(Vec3::new(1.0, 0.0, 0.0)));
//!
//! let box_a = OrientedBoundingBox::from_interleaved([-1.0, 1.0, -1.0, 1.0, -1.0, 1.0], a);
//! let box_b = OrientedBoundingBox::from_interleaved([-1.0, 1.0, -1.0, 1.0, -1.0, 1.0], b);
//!
//! assert!(box_a.intersects(&box_b, &mut scene, true));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod bounds;
pub mod config;
pub mod debug;
pub mod foundation;
pub mod query;
pub mod scene;
pub mod spatial;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        bounds::{BoundingSphere, BoundsError, OrientedBoundingBox, OrientedBox, SeparatingAxis},
        config::{CollisionConfig, Config, ConfigError},
        foundation::math::{Point3, Quat, Transform, Vec3},
        query::{CollisionPair, CollisionQuery},
        scene::{SceneError, SceneGraph},
        spatial::{NodeHandle, SpatialProvider, StalePolicy},
    };
}
