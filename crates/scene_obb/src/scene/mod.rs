//! Reference scene store
//!
//! A minimal node hierarchy that implements [`crate::spatial::SpatialProvider`]:
//! local TRS transforms per node, parent/child links, and world matrices cached
//! behind a dirty flag. Applications with their own scene graph implement the
//! provider trait on it instead.

mod graph;
mod node;

pub use graph::{SceneError, SceneGraph};
pub use node::SceneNode;
