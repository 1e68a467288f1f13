//! Spatial provider contract
//!
//! Bounding volumes never own the nodes they are attached to. They hold a
//! [`NodeHandle`] and read the node's live world transform through a
//! [`SpatialProvider`] every time they are queried.

mod provider;

pub use provider::{sample_world, SpatialProvider, StalePolicy, WorldSample};

slotmap::new_key_type! {
    /// Generational handle to a node in a scene store
    ///
    /// A handle outlives its node safely: once the node is removed every lookup
    /// through the handle misses instead of aliasing a reused slot.
    pub struct NodeHandle;
}
