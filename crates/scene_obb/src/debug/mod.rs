//! Debug visualization data for bounding volumes

pub mod wireframe;

pub use wireframe::{sphere_outline, BoxWireframe, ContactState, DebugColors, LineVertex};
