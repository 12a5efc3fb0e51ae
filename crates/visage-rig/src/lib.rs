//! VISAGE Rig - Blend channel registry
//!
//! The asset loader hands over a scene graph once. The registry indexes it
//! in a single pass into a flat list of channel-bearing meshes plus an
//! optional head bone, and every system writes weights through it from then
//! on. Nobody walks the scene graph per frame.

pub mod registry;
pub mod scene;

pub use registry::*;
pub use scene::*;
