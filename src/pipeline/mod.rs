//! Transform-and-projection pipeline
//!
//! Camera matrices built once per scene, then a per-frame pass that
//! drives every vertex from model space to screen space.

mod camera;
mod frame;

pub use camera::*;
pub use frame::*;
