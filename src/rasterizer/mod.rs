//! Software rasterizer
//!
//! Explicit matrix math plus scan conversion, no graphics API:
//! - 4x4 homogeneous matrices and points
//! - Solid triangles via edge functions with a top-left fill rule
//! - Wireframe via integer midpoint lines
//! - No z-buffer: draw order decides what shows

mod math;
mod render;
mod types;

pub use math::*;
pub use render::*;
pub use types::*;

/// Output resolution
pub const WIDTH: usize = 1280;
pub const HEIGHT: usize = 720;
