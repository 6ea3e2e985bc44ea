//! Camera matrices: perspective projection and viewport mapping
//!
//! Both are derived from scene metadata once at load time and stay
//! constant for the whole session; nothing here runs per frame.

use crate::rasterizer::Mat4;

/// Map the logical view window (origin-centered) to pixel coordinates.
/// The vertical axis flips so increasing view-space y moves toward image
/// row 0 at the top.
pub fn viewport_matrix(screen_w: usize, screen_h: usize, view_w: f32, view_h: f32) -> Mat4 {
    let mut m = Mat4::IDENTITY;
    m.m[0][0] = screen_w as f32 / view_w;
    m.m[0][3] = screen_w as f32 / 2.0;
    m.m[1][1] = -(screen_h as f32) / view_h;
    m.m[1][3] = screen_h as f32 / 2.0;
    m
}

/// Pinhole projection for a camera on the principal axis. The only
/// non-identity entries are m[3][2] = -1/focal and m[3][3] = 0, so the
/// homogeneous w picks up depth and the later divide does the rest.
pub fn perspective_matrix(focal: f32) -> Mat4 {
    let mut m = Mat4::IDENTITY;
    m.m[3][2] = -1.0 / focal;
    m.m[3][3] = 0.0;
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{Vec3, Vec4};

    #[test]
    fn test_view_origin_maps_to_image_center() {
        let vp = viewport_matrix(1280, 720, 1280.0, 720.0);
        let p = vp * Vec4::from_point(Vec3::ZERO);
        assert_eq!((p.x, p.y), (640.0, 360.0));
    }

    #[test]
    fn test_view_edge_maps_to_screen_edge() {
        let vp = viewport_matrix(1280, 720, 2.0, 2.0);
        let p = vp * Vec4::from_point(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!((p.x, p.y), (1280.0, 360.0));
    }

    #[test]
    fn test_viewport_flips_vertically() {
        let vp = viewport_matrix(100, 100, 2.0, 2.0);
        let up = vp * Vec4::from_point(Vec3::new(0.0, 1.0, 0.0));
        // +y in view space lands above the center row
        assert!(up.y < 50.0);
    }

    #[test]
    fn test_projection_encodes_depth_in_w() {
        let proj = perspective_matrix(4.0);
        let p = proj * Vec4::from_point(Vec3::new(1.0, 2.0, -4.0));
        assert_eq!(p.w, 1.0);
        // x, y, z pass through untouched before the divide
        assert_eq!((p.x, p.y, p.z), (1.0, 2.0, -4.0));
    }

    #[test]
    fn test_projection_ignores_incoming_w() {
        let proj = perspective_matrix(2.0);
        let p = proj * Vec4::new(0.0, 0.0, -6.0, 1.0);
        assert_eq!(p.w, 3.0);
    }
}
