//! Scan conversion into a software framebuffer
//!
//! Two primitives cover both draw modes: solid triangle fill through
//! edge functions with a top-left tie rule, and wireframe edges through
//! an integer midpoint line. No z-buffer: later writes win.

use super::types::{Rgb, Vertex};

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u8>, // RGBA, 4 bytes per pixel
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Rgb) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
    }

    /// Write one pixel; coordinates outside the framebuffer are discarded
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
    }
}

/// Draw a line between two screen-space vertices with the midpoint
/// (Bresenham) algorithm. The segment carries a single constant color.
pub fn draw_midpoint_line(fb: &mut Framebuffer, a: &Vertex, b: &Vertex) {
    let mut x = a.position.x.round() as i32;
    let mut y = a.position.y.round() as i32;
    let x1 = b.position.x.round() as i32;
    let y1 = b.position.y.round() as i32;
    let color = a.color;

    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        fb.set_pixel(x, y, color);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Signed parallelogram area of edge a->b versus point p.
/// Positive when p lies on the interior side for a positively-wound triangle.
fn edge(ax: f32, ay: f32, bx: f32, by: f32, px: f32, py: f32) -> f32 {
    (bx - ax) * (py - ay) - (by - ay) * (px - ax)
}

/// Top-left classification for edge a->b in screen coordinates (y down):
/// horizontal edges running right, and edges running up, own their ties.
fn is_top_left(ax: f32, ay: f32, bx: f32, by: f32) -> bool {
    (ay == by && bx > ax) || by < ay
}

/// Fill a triangle with barycentric-interpolated vertex colors.
///
/// A pixel is covered when its sample point lies strictly inside, or on a
/// top/left edge; two triangles sharing an edge therefore never draw the
/// same pixel twice and never leave a gap. Zero-area triangles draw nothing.
pub fn fill_triangle(fb: &mut Framebuffer, v0: &Vertex, v1: &Vertex, v2: &Vertex) {
    let mut pos = [
        (v0.position.x, v0.position.y),
        (v1.position.x, v1.position.y),
        (v2.position.x, v2.position.y),
    ];
    let mut col = [v0.color, v1.color, v2.color];

    let mut area = edge(pos[0].0, pos[0].1, pos[1].0, pos[1].1, pos[2].0, pos[2].1);
    if area == 0.0 {
        return;
    }
    // Orient to positive winding so the edge tests read the same either way
    if area < 0.0 {
        pos.swap(1, 2);
        col.swap(1, 2);
        area = -area;
    }

    let min_x = pos[0].0.min(pos[1].0).min(pos[2].0).floor().max(0.0) as i32;
    let max_x = pos[0].0.max(pos[1].0).max(pos[2].0).ceil().min(fb.width as f32 - 1.0) as i32;
    let min_y = pos[0].1.min(pos[1].1).min(pos[2].1).floor().max(0.0) as i32;
    let max_y = pos[0].1.max(pos[1].1).max(pos[2].1).ceil().min(fb.height as f32 - 1.0) as i32;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let (px, py) = (x as f32, y as f32);
            let w0 = edge(pos[1].0, pos[1].1, pos[2].0, pos[2].1, px, py);
            let w1 = edge(pos[2].0, pos[2].1, pos[0].0, pos[0].1, px, py);
            let w2 = edge(pos[0].0, pos[0].1, pos[1].0, pos[1].1, px, py);

            let covers = |w: f32, a: (f32, f32), b: (f32, f32)| {
                w > 0.0 || (w == 0.0 && is_top_left(a.0, a.1, b.0, b.1))
            };
            if !covers(w0, pos[1], pos[2])
                || !covers(w1, pos[2], pos[0])
                || !covers(w2, pos[0], pos[1])
            {
                continue;
            }

            // Barycentric weights; each is the sub-area opposite that vertex
            let (u, v, w) = (w0 / area, w1 / area, w2 / area);
            let color = Rgb::new(
                u * col[0].r + v * col[1].r + w * col[2].r,
                u * col[0].g + v * col[1].g + w * col[2].g,
                u * col[0].b + v * col[1].b + w * col[2].b,
            );
            fb.set_pixel(x, y, color);
        }
    }
}
