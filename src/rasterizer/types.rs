//! Core types for the rasterizer

use super::math::Vec4;

/// RGB color with channels normalized to [0.0, 1.0]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Normalize 8-bit channels; done once when scene data is loaded
    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Convert to RGBA bytes for the framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            255,
        ]
    }
}

/// A screen-space vertex handed to the rasterizer
#[derive(Debug, Clone, Copy, Default)]
pub struct Vertex {
    pub position: Vec4,
    pub color: Rgb,
}

impl Vertex {
    pub fn new(position: Vec4, color: Rgb) -> Self {
        Self { position, color }
    }
}

/// Rasterization mode, fixed for a whole frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Solid,
    Wireframe,
}
