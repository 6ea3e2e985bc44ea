//! Per-frame transform pass
//!
//! Owns the live scene plus the two camera matrices and walks every
//! object, face, and vertex from model space down to screen space,
//! handing finished triangles to the rasterizer. Strictly sequential:
//! deltas are folded in, then every face is drawn in scene order.

use std::collections::HashSet;

use super::camera::{perspective_matrix, viewport_matrix};
use crate::rasterizer::{
    draw_midpoint_line, fill_triangle, DrawMode, Framebuffer, Mat4, Vec3, Vec4, Vertex,
};
use crate::scene::{Scene, SceneError};

/// Pose increment for one named object, produced by the input driver.
/// The pipeline never reads input devices; it only consumes these.
#[derive(Debug, Clone, Default)]
pub struct PoseDelta {
    pub target: String,
    pub rotate: Vec3,
    pub translate: Vec3,
}

impl PoseDelta {
    pub fn rotate(target: &str, rotate: Vec3) -> Self {
        Self {
            target: target.to_string(),
            rotate,
            translate: Vec3::ZERO,
        }
    }

    pub fn translate(target: &str, translate: Vec3) -> Self {
        Self {
            target: target.to_string(),
            rotate: Vec3::ZERO,
            translate,
        }
    }
}

/// Live rendering state: the scene plus camera matrices built at init.
/// No globals; the driver owns one of these and passes it around.
pub struct RenderState {
    pub scene: Scene,
    projection: Mat4,
    viewport: Mat4,
    /// Objects already reported as unresolvable, so a broken chain
    /// logs once instead of every frame
    warned: HashSet<usize>,
}

impl RenderState {
    /// Validate the scene and precompute the camera matrices
    pub fn new(scene: Scene, screen_w: usize, screen_h: usize) -> Result<Self, SceneError> {
        scene.validate()?;
        let projection = perspective_matrix(scene.focal);
        let viewport = viewport_matrix(screen_w, screen_h, scene.view.width(), scene.view.height());
        Ok(Self {
            scene,
            projection,
            viewport,
            warned: HashSet::new(),
        })
    }

    /// Fold this frame's pose increments in, then rasterize everything
    /// into `fb`. The driver clears the framebuffer beforehand.
    pub fn update_and_render(&mut self, deltas: &[PoseDelta], mode: DrawMode, fb: &mut Framebuffer) {
        self.apply_deltas(deltas);
        self.render(mode, fb);
    }

    /// Apply pose increments to the live transforms.
    /// Deltas naming an unknown object are ignored.
    pub fn apply_deltas(&mut self, deltas: &[PoseDelta]) {
        for delta in deltas {
            if let Some(index) = self.scene.index_of(&delta.target) {
                let t = &mut self.scene.objects[index].transform;
                t.position = t.position + delta.translate;
                t.rotation = t.rotation + delta.rotate;
            }
        }
    }

    /// Transform pass and rasterization, object order then face order.
    /// Later triangles overwrite earlier pixels; there is no depth test.
    pub fn render(&mut self, mode: DrawMode, fb: &mut Framebuffer) {
        for index in 0..self.scene.objects.len() {
            // One matrix per object, shared by all of its faces
            let m2w = match self.scene.model_to_world(index, true) {
                Ok(m) => m,
                Err(e) => {
                    if self.warned.insert(index) {
                        eprintln!("skipping '{}': {}", self.scene.objects[index].name, e);
                    }
                    continue;
                }
            };

            'faces: for face in &self.scene.mesh.faces {
                let mut vtx = [Vertex::default(); 3];
                for (slot, &vi) in face.indices.iter().enumerate() {
                    match project_vertex(self.projection, self.viewport, m2w, self.scene.mesh.vertices[vi]) {
                        Some(position) => vtx[slot] = Vertex::new(position, face.color),
                        // w = 0: perspective division is undefined, drop the triangle
                        None => continue 'faces,
                    }
                }

                match mode {
                    DrawMode::Solid => fill_triangle(fb, &vtx[0], &vtx[1], &vtx[2]),
                    DrawMode::Wireframe => {
                        draw_midpoint_line(fb, &vtx[0], &vtx[1]);
                        draw_midpoint_line(fb, &vtx[1], &vtx[2]);
                        draw_midpoint_line(fb, &vtx[2], &vtx[0]);
                    }
                }
            }
        }
    }
}

/// One vertex through the whole pipeline: model -> world -> clip ->
/// perspective divide -> screen. Returns None when clip w is zero.
fn project_vertex(projection: Mat4, viewport: Mat4, m2w: Mat4, local: Vec3) -> Option<Vec4> {
    let clip = projection * (m2w * Vec4::from_point(local));
    if clip.w == 0.0 {
        return None;
    }
    // w divides itself as well and lands on exactly 1
    let ndc = Vec4::new(
        clip.x / clip.w,
        clip.y / clip.w,
        clip.z / clip.w,
        clip.w / clip.w,
    );
    Some(viewport * ndc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Rgb;
    use crate::scene::{Face, Mesh, SceneObject, Transform, ViewBounds};

    fn triangle_mesh() -> Mesh {
        Mesh {
            vertices: vec![
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
                Vec3::new(0.0, 0.5, 0.0),
            ],
            faces: vec![Face {
                indices: [0, 1, 2],
                color: Rgb::new(1.0, 1.0, 1.0),
            }],
        }
    }

    fn triangle_scene(z: f32) -> Scene {
        let view = ViewBounds { top: 1.0, bottom: -1.0, left: -1.0, right: 1.0 };
        let mut scene = Scene::new(view, 1.0, triangle_mesh());
        scene.add_object(SceneObject {
            name: "tri".to_string(),
            transform: Transform {
                position: Vec3::new(0.0, 0.0, z),
                ..Default::default()
            },
            parent: None,
        });
        scene
    }

    fn written_count(fb: &Framebuffer) -> usize {
        fb.pixels.chunks_exact(4).filter(|p| p[0] > 0).count()
    }

    #[test]
    fn test_divide_leaves_w_exactly_one() {
        let state = RenderState::new(triangle_scene(-3.0), 64, 64).unwrap();
        let m2w = state.scene.model_to_world(0, true).unwrap();
        for &v in &state.scene.mesh.vertices {
            let screen = project_vertex(state.projection, state.viewport, m2w, v).unwrap();
            assert_eq!(screen.w, 1.0);
        }
    }

    #[test]
    fn test_zero_w_triangle_is_skipped() {
        // Object at z = 0 projects to w = 0
        let mut state = RenderState::new(triangle_scene(0.0), 64, 64).unwrap();
        let mut fb = Framebuffer::new(64, 64);
        state.render(DrawMode::Solid, &mut fb);
        assert_eq!(written_count(&fb), 0);
    }

    #[test]
    fn test_apply_deltas_accumulates() {
        let mut state = RenderState::new(triangle_scene(-1.0), 64, 64).unwrap();
        let deltas = [
            PoseDelta::rotate("tri", Vec3::new(0.0, 0.05, 0.0)),
            PoseDelta::translate("tri", Vec3::new(1.0, 0.0, 0.0)),
            PoseDelta::rotate("ghost", Vec3::new(9.0, 9.0, 9.0)),
        ];
        state.apply_deltas(&deltas);
        state.apply_deltas(&deltas);

        let t = state.scene.objects[0].transform;
        assert!((t.rotation.y - 0.1).abs() < 1e-6);
        assert!((t.position.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_modes_produce_distinct_pixel_sets() {
        let mut solid_fb = Framebuffer::new(64, 64);
        let mut wire_fb = Framebuffer::new(64, 64);

        RenderState::new(triangle_scene(-1.0), 64, 64)
            .unwrap()
            .render(DrawMode::Solid, &mut solid_fb);
        RenderState::new(triangle_scene(-1.0), 64, 64)
            .unwrap()
            .render(DrawMode::Wireframe, &mut wire_fb);

        let solid = written_count(&solid_fb);
        let wire = written_count(&wire_fb);
        assert!(solid > 0 && wire > 0);
        assert!(wire < solid, "outline ({}) should be smaller than fill ({})", wire, solid);
        assert_ne!(solid_fb.pixels, wire_fb.pixels);
    }

    #[test]
    fn test_broken_parent_skips_object_not_frame() {
        let mut scene = triangle_scene(-1.0);
        scene.add_object(SceneObject {
            name: "intact".to_string(),
            transform: Transform {
                position: Vec3::new(0.0, 0.0, -1.0),
                ..Default::default()
            },
            parent: None,
        });
        let mut state = RenderState::new(scene, 64, 64).unwrap();

        // Corrupt the first object's parent link after validation
        state.scene.objects[0].parent = Some(99);

        let mut fb = Framebuffer::new(64, 64);
        state.render(DrawMode::Solid, &mut fb);
        // The intact object still renders
        assert!(written_count(&fb) > 0);
    }
}
