//! Scene graph: articulated objects over one shared mesh
//!
//! Objects live in a flat arena and reference their parent by index;
//! parent names from scene files are resolved to indices once at load.
//! World matrices compose Translate * Rotate * Scale, with every parent
//! in the chain applied without its scale so ancestor scale never
//! distorts child offsets.

use std::collections::HashMap;

use super::loader::SceneError;
use crate::rasterizer::{Mat4, Rgb, Vec3};
use serde::{Deserialize, Serialize};

/// Local pose of one object
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, composed Rz * Ry * Rx
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Local matrix: Translate * Rotate, with Scale appended on request
    pub fn local_matrix(&self, include_scale: bool) -> Mat4 {
        let tr = Mat4::translation(self.position) * Mat4::rotation_zyx(self.rotation);
        if include_scale {
            tr * Mat4::scaling(self.scale)
        } else {
            tr
        }
    }
}

/// One articulated object instance
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub transform: Transform,
    /// Parent object index (None = root)
    pub parent: Option<usize>,
}

/// A triangle of the shared mesh, with its face color
#[derive(Debug, Clone, Copy)]
pub struct Face {
    pub indices: [usize; 3],
    pub color: Rgb,
}

/// Template geometry shared by every object in the scene
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<Face>,
}

/// Logical view window, centered on the origin
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewBounds {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl ViewBounds {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }
}

/// A complete scene snapshot: camera metadata, objects, shared mesh
#[derive(Debug, Clone)]
pub struct Scene {
    pub view: ViewBounds,
    pub focal: f32,
    pub objects: Vec<SceneObject>,
    pub mesh: Mesh,
    name_index: HashMap<String, usize>,
}

impl Scene {
    pub fn new(view: ViewBounds, focal: f32, mesh: Mesh) -> Self {
        Self {
            view,
            focal,
            objects: Vec::new(),
            mesh,
            name_index: HashMap::new(),
        }
    }

    /// Add an object and return its index
    pub fn add_object(&mut self, object: SceneObject) -> usize {
        let idx = self.objects.len();
        self.name_index.insert(object.name.clone(), idx);
        self.objects.push(object);
        idx
    }

    /// Look up an object index by name (index built once, no per-frame scan)
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    /// Cumulative model-to-world matrix for the object at `index`.
    ///
    /// The object's own scale is included only when asked for; parents
    /// along the chain never contribute theirs. The walk is iterative and
    /// bounded: a chain longer than the arena means the parent links loop.
    pub fn model_to_world(&self, index: usize, include_scale: bool) -> Result<Mat4, SceneError> {
        let object = self
            .objects
            .get(index)
            .ok_or_else(|| SceneError::MissingParent(format!("#{}", index)))?;

        let mut world = object.transform.local_matrix(include_scale);
        let mut cursor = object.parent;
        let mut hops = 0;

        while let Some(pi) = cursor {
            let parent = self
                .objects
                .get(pi)
                .ok_or_else(|| SceneError::MissingParent(format!("#{}", pi)))?;

            world = parent.transform.local_matrix(false) * world;

            hops += 1;
            if hops > self.objects.len() {
                return Err(SceneError::CyclicParents(object.name.clone()));
            }
            cursor = parent.parent;
        }

        Ok(world)
    }

    /// Walk every parent chain once so cyclic or dangling scene data
    /// fails at load time instead of surfacing mid-frame
    pub fn validate(&self) -> Result<(), SceneError> {
        for index in 0..self.objects.len() {
            self.model_to_world(index, false)?;
        }
        Ok(())
    }
}
