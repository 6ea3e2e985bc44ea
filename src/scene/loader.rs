//! Scene loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable scene files.
//! On-disk documents reference parents by name and store 8-bit colors;
//! loading resolves names to arena indices, normalizes colors to [0,1]
//! (exactly once), and validates that parent links form a forest.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::graph::{Face, Mesh, Scene, SceneObject, Transform, ViewBounds};
use crate::rasterizer::{Rgb, Vec3};
use serde::{Deserialize, Serialize};

/// Error type for scene loading and resolution
#[derive(Debug)]
pub enum SceneError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Serialize(ron::Error),
    /// An object references a parent that does not exist
    MissingParent(String),
    /// Parent links loop back on themselves
    CyclicParents(String),
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneError::Parse(e)
    }
}

impl From<ron::Error> for SceneError {
    fn from(e: ron::Error) -> Self {
        SceneError::Serialize(e)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::Io(e) => write!(f, "IO error: {}", e),
            SceneError::Parse(e) => write!(f, "Parse error: {}", e),
            SceneError::Serialize(e) => write!(f, "Serialize error: {}", e),
            SceneError::MissingParent(name) => write!(f, "unknown parent object '{}'", name),
            SceneError::CyclicParents(name) => write!(f, "parent chain through '{}' loops", name),
        }
    }
}

/// On-disk scene document (parents by name, colors as 8-bit channels)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SceneDoc {
    view: ViewBounds,
    focal: f32,
    objects: Vec<ObjectDoc>,
    mesh: MeshDoc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ObjectDoc {
    name: String,
    #[serde(default)]
    parent: Option<String>,
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MeshDoc {
    vertices: Vec<Vec3>,
    faces: Vec<FaceDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FaceDoc {
    indices: [usize; 3],
    color: (u8, u8, u8),
}

fn from_doc(doc: SceneDoc) -> Result<Scene, SceneError> {
    // Name map first, so parents can be declared in any order
    let names: HashMap<&str, usize> = doc
        .objects
        .iter()
        .enumerate()
        .map(|(i, o)| (o.name.as_str(), i))
        .collect();

    let mesh = Mesh {
        vertices: doc.mesh.vertices.clone(),
        faces: doc
            .mesh
            .faces
            .iter()
            .map(|f| Face {
                indices: f.indices,
                color: Rgb::from_bytes(f.color.0, f.color.1, f.color.2),
            })
            .collect(),
    };

    let mut scene = Scene::new(doc.view, doc.focal, mesh);
    for obj in &doc.objects {
        let parent = match &obj.parent {
            Some(name) => Some(
                names
                    .get(name.as_str())
                    .copied()
                    .ok_or_else(|| SceneError::MissingParent(name.clone()))?,
            ),
            None => None,
        };
        scene.add_object(SceneObject {
            name: obj.name.clone(),
            transform: Transform {
                position: obj.position,
                rotation: obj.rotation,
                scale: obj.scale,
            },
            parent,
        });
    }

    scene.validate()?;
    Ok(scene)
}

fn to_doc(scene: &Scene) -> SceneDoc {
    SceneDoc {
        view: scene.view,
        focal: scene.focal,
        objects: scene
            .objects
            .iter()
            .map(|o| ObjectDoc {
                name: o.name.clone(),
                parent: o.parent.map(|pi| scene.objects[pi].name.clone()),
                position: o.transform.position,
                rotation: o.transform.rotation,
                scale: o.transform.scale,
            })
            .collect(),
        mesh: MeshDoc {
            vertices: scene.mesh.vertices.clone(),
            faces: scene
                .mesh
                .faces
                .iter()
                .map(|f| {
                    let bytes = f.color.to_bytes();
                    FaceDoc {
                        indices: f.indices,
                        color: (bytes[0], bytes[1], bytes[2]),
                    }
                })
                .collect(),
        },
    }
}

/// Load a scene from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneError> {
    let contents = fs::read_to_string(path)?;
    load_scene_from_str(&contents)
}

/// Load a scene from a RON string (for embedded scenes or testing)
pub fn load_scene_from_str(s: &str) -> Result<Scene, SceneError> {
    let doc: SceneDoc = ron::from_str(s)?;
    from_doc(doc)
}

/// Save a scene to a RON file
pub fn save_scene<P: AsRef<Path>>(scene: &Scene, path: P) -> Result<(), SceneError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(&to_doc(scene), config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// The shared template geometry: a unit cube, two triangles per side,
/// one color per side
fn unit_cube() -> Mesh {
    let vertices = vec![
        Vec3::new(-0.5, -0.5, 0.5),
        Vec3::new(0.5, -0.5, 0.5),
        Vec3::new(0.5, 0.5, 0.5),
        Vec3::new(-0.5, 0.5, 0.5),
        Vec3::new(-0.5, -0.5, -0.5),
        Vec3::new(0.5, -0.5, -0.5),
        Vec3::new(0.5, 0.5, -0.5),
        Vec3::new(-0.5, 0.5, -0.5),
    ];

    let sides: [([usize; 3], [usize; 3], (u8, u8, u8)); 6] = [
        ([0, 1, 2], [0, 2, 3], (230, 60, 50)),    // front
        ([5, 4, 7], [5, 7, 6], (60, 180, 80)),    // back
        ([3, 2, 6], [3, 6, 7], (70, 110, 220)),   // top
        ([4, 5, 1], [4, 1, 0], (230, 200, 60)),   // bottom
        ([1, 5, 6], [1, 6, 2], (60, 200, 210)),   // right
        ([4, 0, 3], [4, 3, 7], (200, 70, 200)),   // left
    ];

    let mut faces = Vec::with_capacity(12);
    for (a, b, (r, g, bl)) in sides {
        let color = Rgb::from_bytes(r, g, bl);
        faces.push(Face { indices: a, color });
        faces.push(Face { indices: b, color });
    }

    Mesh { vertices, faces }
}

/// Built-in articulated tank: body, turret, gun joint, gun, four wheels,
/// all sharing the unit cube and differing only by transform
pub fn tank_scene() -> Scene {
    let view = ViewBounds { top: 360.0, bottom: -360.0, left: -640.0, right: 640.0 };
    let mut scene = Scene::new(view, 250.0, unit_cube());

    let part = |position, rotation, scale| Transform { position, rotation, scale };

    let body = scene.add_object(SceneObject {
        name: "body".to_string(),
        transform: part(
            Vec3::new(0.0, -40.0, -400.0),
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::new(240.0, 80.0, 320.0),
        ),
        parent: None,
    });
    let turret = scene.add_object(SceneObject {
        name: "turret".to_string(),
        transform: part(
            Vec3::new(0.0, 65.0, -20.0),
            Vec3::ZERO,
            Vec3::new(120.0, 50.0, 140.0),
        ),
        parent: Some(body),
    });
    let joint = scene.add_object(SceneObject {
        name: "joint".to_string(),
        transform: part(Vec3::new(0.0, 20.0, 75.0), Vec3::ZERO, Vec3::new(16.0, 16.0, 16.0)),
        parent: Some(turret),
    });
    scene.add_object(SceneObject {
        name: "gun".to_string(),
        transform: part(Vec3::new(0.0, 0.0, 55.0), Vec3::ZERO, Vec3::new(18.0, 18.0, 110.0)),
        parent: Some(joint),
    });

    let wheel_slots = [
        ("wheel1", 105.0, 90.0),
        ("wheel2", -105.0, 90.0),
        ("wheel3", 105.0, -90.0),
        ("wheel4", -105.0, -90.0),
    ];
    for (name, x, z) in wheel_slots {
        scene.add_object(SceneObject {
            name: name.to_string(),
            transform: part(Vec3::new(x, -40.0, z), Vec3::ZERO, Vec3::new(45.0, 45.0, 45.0)),
            parent: Some(body),
        });
    }

    scene
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_SCENE: &str = r#"(
        view: (top: 1.0, bottom: -1.0, left: -1.0, right: 1.0),
        focal: 1.0,
        objects: [
            (name: "child", parent: Some("root"),
             position: (x: 0.0, y: 1.0, z: 0.0),
             rotation: (x: 0.0, y: 0.0, z: 0.0),
             scale: (x: 1.0, y: 1.0, z: 1.0)),
            (name: "root",
             position: (x: 0.0, y: 0.0, z: -5.0),
             rotation: (x: 0.0, y: 0.0, z: 0.0),
             scale: (x: 2.0, y: 2.0, z: 2.0)),
        ],
        mesh: (
            vertices: [
                (x: 0.0, y: 0.0, z: 0.0),
                (x: 1.0, y: 0.0, z: 0.0),
                (x: 0.0, y: 1.0, z: 0.0),
            ],
            faces: [
                (indices: (0, 1, 2), color: (255, 128, 0)),
            ],
        ),
    )"#;

    #[test]
    fn test_load_links_parents_declared_in_any_order() {
        let scene = load_scene_from_str(SMALL_SCENE).unwrap();
        let child = scene.index_of("child").unwrap();
        let root = scene.index_of("root").unwrap();
        assert_eq!(scene.objects[child].parent, Some(root));
        assert_eq!(scene.objects[root].parent, None);
    }

    #[test]
    fn test_load_normalizes_colors_once() {
        let scene = load_scene_from_str(SMALL_SCENE).unwrap();
        let color = scene.mesh.faces[0].color;
        assert!((color.r - 1.0).abs() < 1e-6);
        assert!((color.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(color.b, 0.0);
    }

    #[test]
    fn test_unknown_parent_is_a_load_error() {
        let doc = SMALL_SCENE.replace("Some(\"root\")", "Some(\"phantom\")");
        assert!(matches!(
            load_scene_from_str(&doc),
            Err(SceneError::MissingParent(name)) if name == "phantom"
        ));
    }

    #[test]
    fn test_cyclic_scene_fails_at_load() {
        let doc = r#"(
            view: (top: 1.0, bottom: -1.0, left: -1.0, right: 1.0),
            focal: 1.0,
            objects: [
                (name: "a", parent: Some("b"),
                 position: (x: 0.0, y: 0.0, z: 0.0),
                 rotation: (x: 0.0, y: 0.0, z: 0.0),
                 scale: (x: 1.0, y: 1.0, z: 1.0)),
                (name: "b", parent: Some("a"),
                 position: (x: 0.0, y: 0.0, z: 0.0),
                 rotation: (x: 0.0, y: 0.0, z: 0.0),
                 scale: (x: 1.0, y: 1.0, z: 1.0)),
            ],
            mesh: (vertices: [], faces: []),
        )"#;
        assert!(matches!(
            load_scene_from_str(doc),
            Err(SceneError::CyclicParents(_))
        ));
    }

    #[test]
    fn test_doc_round_trip_preserves_structure() {
        let scene = tank_scene();
        let text = ron::ser::to_string(&to_doc(&scene)).unwrap();
        let reloaded = load_scene_from_str(&text).unwrap();

        assert_eq!(reloaded.objects.len(), scene.objects.len());
        for (a, b) in scene.objects.iter().zip(reloaded.objects.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.parent, b.parent);
        }
        assert_eq!(reloaded.mesh.faces[0].color, scene.mesh.faces[0].color);
    }

    #[test]
    fn test_tank_scene_is_well_formed() {
        let scene = tank_scene();
        assert_eq!(scene.objects.len(), 8);
        assert_eq!(scene.mesh.vertices.len(), 8);
        assert_eq!(scene.mesh.faces.len(), 12);
        assert!(scene.validate().is_ok());

        // gun sits three links below the root body
        let gun = scene.index_of("gun").unwrap();
        let joint = scene.objects[gun].parent.unwrap();
        let turret = scene.objects[joint].parent.unwrap();
        let body = scene.objects[turret].parent.unwrap();
        assert_eq!(scene.objects[body].parent, None);
    }
}
