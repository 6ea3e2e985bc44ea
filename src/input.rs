//! Keyboard driving model
//!
//! Maps held keys to pose increments for named scene objects. The
//! pipeline only ever sees the resulting `PoseDelta` list, so a replay
//! log or a test harness can drive it exactly the same way.

use crate::pipeline::PoseDelta;
use crate::rasterizer::{DrawMode, Vec3};
use crate::scene::Scene;
use macroquad::prelude::{is_key_down, is_key_pressed, KeyCode};

/// Rotation step per frame while a key is held, radians
pub const TURN_STEP: f32 = 0.05;
/// Wheel spin per frame of forward drive, radians
pub const WHEEL_STEP: f32 = 0.1;
/// Forward drive distance per frame, world units
pub const DRIVE_STEP: f32 = 4.0;

const WHEELS: [&str; 4] = ["wheel1", "wheel2", "wheel3", "wheel4"];

/// Poll the keyboard and produce this frame's pose increments
pub fn poll_pose_deltas(scene: &Scene) -> Vec<PoseDelta> {
    let mut deltas = Vec::new();

    // Body yaw
    if is_key_down(KeyCode::A) {
        deltas.push(PoseDelta::rotate("body", Vec3::new(0.0, TURN_STEP, 0.0)));
    }
    if is_key_down(KeyCode::D) {
        deltas.push(PoseDelta::rotate("body", Vec3::new(0.0, -TURN_STEP, 0.0)));
    }

    // Turret yaw, relative to the body
    if is_key_down(KeyCode::Q) {
        deltas.push(PoseDelta::rotate("turret", Vec3::new(0.0, TURN_STEP, 0.0)));
    }
    if is_key_down(KeyCode::E) {
        deltas.push(PoseDelta::rotate("turret", Vec3::new(0.0, -TURN_STEP, 0.0)));
    }

    // Gun elevation through the joint
    if is_key_down(KeyCode::F) {
        deltas.push(PoseDelta::rotate("joint", Vec3::new(TURN_STEP, 0.0, 0.0)));
    }
    if is_key_down(KeyCode::R) {
        deltas.push(PoseDelta::rotate("joint", Vec3::new(-TURN_STEP, 0.0, 0.0)));
    }

    // Drive forward along the body heading, spinning the wheels
    if is_key_down(KeyCode::Space) {
        let yaw = scene
            .index_of("body")
            .map(|i| scene.objects[i].transform.rotation.y)
            .unwrap_or(0.0);
        deltas.push(PoseDelta::translate(
            "body",
            Vec3::new(DRIVE_STEP * yaw.sin(), 0.0, DRIVE_STEP * yaw.cos()),
        ));
        for wheel in WHEELS {
            deltas.push(PoseDelta::rotate(wheel, Vec3::new(WHEEL_STEP, 0.0, 0.0)));
        }
    }

    deltas
}

/// Draw-mode keys: 1 = wireframe, 2 = solid
pub fn poll_draw_mode(current: DrawMode) -> DrawMode {
    if is_key_pressed(KeyCode::Key1) {
        DrawMode::Wireframe
    } else if is_key_pressed(KeyCode::Key2) {
        DrawMode::Solid
    } else {
        current
    }
}
