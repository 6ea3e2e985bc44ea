//! Panzer Engine: software-rendered articulated tank
//!
//! A hierarchical tank model (body, turret, gun joint, gun, four wheels)
//! pushed through an explicit matrix pipeline and scan-converted into a
//! software framebuffer. The window system never transforms or fills
//! anything; it only blits the finished frame.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod input;
mod pipeline;
mod rasterizer;
mod scene;

use macroquad::prelude::*;
use pipeline::RenderState;
use rasterizer::{DrawMode, Framebuffer, Rgb, HEIGHT, WIDTH};
use scene::{load_scene, save_scene, tank_scene};

const SCENE_PATH: &str = "assets/scenes/tank.ron";

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Panzer Engine v{}", VERSION),
        window_width: WIDTH as i32,
        window_height: HEIGHT as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Scene file when present, built-in tank otherwise
    let scene = match load_scene(SCENE_PATH) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Could not load {}: {}; using built-in scene", SCENE_PATH, e);
            tank_scene()
        }
    };

    let mut state = match RenderState::new(scene, WIDTH, HEIGHT) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Bad scene data: {}", e);
            return;
        }
    };

    let mut fb = Framebuffer::new(WIDTH, HEIGHT);
    let mut mode = DrawMode::Solid;

    println!("=== Panzer Engine v{} ===", VERSION);
    println!("A/D body  Q/E turret  R/F gun  Space drive  1 wireframe  2 solid");
    println!("S save scene  O open scene  P screenshot  Esc quit");

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        mode = input::poll_draw_mode(mode);
        let deltas = input::poll_pose_deltas(&state.scene);

        fb.clear(Rgb::BLACK);
        state.update_and_render(&deltas, mode, &mut fb);

        #[cfg(not(target_arch = "wasm32"))]
        {
            if is_key_pressed(KeyCode::P) {
                save_screenshot(&fb);
            }
            if is_key_pressed(KeyCode::O) {
                if let Some(new_state) = prompt_open_scene() {
                    state = new_state;
                }
            }
            if is_key_pressed(KeyCode::S) {
                let path = std::path::Path::new("assets/scenes/saved.ron");
                if let Some(parent) = path.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                match save_scene(&state.scene, path) {
                    Ok(()) => println!("Saved {}", path.display()),
                    Err(e) => eprintln!("Save failed: {}", e),
                }
            }
        }

        // Present the finished framebuffer
        let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.pixels);
        texture.set_filter(FilterMode::Nearest);
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(Vec2::new(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        next_frame().await;
    }
}

/// Dump the current framebuffer to a PNG next to the executable
#[cfg(not(target_arch = "wasm32"))]
fn save_screenshot(fb: &Framebuffer) {
    match image::save_buffer(
        "screenshot.png",
        &fb.pixels,
        fb.width as u32,
        fb.height as u32,
        image::ExtendedColorType::Rgba8,
    ) {
        Ok(()) => println!("Saved screenshot.png"),
        Err(e) => eprintln!("Screenshot failed: {}", e),
    }
}

/// Pick a scene file and build a fresh render state from it
#[cfg(not(target_arch = "wasm32"))]
fn prompt_open_scene() -> Option<RenderState> {
    let path = rfd::FileDialog::new()
        .add_filter("RON Scene", &["ron"])
        .set_directory("assets/scenes")
        .pick_file()?;

    match load_scene(&path).and_then(|scene| RenderState::new(scene, WIDTH, HEIGHT)) {
        Ok(state) => {
            println!("Loaded {}", path.display());
            Some(state)
        }
        Err(e) => {
            eprintln!("Failed to load {}: {}", path.display(), e);
            None
        }
    }
}
